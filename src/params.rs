//! Key-value parameter store.
//!
//! Parameters are addressed by flat string keys of the form
//! `<sensor name>_<parameter name>`, e.g. `rgb_i_fps`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::traits::{ConfigError, Result};

/// A single stored parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Double(f64),
    /// Text.
    Str(String),
}

impl ParamValue {
    /// Type name used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
        }
    }
}

/// Storage backend for sensor parameters.
pub trait ParamStore {
    /// Current value of `key`, if set.
    fn value(&self, key: &str) -> Option<&ParamValue>;

    /// Set `key`, replacing any previous value.
    fn set_value(&mut self, key: &str, value: ParamValue);
}

/// Rust types that can be read from and written to a [`ParamStore`].
pub trait ParamType: Sized {
    /// Type name used in error messages.
    const KIND: &'static str;

    /// Convert a stored value, or `None` if it has the wrong type or range.
    fn from_param(value: &ParamValue) -> Option<Self>;

    /// Convert into a storable value.
    fn to_param(&self) -> ParamValue;
}

impl ParamType for bool {
    const KIND: &'static str = "bool";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Bool(*self)
    }
}

impl ParamType for i64 {
    const KIND: &'static str = "int";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Int(*self)
    }
}

impl ParamType for i32 {
    const KIND: &'static str = "int";

    fn from_param(value: &ParamValue) -> Option<Self> {
        i64::from_param(value).and_then(|i| Self::try_from(i).ok())
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Int(i64::from(*self))
    }
}

impl ParamType for u32 {
    const KIND: &'static str = "non-negative int";

    fn from_param(value: &ParamValue) -> Option<Self> {
        i64::from_param(value).and_then(|i| Self::try_from(i).ok())
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Int(i64::from(*self))
    }
}

impl ParamType for f64 {
    const KIND: &'static str = "double";

    // Integers are accepted where a double is expected.
    #[allow(clippy::cast_precision_loss)]
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Double(d) => Some(*d),
            ParamValue::Int(i) => Some(*i as Self),
            _ => None,
        }
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Double(*self)
    }
}

impl ParamType for String {
    const KIND: &'static str = "string";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn to_param(&self) -> ParamValue {
        ParamValue::Str(self.clone())
    }
}

/// In-memory parameter store, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryParamStore {
    values: BTreeMap<String, ParamValue>,
}

impl MemoryParamStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML parameter file.
    ///
    /// Each top-level table is a sensor name; its keys become
    /// `<table>_<key>`. Top-level scalars are stored under their own name.
    ///
    /// ```toml
    /// [rgb]
    /// i_fps = 30
    /// i_resolution = "1080p"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed input and
    /// [`ConfigError::UnsupportedParam`] for arrays, dates or nested tables
    /// below the sensor level.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let table: toml::Table = input.parse()?;
        let mut store = Self::new();

        for (name, value) in table {
            if let toml::Value::Table(group) = value {
                for (param, value) in group {
                    let key = format!("{name}_{param}");
                    let value = convert(&key, value)?;
                    store.values.insert(key, value);
                }
            } else {
                let value = convert(&name, value)?;
                store.values.insert(name, value);
            }
        }

        Ok(store)
    }

    /// Read and parse a TOML parameter file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Number of stored parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl ParamStore for MemoryParamStore {
    fn value(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    fn set_value(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_owned(), value);
    }
}

fn convert(key: &str, value: toml::Value) -> Result<ParamValue> {
    match value {
        toml::Value::Boolean(b) => Ok(ParamValue::Bool(b)),
        toml::Value::Integer(i) => Ok(ParamValue::Int(i)),
        toml::Value::Float(f) => Ok(ParamValue::Double(f)),
        toml::Value::String(s) => Ok(ParamValue::Str(s)),
        _ => Err(ConfigError::UnsupportedParam {
            key: key.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_flattens_sensor_tables() {
        let store = MemoryParamStore::from_toml_str(
            r#"
            log_level = "debug"

            [rgb]
            i_fps = 30
            i_resolution = "1080p"
            i_set_isp_scale = false

            [left]
            i_fps = 12.5
            "#,
        )
        .expect("valid parameter file");

        assert_eq!(store.len(), 5);
        assert_eq!(store.value("rgb_i_fps"), Some(&ParamValue::Int(30)));
        assert_eq!(
            store.value("rgb_i_resolution"),
            Some(&ParamValue::Str("1080p".to_owned()))
        );
        assert_eq!(
            store.value("rgb_i_set_isp_scale"),
            Some(&ParamValue::Bool(false))
        );
        assert_eq!(store.value("left_i_fps"), Some(&ParamValue::Double(12.5)));
        assert_eq!(
            store.value("log_level"),
            Some(&ParamValue::Str("debug".to_owned()))
        );
    }

    #[test]
    fn test_from_toml_rejects_arrays() {
        let err = MemoryParamStore::from_toml_str("[rgb]\ni_sizes = [1, 2]\n")
            .expect_err("arrays are not parameters");
        assert!(matches!(err, ConfigError::UnsupportedParam { ref key } if key == "rgb_i_sizes"));
    }

    #[test]
    fn test_from_toml_reports_syntax_errors() {
        let err = MemoryParamStore::from_toml_str("[rgb\n").expect_err("malformed TOML");
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_set_value_overwrites() {
        let mut store = MemoryParamStore::new();
        store.set_value("rgb_i_width", ParamValue::Int(1280));
        store.set_value("rgb_i_width", ParamValue::Int(1920));
        assert_eq!(store.value("rgb_i_width"), Some(&ParamValue::Int(1920)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_param_type_conversions() {
        assert_eq!(u32::from_param(&ParamValue::Int(-1)), None);
        assert_eq!(u32::from_param(&ParamValue::Int(42)), Some(42));
        assert_eq!(i32::from_param(&ParamValue::Int(i64::MAX)), None);
        assert_eq!(f64::from_param(&ParamValue::Int(30)), Some(30.0));
        assert_eq!(bool::from_param(&ParamValue::Int(1)), None);
        assert_eq!(
            String::from_param(&ParamValue::Str("NORMAL".to_owned())),
            Some("NORMAL".to_owned())
        );
    }
}
