//! Parameter and runtime files driven through the public API.

use cam_sensor_config::{
    build_control, compute_scaled_dimensions, find_sensor, resolve, ConfigError, Dimensions,
    MemoryParamStore, ParamStore, ParamValue, RuntimeConfig, RuntimeControl, ScaleError,
    ScaleFraction, SensorIdentity, SensorParamHandler,
};
use cam_sensor_config::control::{ExposureSetting, FocusSetting, WhiteBalanceSetting};

const PARAMS: &str = r#"
[rgb]
i_resolution = "4k"
i_isp_num = 1
i_isp_den = 2
i_preview_size = 416
r_set_man_focus = true
r_focus = 120

[left]
i_resolution = "800"
r_set_man_exposure = true
r_exposure = 8500
"#;

#[test]
fn test_parameter_file_keys() {
    let store = MemoryParamStore::from_toml_str(PARAMS).expect("valid parameter file");
    assert_eq!(
        store.value("rgb_i_resolution"),
        Some(&ParamValue::Str("4k".to_owned()))
    );
    assert_eq!(store.value("left_r_exposure"), Some(&ParamValue::Int(8500)));
}

#[test]
fn test_runtime_groups_from_parameter_file() {
    let store = MemoryParamStore::from_toml_str(PARAMS).expect("valid parameter file");
    let (config, _) = RuntimeConfig::from_params(store).expect("valid runtime params");

    let rgb = build_control(config.group(SensorIdentity::Rgb));
    assert_eq!(rgb.focus, Some(FocusSetting::Manual(120)));
    assert_eq!(rgb.exposure, Some(ExposureSetting::Auto));

    let left = build_control(config.group(SensorIdentity::Left));
    assert_eq!(
        left.exposure,
        Some(ExposureSetting::Manual {
            exposure_time_us: 8500,
            iso: 800,
        })
    );
    assert!(matches!(left.white_balance, Some(WhiteBalanceSetting::Auto(_))));
}

#[test]
fn test_handler_runtime_dispatch() {
    let config = RuntimeConfig::from_toml_str(
        r"
        [left]
        r_set_man_whitebalance = true
        r_whitebalance = 4500
        ",
    )
    .expect("valid runtime file");

    let left = SensorParamHandler::new(MemoryParamStore::new(), "left");
    let RuntimeControl::Apply(ctrl) = left.runtime_control(&config) else {
        panic!("left has a runtime group");
    };
    assert_eq!(ctrl.white_balance, Some(WhiteBalanceSetting::Manual(4500)));

    let tof = SensorParamHandler::new(MemoryParamStore::new(), "tof");
    assert!(matches!(
        tof.runtime_control(&config),
        RuntimeControl::UnknownIdentity(_)
    ));
}

#[test]
fn test_resolution_and_scale_pipeline() {
    let sensor = find_sensor("IMX378").expect("known sensor");
    let resolved = resolve("13mp", &sensor);
    assert!(resolved.used_fallback);
    assert_eq!(resolved.resolution, "1080p");

    let scale = ScaleFraction::new(2, 3).expect("valid fraction");
    let out = compute_scaled_dimensions(Dimensions::new(1920, 1080), scale, 300, true)
        .expect("1280x720 holds a 300 pixel preview");
    assert_eq!(out.dimensions, Dimensions::new(1280, 720));
    assert!(out.warnings.is_empty());

    let scale = ScaleFraction::new(1, 3).expect("valid fraction");
    let err = compute_scaled_dimensions(Dimensions::new(1920, 1080), scale, 1000, true)
        .expect_err("640x360 is too small");
    let err = ConfigError::from(err);
    assert!(matches!(
        err,
        ConfigError::Scale(ScaleError::PreviewExceedsScaledSize { .. })
    ));
    assert!(err.to_string().contains("lower than preview size"));
}
