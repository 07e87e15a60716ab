//! Cam-sensor-config binary: apply a parameter file to a V4L2 camera.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::info;

use cam_sensor_config::{
    find_sensor, BoardSocket, MemoryParamStore, RuntimeConfig, SensorParamHandler, V4L2Device,
};

/// Configure a camera sensor from a TOML parameter file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Parameter file; sensor tables such as `[rgb]` hold `i_*` and `r_*` keys.
    #[arg(long)]
    params: Option<PathBuf>,

    /// V4L2 device index (0 for /dev/video0).
    #[arg(long, default_value_t = 0)]
    device: u32,

    /// Sensor name: the parameter prefix and runtime group (rgb, left, right).
    #[arg(long, default_value = "rgb")]
    name: String,

    /// Sensor model used for resolution fallback.
    #[arg(long, default_value = "IMX378")]
    sensor: String,

    /// Configure as a mono sensor.
    #[arg(long)]
    mono: bool,

    /// Runtime control file applied after the initial configuration.
    #[arg(long)]
    runtime: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(err) = run(&Args::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let store = match &args.params {
        Some(path) => MemoryParamStore::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MemoryParamStore::new(),
    };

    let mut device = V4L2Device::open(args.device)?;
    info!("Device: {}", device.capabilities().card);
    info!("Driver: {}", device.capabilities().driver);

    let mut handler = SensorParamHandler::new(store, &args.name);
    let socket = match args.name.as_str() {
        "rgb" => BoardSocket::CamA,
        "left" => BoardSocket::CamB,
        "right" => BoardSocket::CamC,
        _ => BoardSocket::Auto,
    };

    if args.mono {
        handler.declare_mono_params(&mut device, socket, true)?;
    } else {
        let sensor =
            find_sensor(&args.sensor).ok_or_else(|| anyhow!("unknown sensor {}", args.sensor))?;
        let video = handler.declare_color_params(&mut device, socket, &sensor, true)?;
        println!("Video size: {video}");
    }

    if let Some(path) = &args.runtime {
        let config = RuntimeConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
        handler.apply_runtime_params(&mut device, &config)?;
    }

    for (key, value) in handler.store().iter() {
        println!("{key} = {value:?}");
    }

    Ok(())
}
