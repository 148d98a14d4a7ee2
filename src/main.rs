use std::{path::PathBuf, time::Duration};

use app::{Application, Settings};
use argh::FromArgs;
use color_eyre::eyre::eyre;
use eframe::{egui::ViewportBuilder, NativeOptions};
use osprey_link::LinkConfig;
use osprey_telemetry::Protocol;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod capture;
mod visualization;

const VERSION: &str = git_version::git_version!(
    args = ["--always", "--dirty=-modified"],
    fallback = "unknown"
);

/// Ground station dashboard for drone telemetry and camera feed
#[derive(FromArgs, Debug)]
struct Args {
    /// serial port to connect to on startup
    #[argh(positional)]
    port: Option<String>,

    /// baud rate of the telemetry link
    #[argh(option, default = "9600")]
    baud: u32,

    /// serial read timeout in milliseconds
    #[argh(option, default = "100")]
    timeout_ms: u64,

    /// telemetry vocabulary spoken by the vehicle: current or legacy
    #[argh(option, default = "Protocol::Current")]
    protocol: Protocol,

    /// index of the camera to show
    #[argh(option, default = "0")]
    camera: u32,

    /// do not open a camera
    #[argh(switch)]
    no_camera: bool,

    /// directory captured images are saved into
    #[argh(option, default = "PathBuf::from(\".\")")]
    capture_dir: PathBuf,

    /// list the available serial ports and exit
    #[argh(switch)]
    list: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Args = argh::from_env();

    if args.list {
        for port in osprey_link::available_ports() {
            println!("{port}");
        }

        return Ok(());
    }

    info!(version = VERSION, ?args, "starting osprey");

    let settings = Settings {
        port: args.port,
        link: LinkConfig {
            baud_rate: args.baud,
            read_timeout: Duration::from_millis(args.timeout_ms),
            protocol: args.protocol,
        },
        camera: (!args.no_camera).then_some(args.camera),
        capture_dir: args.capture_dir,
    };

    eframe::run_native(
        env!("CARGO_PKG_NAME"),
        NativeOptions {
            viewport: ViewportBuilder::default()
                .with_title(format!("Osprey {VERSION}"))
                .with_inner_size([1280.0, 800.0]),
            ..Default::default()
        },
        Box::new(move |cc| Box::new(Application::new(&cc.egui_ctx, settings))),
    )
    .map_err(|error| eyre!("dashboard exited with an error: {error}"))
}
