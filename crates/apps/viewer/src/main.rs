use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::GeoPoint;
use globe_viewer::host::{ChannelTransport, HeadlessSurface, drive};
use globe_viewer::script::{InputEvent, load_script};
use globe_viewer::{Viewer, ViewerConfig};
use streaming::{ImageryClient, TextureMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the globe viewer engine headlessly")]
struct Args {
    /// JSON config file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Imagery service endpoint (default: $GLOBE_IMAGERY_URL, then the config)
    #[arg(long)]
    imagery_url: Option<String>,

    /// Directory fetched images are written to
    #[arg(long, global = true, default_value = "out")]
    out: PathBuf,

    /// Give up after this much engine time (seconds)
    #[arg(long, default_value_t = 120.0)]
    max_seconds: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fly to a coordinate and save the imagery fetched on arrival
    Goto {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Zoom to land on (default: the configured navigation zoom)
        #[arg(long)]
        zoom: Option<f64>,

        #[arg(long)]
        year: Option<i32>,

        /// Texture product: 250m, 1km or 2km
        #[arg(long)]
        texture: Option<TextureMode>,
    },

    /// Replay a JSON script of input events
    Replay {
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    }
    .with_env_overrides();
    if let Some(url) = args.imagery_url {
        config.imagery_url = url;
    }

    let script = match args.command {
        Command::Goto {
            lat,
            lon,
            zoom,
            year,
            texture,
        } => {
            GeoPoint::new(lat, lon)?;
            if let Some(year) = year {
                config.year = year;
            }
            if let Some(texture) = texture {
                config.texture = texture;
            }
            vec![InputEvent::Goto { lat, lon, zoom }]
        }
        Command::Replay { script } => load_script(&script)?,
    };

    let client = ImageryClient::new(config.imagery_url.clone(), config.request_timeout())?;
    info!(endpoint = client.endpoint(), events = script.len(), "starting");
    let (transport, mut completions) = ChannelTransport::new(client);
    let mut viewer = Viewer::new(&config, HeadlessSurface::new(Some(args.out)), transport);

    let summary = drive(&mut viewer, &mut completions, script, args.max_seconds).await;
    let here = viewer.coordinates();
    info!(
        frames = summary.frames,
        seconds = summary.engine_time.0,
        settled = summary.settled,
        lat = here.lat_deg,
        lon = here.lon_deg,
        zoom = viewer.zoom_level(),
        mode = viewer.mode().as_str(),
        images = viewer.surface().written().len(),
        "done"
    );
    for event in viewer.events_mut().drain() {
        info!(frame = event.frame_index, kind = event.kind.as_str(), "{}", event.message);
    }
    Ok(())
}
