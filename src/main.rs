use anyhow::{anyhow, Context};
use clap::Parser;
use journey_viewer::{
    sdk::datetime::{format_seconds_as_time, parse_time_string},
    sdk::location::parse_lat_lng,
    sdk::util::log::init_logging,
    sdk::bookmark::MIN_CUSTOM_PORT,
    update_query, JourneySummary, LatLng, MapView, ViewDefaults, ViewState, ViewerConfig,
};
use std::{fs::File, io::Write, path::PathBuf};
use url::Url;

const PARIS: LatLng = LatLng {
    lat: 48.856667,
    lng: 2.350987,
};
const DEFAULT_ZOOM: u8 = 13;
const DEFAULT_DEPARTURE_TIME: i64 = 14 * 3600 + 15 * 60;

/// Computes a journey with the backend and prints its summary, with links to compare it
/// against other planners.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source location as "lat,lng"
    #[arg(long)]
    src: Option<String>,

    /// Destination location as "lat,lng"
    #[arg(long)]
    dst: Option<String>,

    /// Departure time as HH:MM:SS
    #[arg(short, long)]
    time: Option<String>,

    /// A bookmarked viewer query string (mapcenter, mapzoom, src, dst, time)
    #[arg(short, long)]
    bookmark: Option<String>,

    /// [Optional] Walking speed in km/h, overrides the configured one
    #[arg(long)]
    walking_speed: Option<f64>,

    /// [Optional] Map center as "lat,lng", used by the comparator link
    #[arg(long)]
    center: Option<String>,

    /// [Optional] Map zoom, used by the comparator link
    #[arg(long)]
    zoom: Option<u8>,

    /// [Optional] URL the viewer is served at, to link to other viewer instances
    #[arg(long)]
    viewer_url: Option<String>,

    /// [Optional] Port of the viewer instance to compare with
    #[arg(long, value_parser = clap::value_parser!(u16).range(i64::from(MIN_CUSTOM_PORT)..))]
    comparison_port: Option<u16>,

    /// [Optional] Also write the summary as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ViewerConfig::from_env().context("Invalid configuration")?;

    let defaults = ViewDefaults {
        center: PARIS,
        zoom: DEFAULT_ZOOM,
        departure_time: DEFAULT_DEPARTURE_TIME,
    };
    let mut view = ViewState::from_query(cli.bookmark.as_deref().unwrap_or(""), &defaults);

    // explicit flags override the bookmark
    if let Some(src) = &cli.src {
        view.src = Some(parse_lat_lng(src).context("Invalid --src")?);
    }
    if let Some(dst) = &cli.dst {
        view.dst = Some(parse_lat_lng(dst).context("Invalid --dst")?);
    }
    if let Some(time) = &cli.time {
        view.departure_time = parse_time_string(time).context("Invalid --time")?;
    }
    if let Some(center) = &cli.center {
        view.center = parse_lat_lng(center).context("Invalid --center")?;
    }
    if let Some(zoom) = cli.zoom {
        view.zoom = zoom;
    }
    if let Some(port) = cli.comparison_port {
        view.comparison_port = Some(port);
    }
    let viewer_url = match &cli.viewer_url {
        Some(raw) => Some(Url::parse(raw).context("Invalid --viewer-url")?),
        None => config.viewer_url.clone(),
    };

    let (src, dst) = match (view.src, view.dst) {
        (Some(src), Some(dst)) => (src, dst),
        _ => return Err(anyhow!("Both a source and a destination are required")),
    };
    let walking_speed_kmh = cli.walking_speed.unwrap_or(config.walking_speed_kmh);

    log::info!(
        "Requesting journey {} -> {} departing at {}",
        src.to_lat_lng_string(),
        dst.to_lat_lng_string(),
        format_seconds_as_time(view.departure_time)
    );

    let provider = config.backend.into_provider()?;
    let reply = provider
        .journey_between_locations(src, dst, view.departure_time)
        .context("Journey request failed")?;

    let map_view = MapView {
        center: view.center,
        zoom: view.zoom,
    };
    let now = chrono::Local::now().naive_local();
    let summary = match JourneySummary::from_reply(&reply, &map_view, walking_speed_kmh, now) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Unable to summarize the backend reply: {}", e);
            JourneySummary {
                requested_url: reply.requested_target(),
                ..JourneySummary::placeholder(reply.http_status, e.to_string())
            }
        }
    };
    let summary = match &viewer_url {
        Some(viewer_url) => summary
            .with_viewer_links(&view.bookmark_url(viewer_url), view.comparison_port_or_default())
            .context("Unable to build the viewer links")?,
        None => summary,
    };

    println!("{}", summary);
    match &viewer_url {
        Some(viewer_url) => println!("bookmark        : {}", view.bookmark_url(viewer_url)),
        None => println!("bookmark        : ?{}", update_query("", &view.to_query_pairs())),
    }

    if let Some(path) = &cli.output {
        let json_output = serde_json::to_string_pretty(&summary)?;
        let mut file = File::create(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        file.write_all(json_output.as_bytes())?;
        log::info!("Summary written to {}", path.display());
    }

    Ok(())
}
