use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use geoworld::watch::{changed, watch_config};
use geoworld::{GenStatus, GenerationSummary, WorldGenerator, init_logging, synthetic};
use geoworld_geom::Vec3;
use geoworld_runtime::RecordingSceneHost;
use geoworld_world::load_config_from_path;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "geoworld", version, about = "Generate a streamed world from GeoJSON inputs")]
struct Args {
    /// Generation config (TOML); input paths resolve relative to it
    #[arg(long, value_name = "PATH")]
    config: PathBuf,

    /// Also log at debug level to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Override ingest.seed (0 draws from entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Frames to simulate
    #[arg(long, default_value_t = 3000)]
    ticks: u32,

    /// Reference point speed along the map diagonal, m/s
    #[arg(long, default_value_t = 15.0)]
    walk_speed: f32,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,

    /// Terrain edge length in meters
    #[arg(long, default_value_t = 2048.0)]
    size: f32,

    /// Terrain height range in meters
    #[arg(long, default_value_t = 120.0)]
    max_height: f32,

    /// Flat terrain instead of noise hills
    #[arg(long, default_value_t = false)]
    flat: bool,

    /// Regenerate whenever the config file changes
    #[arg(long, default_value_t = false)]
    watch: bool,

    /// Print the final report as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct RunReport {
    runs: u64,
    summary: Option<GenerationSummary>,
    live_chunks: usize,
    live_buildings: usize,
    live_rivers: usize,
    parking_slots: usize,
    landmarks: usize,
    chunk_creates: u32,
    chunk_destroys: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut config = load_config_from_path(&args.config)?;
    if let Some(seed) = args.seed {
        config.ingest.seed = seed;
    }

    let layout = synthetic::layout(args.size, args.max_height);
    let mut terrain = if args.flat {
        synthetic::flat_terrain(layout)
    } else {
        synthetic::noise_terrain(layout, config.ingest.seed)
    };
    let mut host = RecordingSceneHost::new();

    let watcher = if args.watch {
        Some(watch_config(&args.config)?)
    } else {
        None
    };

    let mut generator = WorldGenerator::new(config);
    generator.on_generation_complete(|s| {
        log::info!(
            target: "gen",
            "ready: {} buildings in {} chunks, {} road points",
            s.buildings,
            s.chunks,
            s.road_points
        );
    });
    generator.start_generation();

    // walk corner to corner, bouncing at the edges
    let diag = Vec3::new(1.0, 0.0, 1.0) * std::f32::consts::FRAC_1_SQRT_2;
    let mut travelled = 0.0f32;
    let span = args.size * std::f32::consts::SQRT_2;
    for frame in 0..args.ticks {
        if let Some((_, rx)) = &watcher {
            if changed(rx) {
                match load_config_from_path(&args.config) {
                    Ok(mut cfg) => {
                        if let Some(seed) = args.seed {
                            cfg.ingest.seed = seed;
                        }
                        log::info!(target: "config", "config changed; regenerating");
                        generator.set_config(cfg);
                        generator.request_regeneration();
                    }
                    Err(e) => log::warn!(target: "config", "ignoring invalid config: {}", e),
                }
            }
        }

        if matches!(generator.status(), GenStatus::Streaming) {
            travelled += args.walk_speed * args.dt;
        }
        let along = travelled % (2.0 * span);
        let d = if along > span { 2.0 * span - along } else { along };
        let reference = layout.origin + diag * d;

        if let Err(e) = generator.tick(args.dt, reference, &mut terrain, &mut host) {
            log::error!(target: "gen", "frame {}: {}", frame, e);
            if !args.watch {
                return Err(e.into());
            }
        }
    }

    let report = RunReport {
        runs: generator.run(),
        summary: generator.summary().cloned(),
        live_chunks: host.live_chunks(),
        live_buildings: host.live_buildings(),
        live_rivers: host.live_rivers(),
        parking_slots: host.parking.len(),
        landmarks: host.landmarks.len(),
        chunk_creates: host.creates.values().sum(),
        chunk_destroys: host.destroys.values().sum(),
    };
    log::info!(
        target: "gen",
        "after {} ticks: {} live chunks, {} buildings, {} rivers, {} creates / {} destroys",
        args.ticks,
        report.live_chunks,
        report.live_buildings,
        report.live_rivers,
        report.chunk_creates,
        report.chunk_destroys
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
