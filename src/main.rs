use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
enum DatasetLoadError {
    #[error("{0}: {1}")]
    Io(PathBuf, #[source] io::Error),

    #[error("{0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON dataset with nodes, edges, hazards and facilities
    /// (defaults to the built-in Islamabad demo data)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the safest route between two nodes
    Route {
        /// Id of the start node
        start: i64,

        /// Id of the end node
        end: i64,
    },

    /// Find the facility closest to a position
    Nearest {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// List all hazards
    Hazards,

    /// Compute the cumulative hazard penalty at a position
    Penalty {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Radius of every hazard's zone of influence, in degrees
        #[arg(long, default_value_t = saferoute::DEFAULT_HAZARD_RADIUS)]
        radius: f64,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let dataset = match cli.dataset {
        Some(ref path) => load_dataset(path)?,
        None => saferoute::Dataset::islamabad(),
    };
    let engine = saferoute::Engine::from_dataset(&dataset);

    let response = match cli.command {
        Command::Route { start, end } => {
            let r = engine.route(start, end);
            if r.success {
                success(json!({
                    "path": r.path,
                    "distance": r.total_distance,
                    "safety_score": r.safety_score,
                }))
            } else {
                log::info!("no route between {} and {}", start, end);
                error("No path found")
            }
        }

        Command::Nearest { lat, lon } => {
            let f = engine.nearest(lat, lon);
            success(json!({
                "id": f.id,
                "name": f.name,
                "type": f.kind,
                "lat": f.lat,
                "lon": f.lon,
            }))
        }

        Command::Hazards => success(serde_json::to_value(engine.hazards_snapshot())?),

        Command::Penalty { lat, lon, radius } => {
            success(json!({ "penalty": engine.penalty_at(lat, lon, radius) }))
        }
    };

    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, &response)?;
    writeln!(out)?;
    Ok(())
}

fn success(data: Value) -> Value {
    json!({ "status": "success", "data": data })
}

fn error(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

fn load_dataset<P: AsRef<Path>>(path: P) -> Result<saferoute::Dataset, DatasetLoadError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| DatasetLoadError::Io(PathBuf::from(path), e))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| DatasetLoadError::Json(PathBuf::from(path), e))
}
