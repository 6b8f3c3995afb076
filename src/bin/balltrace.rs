use balltrace::{pipeline, records, ColorMap, Config, CourtGeometry, Error};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "balltrace", version, about = "Ball hit detection, trails and court heatmaps")]
struct Opts {
    /// JSON config file, every section is optional
    #[arg(short, long, env = "BALLTRACE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find hits in a recorded detection sequence and write them as CSV
    Hits {
        observations: PathBuf,
        out: PathBuf,
    },

    /// Render the hit density on the court
    Heatmap {
        hits: PathBuf,
        out: PathBuf,
        /// JET, HOT, OCEAN, PLASMA or INFERNO
        colormap: Option<ColorMap>,
    },

    /// Mark every hit on a court image
    Overlay {
        hits: PathBuf,
        image: PathBuf,
        out: PathBuf,
    },

    /// Run the detector over a video and record the detections
    #[cfg(feature = "opencv")]
    Detect {
        video: PathBuf,
        model: String,
        out: PathBuf,
    },

    /// Draw the ball trail over a video
    #[cfg(feature = "opencv")]
    Trail {
        video: PathBuf,
        model: String,
        out: PathBuf,
    },
}

fn main() -> Result<(), Error> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("balltrace=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    let opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => {
            info!(?path, "loading config");
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    match opts.command {
        Command::Hits { observations, out } => {
            let observations = records::load_observations(&observations)?;
            let hits = pipeline::find_hits(&observations, &config.hits)?;
            records::save_hits(&out, &hits)?;

            info!(hits = hits.len(), ?out, "hit coordinates saved");
        }

        Command::Heatmap { hits, out, colormap } => {
            if let Some(colormap) = colormap {
                config.heatmap.colormap = colormap;
            }

            let hits = records::load_hits(&hits)?;
            pipeline::write_heatmap(&hits, &config.heatmap, &CourtGeometry::tennis(), &out)?;
        }

        Command::Overlay { hits, image, out } => {
            let hits = records::load_hits(&hits)?;
            pipeline::write_overlay(&hits, &image, &out, &config.overlay)?;
        }

        #[cfg(feature = "opencv")]
        Command::Detect { video, model, out } => {
            let mut detector = balltrace::detector::YoloDetector::new(&model, config.detector.clone())?;
            let observations = pipeline::detect_video(&video, &mut detector)?;
            records::save_observations(&out, &observations)?;
        }

        #[cfg(feature = "opencv")]
        Command::Trail { video, model, out } => {
            let mut detector = balltrace::detector::YoloDetector::new(&model, config.detector.clone())?;
            pipeline::render_trail_video(&video, &out, &mut detector, &config.trail)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Opts::command().debug_assert();
    }

    #[test]
    fn heatmap_colormap_is_parsed() {
        let opts = Opts::try_parse_from(["balltrace", "heatmap", "hits.csv", "map.png", "inferno", "--config", "c.json"])
            .unwrap();

        assert_eq!(opts.config, Some(PathBuf::from("c.json")));
        assert!(matches!(
            opts.command,
            Command::Heatmap {
                colormap: Some(ColorMap::Inferno),
                ..
            }
        ));

        assert!(Opts::try_parse_from(["balltrace", "heatmap", "hits.csv", "map.png", "viridis"]).is_err());
        assert!(Opts::try_parse_from(["balltrace", "hits", "obs.jsonl"]).is_err());
    }
}
