pub mod bbox;
pub mod colormap;
pub mod config;
pub mod court;
pub mod detection;
pub mod detector;
pub mod error;
pub mod heatmap;
pub mod hits;
pub mod math;
pub mod overlay;
pub mod pipeline;
pub mod raster;
pub mod records;
pub mod rolling_avg;
pub mod trail;
pub mod trajectory;

#[cfg(feature = "opencv")]
pub mod cv;
#[cfg(feature = "opencv")]
pub mod video;

mod circular_queue;

pub use colormap::ColorMap;
pub use config::Config;
pub use court::CourtGeometry;
pub use detection::{Detection, HitEvent, Observation, Position, Reversal};
pub use detector::{Detector, SequenceDetector};
pub use error::Error;
pub use heatmap::{Heatmap, HeatmapGrid};
pub use raster::Raster;
pub use trail::TrailRenderer;
