use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::colormap::ColorMap;
use crate::error::Error;
use crate::raster::Rgb;

pub const GREEN: Rgb = [0, 255, 0];
pub const RED: Rgb = [255, 0, 0];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HitConfig {
    /// frames averaged by the trailing mean of the vertical coordinate
    pub rolling_window: usize,
    /// frames that must keep the new direction after a reversal
    pub min_change_frames: usize,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            rolling_window: 5,
            min_change_frames: 25,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrailConfig {
    pub capacity: usize,
    pub tracked_class: i32,
    pub frame_weight: f32,
    pub canvas_weight: f32,
    pub line_color: Rgb,
    pub line_thickness: u32,
    pub marker_color: Rgb,
    pub marker_radius: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            tracked_class: 0,
            // weights intentionally sum above one
            frame_weight: 0.8,
            canvas_weight: 0.5,
            line_color: GREEN,
            line_thickness: 2,
            marker_color: RED,
            marker_radius: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HeatmapConfig {
    pub width: usize,
    pub height: usize,
    pub kernel_size: usize,
    pub colormap: ColorMap,
    pub line_thickness: u32,
    pub colorbar: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: 295,
            height: 551,
            kernel_size: 31,
            colormap: ColorMap::default(),
            line_thickness: 2,
            colorbar: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    pub radius: u32,
    pub color: Rgb,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            radius: 4,
            color: RED,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub confidence_threshold: f32,
    pub tracked_class: i32,
    pub input_width: usize,
    pub input_height: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            tracked_class: 0,
            input_width: 640,
            input_height: 640,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub hits: HitConfig,
    pub trail: TrailConfig,
    pub heatmap: HeatmapConfig,
    pub overlay: OverlayConfig,
    pub detector: DetectorConfig,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::input_unavailable(path, e))?;

        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if self.hits.rolling_window == 0 {
            return invalid("hits.rolling_window must be positive");
        }

        if self.hits.min_change_frames == 0 {
            return invalid("hits.min_change_frames must be positive");
        }

        if self.trail.capacity == 0 {
            return invalid("trail.capacity must be positive");
        }

        if self.heatmap.width == 0 || self.heatmap.height == 0 {
            return invalid("heatmap grid must not be empty");
        }

        if self.heatmap.kernel_size == 0 || self.heatmap.kernel_size % 2 == 0 {
            return invalid("heatmap.kernel_size must be odd and positive");
        }

        if self.detector.input_width == 0 || self.detector.input_height == 0 {
            return invalid("detector input size must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();

        assert_eq!(c.hits.rolling_window, 5);
        assert_eq!(c.hits.min_change_frames, 25);
        assert_eq!(c.trail.capacity, 50);
        assert_eq!((c.trail.frame_weight, c.trail.canvas_weight), (0.8, 0.5));
        assert_eq!((c.heatmap.width, c.heatmap.height), (295, 551));
        assert_eq!(c.heatmap.kernel_size, 31);
        assert_eq!(c.heatmap.colormap, ColorMap::Ocean);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = Config::from_json(r#"{"heatmap": {"width": 300, "height": 400, "colormap": "JET"}}"#)
            .unwrap();

        assert_eq!((c.heatmap.width, c.heatmap.height), (300, 400));
        assert_eq!(c.heatmap.colormap, ColorMap::Jet);
        assert_eq!(c.heatmap.kernel_size, 31);
        assert_eq!(c.trail, TrailConfig::default());
    }

    #[test]
    fn rejects_even_kernel() {
        let err = Config::from_json(r#"{"heatmap": {"kernel_size": 30}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = Config::from_json(r#"{"trail": {"capacity": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_input_unavailable() {
        let err = Config::from_file("/nonexistent/balltrace.json").unwrap_err();
        assert!(matches!(err, Error::InputUnavailable { .. }));
    }
}
