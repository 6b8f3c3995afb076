//! Stage wiring. Every stage consumes its whole input before the next starts,
//! the windowed analysis needs the complete ordered sequence.

use nalgebra as na;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{HeatmapConfig, HitConfig, OverlayConfig, TrailConfig};
use crate::court::CourtGeometry;
use crate::detection::{HitEvent, Observation, Position};
use crate::detector::Detector;
use crate::error::Error;
use crate::heatmap::Heatmap;
use crate::hits;
use crate::overlay;
use crate::raster::Raster;
use crate::trail::TrailRenderer;
use crate::trajectory;

/// Runs the detector over every frame, one observation per frame.
pub fn detect_sequence<D, I>(detector: &mut D, frames: I) -> Result<Vec<Observation>, Error>
where
    D: Detector + ?Sized,
    I: IntoIterator<Item = Result<Raster, Error>>,
{
    let mut observations = Vec::new();

    for (frame_index, frame) in frames.into_iter().enumerate() {
        let frame = frame?;
        observations.push(Observation::new(
            frame_index,
            detector.detect(frame_index, &frame)?,
        ));
    }

    let found = observations.iter().filter(|o| o.detection.is_some()).count();
    info!(frames = observations.len(), found, "detection done");

    Ok(observations)
}

/// Interpolates the detection sequence and finds the hits in it.
pub fn find_hits(observations: &[Observation], config: &HitConfig) -> Result<Vec<HitEvent>, Error> {
    let trajectory = trajectory::interpolate(observations)?;
    let hits = hits::detect_hits(&trajectory, config);

    if hits.is_empty() {
        warn!(frames = trajectory.len(), "no hits found");
    }

    Ok(hits)
}

fn points(hits: &[Position]) -> impl Iterator<Item = na::Point2<f32>> + '_ {
    hits.iter().map(|p| p.point)
}

/// Builds the heatmap and writes it to `out`. With `config.colorbar` the color
/// scale is appended and the numeric legend lands next to the image as JSON.
pub fn write_heatmap(
    hits: &[Position],
    config: &HeatmapConfig,
    court: &CourtGeometry,
    out: &Path,
) -> Result<Heatmap, Error> {
    let heatmap = Heatmap::build(points(hits), config, court)?;

    if config.colorbar {
        heatmap.with_colorbar()?.save(out)?;

        let legend = out.with_extension("legend.json");
        std::fs::write(&legend, serde_json::to_vec_pretty(&heatmap.legend)?)?;
    } else {
        heatmap.image.save(out)?;
    }

    info!(out = ?out, "heatmap saved");

    Ok(heatmap)
}

/// Plots hits onto a copy of `image` and saves it to `out`, creating the
/// output directory when needed.
pub fn write_overlay(
    hits: &[Position],
    image: &Path,
    out: &Path,
    config: &OverlayConfig,
) -> Result<usize, Error> {
    let mut raster = Raster::open(image)?;
    let drawn = overlay::plot_points(&mut raster, points(hits), config);

    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    raster.save(out)?;
    info!(out = ?out, drawn, "overlay saved");

    Ok(drawn)
}

/// Frame loop of the trail overlay: detect, update the trail, composite and
/// hand every output frame to `sink`. Returns the number of frames written.
pub fn render_trail<D, I, F>(
    detector: &mut D,
    frames: I,
    config: &TrailConfig,
    mut sink: F,
) -> Result<usize, Error>
where
    D: Detector + ?Sized,
    I: IntoIterator<Item = Result<Raster, Error>>,
    F: FnMut(Raster) -> Result<(), Error>,
{
    let mut trail: Option<TrailRenderer> = None;
    let mut count = 0;

    for (frame_index, frame) in frames.into_iter().enumerate() {
        let frame = frame?;
        let (w, h) = frame.dims();

        let renderer =
            trail.get_or_insert_with(|| TrailRenderer::new(w, h, config.clone()));

        let observation = Observation::new(frame_index, detector.detect(frame_index, &frame)?);
        sink(renderer.render(&observation, &frame)?)?;

        count += 1;
    }

    info!(frames = count, "trail rendered");

    Ok(count)
}

#[cfg(feature = "opencv")]
pub fn render_trail_video<D: Detector + ?Sized>(
    input: &Path,
    output: &Path,
    detector: &mut D,
    config: &TrailConfig,
) -> Result<usize, Error> {
    use crate::video::{VideoSource, VideoWriter};

    let source = VideoSource::open(input)?;
    let mut writer = VideoWriter::new(output.to_string_lossy(), source.fps);

    let count = render_trail(detector, source, config, |frame| writer.feed(&frame))?;
    writer.release()?;

    Ok(count)
}

#[cfg(feature = "opencv")]
pub fn detect_video<D: Detector + ?Sized>(input: &Path, detector: &mut D) -> Result<Vec<Observation>, Error> {
    detect_sequence(detector, crate::video::VideoSource::open(input)?)
}
