//! Hit density map on a court: bin, blur, normalize, draw the court, colorize.

use image::{GrayImage, Luma, RgbImage};
use nalgebra as na;
use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::colormap::ColorMap;
use crate::config::HeatmapConfig;
use crate::court::CourtGeometry;
use crate::error::Error;
#[cfg(not(feature = "opencv"))]
use crate::math;
use crate::raster::{self, Raster};

#[cfg(not(feature = "opencv"))]
type DensityImage = image::ImageBuffer<Luma<f32>, Vec<f32>>;

/// Hit counts per integer cell, `(rows, cols)` = `(height, width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    counts: Array2<f32>,
}

impl HeatmapGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            counts: Array2::zeros((height, width)),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.counts.ncols()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.counts.nrows()
    }

    /// Truncates the point to its cell and counts it. Points outside the grid
    /// are dropped and `false` is returned.
    pub fn add(&mut self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }

        let cell = na::Point2::new(x as i32, y as i32);

        if !raster::in_bounds(cell, self.width(), self.height()) {
            debug!(x, y, "hit outside heatmap grid dropped");
            return false;
        }

        self.counts[[cell.y as usize, cell.x as usize]] += 1.0;
        true
    }

    /// Returns the number of dropped points.
    pub fn accumulate<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = na::Point2<f32>>,
    {
        points
            .into_iter()
            .filter(|p| !self.add(p.x, p.y))
            .count()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.counts.get([y, x]).copied()
    }

    #[inline]
    pub fn counts(&self) -> ArrayView2<'_, f32> {
        self.counts.view()
    }

    pub fn total(&self) -> f32 {
        self.counts.sum()
    }
}

/// Gaussian blur of a density field with a square `ksize` kernel and the
/// sigma OpenCV derives from it.
pub fn gaussian_blur(field: ArrayView2<'_, f32>, ksize: usize) -> Result<Array2<f32>, Error> {
    #[cfg(feature = "opencv")]
    let out = crate::cv::gaussian_blur(field, ksize)?;

    #[cfg(not(feature = "opencv"))]
    let out = {
        let (h, w) = field.dim();
        let img = DensityImage::from_fn(w as u32, h as u32, |x, y| {
            Luma([field[[y as usize, x as usize]]])
        });
        let blurred = imageproc::filter::gaussian_blur_f32(&img, math::default_sigma(ksize));

        Array2::from_shape_fn((h, w), |(y, x)| blurred.get_pixel(x as u32, y as u32)[0])
    };

    Ok(out)
}

/// Min-max scaling to `0..=255`, truncating. A flat field maps to zeros.
pub fn normalize(field: ArrayView2<'_, f32>) -> Result<Array2<u8>, Error> {
    #[cfg(feature = "opencv")]
    let out = crate::cv::normalize(field)?;

    #[cfg(not(feature = "opencv"))]
    let out = {
        let (min, max) = min_max(field);
        let range = max - min;

        if range <= f32::EPSILON {
            Array2::zeros(field.dim())
        } else {
            field.mapv(|v| ((v - min) / range * 255.0).clamp(0.0, 255.0) as u8)
        }
    };

    Ok(out)
}

fn min_max(field: ArrayView2<'_, f32>) -> (f32, f32) {
    if field.is_empty() {
        return (0.0, 0.0);
    }

    field.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

/// Scale of the color bar: the smoothed intensity from zero to its peak.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HeatmapLegend {
    pub min: f32,
    pub max: f32,
    pub colormap: ColorMap,
}

#[derive(Debug, Clone)]
pub struct Heatmap {
    pub grid: HeatmapGrid,
    pub density: Array2<f32>,
    /// normalized density with the court drawn in at full intensity
    pub intensity: Array2<u8>,
    pub image: Raster,
    pub legend: HeatmapLegend,
    pub dropped: usize,
}

impl Heatmap {
    pub fn build<I>(points: I, config: &HeatmapConfig, court: &CourtGeometry) -> Result<Self, Error>
    where
        I: IntoIterator<Item = na::Point2<f32>>,
    {
        let mut grid = HeatmapGrid::new(config.width, config.height);
        let dropped = grid.accumulate(points);

        if grid.total() == 0.0 {
            warn!("no hits inside the heatmap grid, output is flat");
        }

        let density = gaussian_blur(grid.counts(), config.kernel_size)?;
        let normalized = normalize(density.view())?;

        let (h, w) = normalized.dim();
        let mut gray = GrayImage::from_fn(w as u32, h as u32, |x, y| {
            Luma([normalized[[y as usize, x as usize]]])
        });

        for (a, b) in court.segments() {
            raster::line(&mut gray, a, b, Luma([255]), config.line_thickness);
        }

        let image = config.colormap.apply(&gray)?;
        let intensity = Array2::from_shape_fn((h, w), |(y, x)| gray.get_pixel(x as u32, y as u32)[0]);
        let (_, max) = min_max(density.view());

        info!(
            hits = grid.total(),
            dropped,
            colormap = %config.colormap,
            "heatmap built"
        );

        Ok(Self {
            grid,
            density,
            intensity,
            image,
            legend: HeatmapLegend {
                min: 0.0,
                max,
                colormap: config.colormap,
            },
            dropped,
        })
    }

    /// Colorized map with a vertical color scale on its right.
    pub fn with_colorbar(&self) -> Result<Raster, Error> {
        with_colorbar(&self.image, self.legend.colormap)
    }
}

const BAR_GAP: usize = 12;
const BAR_WIDTH: usize = 24;

pub fn with_colorbar(map: &Raster, colormap: ColorMap) -> Result<Raster, Error> {
    let (w, h) = map.dims();
    let denom = h.saturating_sub(1).max(1) as f32;

    // brightest on top
    let ramp = GrayImage::from_fn(BAR_WIDTH as u32, h as u32, |_, y| {
        Luma([(255.0 - y as f32 / denom * 255.0).round() as u8])
    });
    let bar = colormap.apply(&ramp)?;

    let mut out = RgbImage::from_pixel(
        (w + BAR_GAP + BAR_WIDTH) as u32,
        h as u32,
        image::Rgb([255, 255, 255]),
    );
    image::imageops::replace(&mut out, map.as_image(), 0, 0);
    image::imageops::replace(&mut out, bar.as_image(), (w + BAR_GAP) as i64, 0);

    Ok(Raster::from_image(out))
}
