use nalgebra as na;
use tracing::{debug, info};

use crate::config::OverlayConfig;
use crate::raster::Raster;

/// Burns a filled marker into `image` for every point inside it. Returns the
/// number of markers drawn, points outside the image are skipped.
pub fn plot_points<I>(image: &mut Raster, points: I, config: &OverlayConfig) -> usize
where
    I: IntoIterator<Item = na::Point2<f32>>,
{
    let mut drawn = 0;
    let mut skipped = 0;

    for pt in points {
        if !pt.x.is_finite() || !pt.y.is_finite() {
            skipped += 1;
            continue;
        }

        // truncation alone would move (-0.5, y) onto column 0
        let center = na::Point2::new(pt.x as i32, pt.y as i32);

        if pt.x < 0.0 || pt.y < 0.0 || !image.contains(center) {
            debug!(x = pt.x, y = pt.y, "marker outside image skipped");
            skipped += 1;
            continue;
        }

        image.fill_circle(center, config.radius, config.color);
        drawn += 1;
    }

    info!(drawn, skipped, "points plotted");

    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_markers_inside_only() {
        let mut img = Raster::filled(50, 40, [10, 10, 10]);
        let drawn = plot_points(
            &mut img,
            vec![
                na::Point2::new(5.0, 5.0),
                na::Point2::new(49.9, 39.2),
                na::Point2::new(50.0, 10.0),
                na::Point2::new(-3.0, 10.0),
                na::Point2::new(20.0, f32::INFINITY),
            ],
            &OverlayConfig::default(),
        );

        assert_eq!(drawn, 2);
        assert_eq!(img.pixel(5, 5), [255, 0, 0]);
        assert_eq!(img.pixel(9, 5), [255, 0, 0]);
        assert_eq!(img.pixel(10, 5), [10, 10, 10]);
        assert_eq!(img.pixel(49, 39), [255, 0, 0]);
        assert_eq!(img.pixel(30, 20), [10, 10, 10]);
    }

    #[test]
    fn fractional_negative_points_are_outside() {
        let mut img = Raster::filled(20, 20, [0, 0, 0]);
        let drawn = plot_points(
            &mut img,
            vec![na::Point2::new(-0.5, 10.0), na::Point2::new(10.0, -0.25)],
            &OverlayConfig::default(),
        );

        assert_eq!(drawn, 0);
        assert_eq!(img, Raster::filled(20, 20, [0, 0, 0]));
    }
}
