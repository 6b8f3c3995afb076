//! RGB frames and the few drawing primitives the overlays need.
//!
//! Drawing goes through `imageproc`, which clips against the image bounds, so
//! callers may pass points anywhere.

use image::RgbImage;
use imageproc::drawing::{self, Canvas};
use imageproc::point::Point;
use nalgebra as na;
use std::path::Path;

use crate::error::Error;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    img: RgbImage,
}

impl Raster {
    /// Black RGB image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            img: RgbImage::new(width as u32, height as u32),
        }
    }

    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            img: RgbImage::from_pixel(width as u32, height as u32, image::Rgb(color)),
        }
    }

    pub fn from_image(img: RgbImage) -> Self {
        Self { img }
    }

    #[inline]
    pub fn as_image(&self) -> &RgbImage {
        &self.img
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| Error::input_unavailable(path, e))?;

        Ok(Self::from_image(img.to_rgb8()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        self.img.save(path)?;
        Ok(())
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.img.width() as usize
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.img.height() as usize
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    #[inline]
    pub fn contains(&self, pt: na::Point2<i32>) -> bool {
        in_bounds(pt, self.width(), self.height())
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.img.get_pixel(x as u32, y as u32).0
    }

    pub fn draw_line(&mut self, p0: na::Point2<i32>, p1: na::Point2<i32>, color: Rgb, thickness: u32) {
        line(&mut self.img, p0, p1, image::Rgb(color), thickness);
    }

    pub fn fill_circle(&mut self, center: na::Point2<i32>, radius: u32, color: Rgb) {
        drawing::draw_filled_circle_mut(
            &mut self.img,
            (center.x, center.y),
            radius as i32,
            image::Rgb(color),
        );
    }

    /// `saturate(round(self * alpha + other * beta + gamma))` per channel.
    pub fn add_weighted(&self, alpha: f32, other: &Raster, beta: f32, gamma: f32) -> Result<Raster, Error> {
        if self.dims() != other.dims() {
            return Err(Error::SizeMismatch {
                expected: self.dims(),
                actual: other.dims(),
            });
        }

        blend(self, alpha, other, beta, gamma)
    }
}

#[cfg(feature = "opencv")]
fn blend(a: &Raster, alpha: f32, b: &Raster, beta: f32, gamma: f32) -> Result<Raster, Error> {
    crate::cv::add_weighted(a, alpha, b, beta, gamma)
}

#[cfg(not(feature = "opencv"))]
fn blend(a: &Raster, alpha: f32, b: &Raster, beta: f32, gamma: f32) -> Result<Raster, Error> {
    let mix = |x: u8, y: u8| {
        (x as f32 * alpha + y as f32 * beta + gamma)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    let img = imageproc::map::map_colors2(&a.img, &b.img, |p: image::Rgb<u8>, q: image::Rgb<u8>| {
        image::Rgb([mix(p[0], q[0]), mix(p[1], q[1]), mix(p[2], q[2])])
    });

    Ok(Raster { img })
}

#[inline]
pub fn in_bounds(pt: na::Point2<i32>, width: usize, height: usize) -> bool {
    pt.x >= 0 && pt.y >= 0 && (pt.x as usize) < width && (pt.y as usize) < height
}

/// Draws a segment on any `imageproc` canvas. Thickness 1 is a plain
/// Bresenham line, thicker lines are filled as a quad with round caps.
pub fn line<C>(canvas: &mut C, p0: na::Point2<i32>, p1: na::Point2<i32>, color: C::Pixel, thickness: u32)
where
    C: Canvas,
    C::Pixel: 'static,
{
    if thickness <= 1 {
        drawing::draw_line_segment_mut(
            canvas,
            (p0.x as f32, p0.y as f32),
            (p1.x as f32, p1.y as f32),
            color,
        );
        return;
    }

    let half = thickness as f32 / 2.0;
    let cap = (half.round() as i32).max(1);

    drawing::draw_filled_circle_mut(canvas, (p0.x, p0.y), cap, color);

    if p0 == p1 {
        return;
    }

    drawing::draw_filled_circle_mut(canvas, (p1.x, p1.y), cap, color);

    let dir = na::Vector2::new((p1.x - p0.x) as f32, (p1.y - p0.y) as f32).normalize();
    let n = na::Vector2::new(-dir.y, dir.x) * half;
    let (nx, ny) = (n.x.round() as i32, n.y.round() as i32);

    let quad = [
        Point::new(p0.x + nx, p0.y + ny),
        Point::new(p1.x + nx, p1.y + ny),
        Point::new(p1.x - nx, p1.y - ny),
        Point::new(p0.x - nx, p0.y - ny),
    ];

    drawing::draw_polygon_mut(canvas, &quad, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(r: &Raster) -> usize {
        r.as_image().pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    #[test]
    fn thin_line_covers_endpoints() {
        let mut r = Raster::new(10, 10);
        r.draw_line(na::Point2::new(1, 1), na::Point2::new(8, 5), [0, 255, 0], 1);

        assert_eq!(r.pixel(1, 1), [0, 255, 0]);
        assert_eq!(r.pixel(8, 5), [0, 255, 0]);
        assert_eq!(r.pixel(8, 1), [0, 0, 0]);
    }

    #[test]
    fn thick_line_is_wider() {
        let mut r = Raster::new(20, 20);
        r.draw_line(na::Point2::new(2, 10), na::Point2::new(17, 10), [255, 255, 255], 2);

        assert_eq!(r.pixel(10, 9), [255, 255, 255]);
        assert_eq!(r.pixel(10, 10), [255, 255, 255]);
        assert_eq!(r.pixel(10, 11), [255, 255, 255]);
        assert_eq!(r.pixel(10, 13), [0, 0, 0]);
        assert_eq!(r.pixel(10, 7), [0, 0, 0]);
    }

    #[test]
    fn degenerate_thick_line_is_a_dot() {
        let mut r = Raster::new(10, 10);
        r.draw_line(na::Point2::new(5, 5), na::Point2::new(5, 5), [9, 9, 9], 2);

        assert_eq!(r.pixel(5, 5), [9, 9, 9]);
        assert_eq!(r.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn drawing_clips_outside() {
        let mut r = Raster::new(5, 5);
        r.fill_circle(na::Point2::new(-3, 2), 4, [255, 0, 0]);
        r.draw_line(na::Point2::new(-10, -10), na::Point2::new(30, 30), [255, 0, 0], 3);
        r.fill_circle(na::Point2::new(100, 100), 2, [255, 0, 0]);

        assert!(lit(&r) > 0);
        assert_eq!(r.pixel(4, 0), [0, 0, 0]);
    }

    #[test]
    fn circle_covers_radius() {
        let mut r = Raster::new(21, 21);
        r.fill_circle(na::Point2::new(10, 10), 5, [0, 0, 255]);

        assert_eq!(r.pixel(10, 10), [0, 0, 255]);
        assert_eq!(r.pixel(15, 10), [0, 0, 255]);
        assert_eq!(r.pixel(10, 5), [0, 0, 255]);
        assert_eq!(r.pixel(16, 10), [0, 0, 0]);
        assert_eq!(r.pixel(15, 15), [0, 0, 0]);
    }

    #[test]
    fn add_weighted_saturates() {
        let a = Raster::filled(2, 2, [200, 100, 0]);
        let b = Raster::filled(2, 2, [200, 10, 0]);
        let out = a.add_weighted(0.8, &b, 0.5, 0.0).unwrap();

        assert_eq!(out.pixel(1, 1), [255, 85, 0]);

        let small = Raster::new(1, 1);
        assert!(matches!(
            a.add_weighted(0.8, &small, 0.5, 0.0),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn file_round_trip_keeps_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.png");

        let mut r = Raster::new(4, 3);
        r.fill_circle(na::Point2::new(3, 2), 0, [1, 2, 3]);
        r.save(&path).unwrap();

        let back = Raster::open(&path).unwrap();
        assert_eq!(back, r);
        assert_eq!(back.pixel(3, 2), [1, 2, 3]);
        assert_eq!(back.dims(), (4, 3));
    }
}
