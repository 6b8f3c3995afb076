//! OpenCV counterparts of the image operations, used when the crate is built
//! with the `opencv` feature. Rasters stay RGB on the Rust side; conversion to
//! BGR happens only where OpenCV itself cares about channel order.

use image::{GrayImage, RgbImage};
use ndarray::prelude::*;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};

use crate::colormap::ColorMap;
use crate::error::Error;
use crate::raster::Raster;

fn size_mismatch(mat: &Mat) -> Error {
    Error::SizeMismatch {
        expected: (mat.cols() as usize, mat.rows() as usize),
        actual: (0, 0),
    }
}

fn zeros(rows: usize, cols: usize, typ: i32) -> Result<Mat, Error> {
    Ok(Mat::new_rows_cols_with_default(
        rows as i32,
        cols as i32,
        typ,
        core::Scalar::all(0.),
    )?)
}

pub fn mat_to_raster(mat: &Mat) -> Result<Raster, Error> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    let img = RgbImage::from_raw(rgb.cols() as u32, rgb.rows() as u32, rgb.data_bytes()?.to_vec())
        .ok_or_else(|| size_mismatch(&rgb))?;

    Ok(Raster::from_image(img))
}

/// `bgr` selects the channel order of the returned mat.
pub fn raster_to_mat(raster: &Raster, bgr: bool) -> Result<Mat, Error> {
    let (w, h) = raster.dims();
    let mut mat = zeros(h, w, core::CV_8UC3)?;
    mat.data_bytes_mut()?.copy_from_slice(raster.as_image().as_raw());

    if !bgr {
        return Ok(mat);
    }

    let mut out = Mat::default();
    imgproc::cvt_color(&mat, &mut out, imgproc::COLOR_RGB2BGR, 0)?;

    Ok(out)
}

fn field_to_mat(field: ArrayView2<'_, f32>) -> Result<Mat, Error> {
    let (h, w) = field.dim();
    let mut mat = zeros(h, w, core::CV_32FC1)?;

    for (dst, src) in mat.data_typed_mut::<f32>()?.iter_mut().zip(field.iter()) {
        *dst = *src;
    }

    Ok(mat)
}

fn mat_to_field(mat: &Mat) -> Result<Array2<f32>, Error> {
    let shape = (mat.rows() as usize, mat.cols() as usize);
    Ok(Array2::from_shape_vec(shape, mat.data_typed::<f32>()?.to_vec())?)
}

fn gray_to_mat(gray: &GrayImage) -> Result<Mat, Error> {
    let mut mat = zeros(gray.height() as usize, gray.width() as usize, core::CV_8UC1)?;
    mat.data_bytes_mut()?.copy_from_slice(gray.as_raw());

    Ok(mat)
}

/// `cv::GaussianBlur` with a square kernel and sigma derived from its size.
pub fn gaussian_blur(field: ArrayView2<'_, f32>, ksize: usize) -> Result<Array2<f32>, Error> {
    let src = field_to_mat(field)?;
    let mut dst = Mat::default();
    let k = ksize as i32;

    imgproc::gaussian_blur(&src, &mut dst, core::Size::new(k, k), 0.0, 0.0, core::BORDER_DEFAULT)?;

    mat_to_field(&dst)
}

/// `cv::normalize` with `NORM_MINMAX` onto `0..=255`, truncated to bytes.
pub fn normalize(field: ArrayView2<'_, f32>) -> Result<Array2<u8>, Error> {
    let src = field_to_mat(field)?;
    let mut dst = Mat::default();

    core::normalize(&src, &mut dst, 0.0, 255.0, core::NORM_MINMAX, -1, &Mat::default())?;

    Ok(mat_to_field(&dst)?.mapv(|v| v.clamp(0.0, 255.0) as u8))
}

fn cv_colormap(colormap: ColorMap) -> i32 {
    match colormap {
        ColorMap::Jet => imgproc::COLORMAP_JET,
        ColorMap::Hot => imgproc::COLORMAP_HOT,
        ColorMap::Ocean => imgproc::COLORMAP_OCEAN,
        ColorMap::Plasma => imgproc::COLORMAP_PLASMA,
        ColorMap::Inferno => imgproc::COLORMAP_INFERNO,
    }
}

pub fn apply_color_map(gray: &GrayImage, colormap: ColorMap) -> Result<Raster, Error> {
    let src = gray_to_mat(gray)?;
    let mut bgr = Mat::default();

    imgproc::apply_color_map(&src, &mut bgr, cv_colormap(colormap))?;

    mat_to_raster(&bgr)
}

pub fn add_weighted(a: &Raster, alpha: f32, b: &Raster, beta: f32, gamma: f32) -> Result<Raster, Error> {
    let (ma, mb) = (raster_to_mat(a, false)?, raster_to_mat(b, false)?);
    let mut out = Mat::default();

    core::add_weighted(&ma, alpha as f64, &mb, beta as f64, gamma as f64, &mut out, -1)?;

    let (w, h) = a.dims();
    let img = RgbImage::from_raw(w as u32, h as u32, out.data_bytes()?.to_vec())
        .ok_or_else(|| size_mismatch(&out))?;

    Ok(Raster::from_image(img))
}
