//! OpenCV backed video decoding/encoding. Frames cross the boundary as RGB
//! [`Raster`]s.

use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio,
};
use std::path::Path;
use tracing::{debug, info};

use crate::cv::{mat_to_raster, raster_to_mat};
use crate::error::Error;
use crate::raster::Raster;

pub struct VideoSource {
    cam: videoio::VideoCapture,
    frame: Mat,
    pub fps: f64,
    pub width: usize,
    pub height: usize,
    pub total: usize,
}

impl VideoSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path.to_string_lossy();

        let cam = videoio::VideoCapture::from_file(&name, videoio::CAP_ANY)
            .map_err(|e| Error::input_unavailable(path, e))?;

        if !videoio::VideoCapture::is_opened(&cam)? {
            return Err(Error::input_unavailable(path, "could not open video"));
        }

        let fps = cam.get(videoio::CAP_PROP_FPS)?;
        let width = cam.get(videoio::CAP_PROP_FRAME_WIDTH)? as usize;
        let height = cam.get(videoio::CAP_PROP_FRAME_HEIGHT)? as usize;
        let total = cam.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as usize;

        info!(?path, width, height, fps, total, "video opened");

        Ok(Self {
            cam,
            frame: Mat::default(),
            fps,
            width,
            height,
            total,
        })
    }
}

impl Iterator for VideoSource {
    type Item = Result<Raster, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cam.read(&mut self.frame) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => return Some(Err(err.into())),
        }

        if self.frame.cols() == 0 || self.frame.rows() == 0 {
            return None;
        }

        Some(mat_to_raster(&self.frame))
    }
}

/// Encoder opened on the first frame, so the output takes the input size.
pub struct VideoWriter {
    writer: Option<videoio::VideoWriter>,
    size: Option<(i32, i32)>,
    fps: f64,
    out_file: String,
}

impl VideoWriter {
    pub fn new<S: ToString>(out_file: S, fps: f64) -> Self {
        Self {
            writer: None,
            size: None,
            fps,
            out_file: out_file.to_string(),
        }
    }

    pub fn release(&mut self) -> Result<(), Error> {
        if let Some(mut w) = self.writer.take() {
            w.release()?;
        }

        Ok(())
    }

    fn reinit(&mut self, size: (i32, i32)) -> Result<(), Error> {
        debug!(?size, out = %self.out_file, "video writer init");
        self.release()?;

        self.size = Some(size);
        self.writer = Some(videoio::VideoWriter::new(
            &self.out_file,
            videoio::VideoWriter::fourcc(b'm' as _, b'p' as _, b'4' as _, b'v' as _)?,
            self.fps,
            core::Size::new(size.0, size.1),
            true,
        )?);

        Ok(())
    }

    pub fn feed(&mut self, frame: &Raster) -> Result<(), Error> {
        let (w, h) = frame.dims();
        let size = (w as i32, h as i32);

        if self.writer.is_none() || self.size != Some(size) {
            self.reinit(size)?;
        }

        let mat = raster_to_mat(frame, true)?;

        if let Some(writer) = self.writer.as_mut() {
            writer.write(&mat)?;
        }

        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
