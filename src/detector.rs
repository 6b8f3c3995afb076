use ndarray::prelude::*;
use std::collections::HashMap;

use crate::bbox::BBox;
use crate::config::DetectorConfig;
use crate::detection::{Detection, Observation};
use crate::error::Error;
use crate::raster::Raster;

/// Anything that can find the ball in a frame.
pub trait Detector {
    fn detect(&mut self, frame_index: usize, frame: &Raster) -> Result<Option<Detection>, Error>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame_index: usize, frame: &Raster) -> Result<Option<Detection>, Error> {
        (**self).detect(frame_index, frame)
    }
}

/// Replays prepared results by frame index and ignores the pixels.
#[derive(Debug, Clone, Default)]
pub struct SequenceDetector {
    results: HashMap<usize, Detection>,
}

impl SequenceDetector {
    pub fn new<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Option<Detection>>,
    {
        Self {
            results: results
                .into_iter()
                .enumerate()
                .filter_map(|(idx, det)| Some((idx, det?)))
                .collect(),
        }
    }

    pub fn from_observations(observations: &[Observation]) -> Self {
        Self {
            results: observations
                .iter()
                .filter_map(|obs| Some((obs.frame_index, obs.detection?)))
                .collect(),
        }
    }
}

impl Detector for SequenceDetector {
    fn detect(&mut self, frame_index: usize, _frame: &Raster) -> Result<Option<Detection>, Error> {
        Ok(self.results.get(&frame_index).copied())
    }
}

/// Decodes a YOLOv5 style output tensor `[batch, preds, 5 + classes]` (center,
/// size, objectness, class scores in model input pixels) into the single most
/// confident detection of the tracked class for every batch entry.
pub fn yolo_postprocess(
    view: ArrayView3<'_, f32>,
    in_w: usize,
    in_h: usize,
    frame_width: i32,
    frame_height: i32,
    with_crop: bool,
    config: &DetectorConfig,
) -> Vec<Option<Detection>> {
    let (nbatches, npreds, pred_size) = view.dim();

    let (ox, oy, ow, oh) = if with_crop {
        let in_a = in_h as f32 / in_w as f32;
        let frame_a = frame_height as f32 / frame_width as f32;

        if in_a > frame_a {
            let w = frame_height as f32 / in_a;
            ((frame_width as f32 - w) / 2.0, 0.0, w, frame_height as f32)
        } else {
            let h = frame_width as f32 * in_a;
            (0.0, (frame_height as f32 - h) / 2.0, frame_width as f32, h)
        }
    } else {
        (0.0, 0.0, frame_width as f32, frame_height as f32)
    };

    let (sx, sy) = (ow / in_w as f32, oh / in_h as f32);
    let max_area = ((frame_width / 2) * (frame_height / 2)) as f32;

    if pred_size <= 5 {
        return vec![None; nbatches];
    }

    (0..nbatches)
        .map(|batch| {
            let preds = view.index_axis(Axis(0), batch);
            let mut best: Option<Detection> = None;

            for index in 0..npreds {
                let det = preds.index_axis(Axis(0), index);
                let objectness = det[4];

                let mut class_index = -1;
                let mut score = 0.0;

                for (idx, val) in det.slice(s![5..]).iter().copied().enumerate() {
                    if val > score {
                        class_index = idx as i32;
                        score = val;
                    }
                }

                let confidence = objectness * score;

                if class_index != config.tracked_class
                    || confidence <= config.confidence_threshold
                {
                    continue;
                }

                let bbox = BBox::xywh(
                    ox + det[0] * sx,
                    oy + det[1] * sy,
                    det[2] * sx,
                    det[3] * sy,
                );

                // a ball never fills a quarter of the frame
                if bbox.area() > max_area {
                    continue;
                }

                if best.map_or(true, |b| confidence > b.confidence) {
                    best = Some(Detection::new(bbox.as_ltrb(), confidence, class_index));
                }
            }

            best
        })
        .collect()
}

#[cfg(feature = "opencv")]
pub use self::yolo::YoloDetector;

#[cfg(feature = "opencv")]
mod yolo {
    use ndarray::prelude::*;
    use opencv::{core, dnn, prelude::*};

    use super::{yolo_postprocess, Detector};
    use crate::config::DetectorConfig;
    use crate::detection::Detection;
    use crate::error::Error;
    use crate::raster::Raster;
    use crate::cv;

    pub struct YoloDetector {
        net: dnn::Net,
        config: DetectorConfig,
    }

    impl YoloDetector {
        pub fn new(model_src: &str, config: DetectorConfig) -> Result<Self, Error> {
            let net = dnn::read_net_from_onnx(model_src)
                .map_err(|e| Error::input_unavailable(model_src, e))?;

            Ok(Self { net, config })
        }
    }

    impl Detector for YoloDetector {
        fn detect(&mut self, _frame_index: usize, frame: &Raster) -> Result<Option<Detection>, Error> {
            let (w, h) = (self.config.input_width, self.config.input_height);
            let mat = cv::raster_to_mat(frame, false)?;

            // raster is already RGB, no channel swap
            let blob = dnn::blob_from_image(
                &mat,
                1.0 / 255.0,
                core::Size::new(w as _, h as _),
                core::Scalar::new(0., 0., 0., 0.),
                false,
                false,
                core::CV_32F,
            )?;

            self.net.set_input(&blob, "", 1.0, core::Scalar::default())?;
            let out = self.net.forward_single("")?;

            let dims: Vec<usize> = out.mat_size().iter().map(|&d| d as usize).collect();
            let shape = match dims.as_slice() {
                [b, n, p] => (*b, *n, *p),
                [n, p] => (1, *n, *p),
                _ => return Ok(None),
            };

            let view = ArrayView3::from_shape(shape, out.data_typed::<f32>()?)?;
            let (fw, fh) = frame.dims();

            Ok(
                yolo_postprocess(view, w, h, fw as i32, fh as i32, false, &self.config)
                    .into_iter()
                    .next()
                    .flatten(),
            )
        }
    }
}
