use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

/// Single detector result in frame pixel space
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BBox<Ltrb>,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: i32,
}

impl Detection {
    #[inline]
    pub fn new(bbox: BBox<Ltrb>, confidence: f32, class: i32) -> Self {
        Self {
            bbox,
            confidence,
            class,
        }
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }
}

/// One frame worth of detector output. `detection` is `None` when nothing was found.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub frame_index: usize,
    pub detection: Option<Detection>,
}

impl Observation {
    #[inline]
    pub fn new(frame_index: usize, detection: Option<Detection>) -> Self {
        Self {
            frame_index,
            detection,
        }
    }

    #[inline]
    pub fn absent(frame_index: usize) -> Self {
        Self::new(frame_index, None)
    }

    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.detection
            .map(|det| Position::new(self.frame_index, det.center()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub frame_index: usize,
    pub point: na::Point2<f32>,
}

impl Position {
    #[inline]
    pub fn new(frame_index: usize, point: na::Point2<f32>) -> Self {
        Self { frame_index, point }
    }

    #[inline(always)]
    pub fn x(&self) -> f32 {
        self.point.x
    }

    #[inline(always)]
    pub fn y(&self) -> f32 {
        self.point.y
    }
}

/// Which way the smoothed vertical velocity flipped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversal {
    /// moving down the image (y growing), then up
    Negative,
    /// moving up the image, then down
    Positive,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub frame_index: usize,
    pub point: na::Point2<f32>,
    pub reversal: Reversal,
}

impl HitEvent {
    #[inline(always)]
    pub fn x(&self) -> f32 {
        self.point.x
    }

    #[inline(always)]
    pub fn y(&self) -> f32 {
        self.point.y
    }
}
