use nalgebra as na;
use tracing::trace;

use crate::circular_queue::CircularQueue;
use crate::config::TrailConfig;
use crate::detection::Observation;
use crate::error::Error;
use crate::raster::Raster;

/// Per-run trail overlay state: the recent ball centers and the canvas they
/// were drawn on. The canvas is never cleared, old segments stay visible after
/// their points leave the queue.
pub struct TrailRenderer {
    config: TrailConfig,
    points: CircularQueue<na::Point2<i32>>,
    canvas: Raster,
}

impl TrailRenderer {
    pub fn new(width: usize, height: usize, config: TrailConfig) -> Self {
        Self {
            points: CircularQueue::with_capacity(config.capacity),
            canvas: Raster::new(width, height),
            config,
        }
    }

    /// Recent centers, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &na::Point2<i32>> + '_ {
        self.points.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn canvas(&self) -> &Raster {
        &self.canvas
    }

    /// Integer center of the tracked ball if it lies inside the frame.
    fn accept(&self, observation: &Observation) -> Option<na::Point2<i32>> {
        let det = observation.detection?;

        if det.class != self.config.tracked_class {
            return None;
        }

        // truncate the corners first, then halve, same as pixel boxes are drawn
        let bbox = det.bbox;
        let cx = (bbox.left() as i32 + bbox.right() as i32).div_euclid(2);
        let cy = (bbox.top() as i32 + bbox.bottom() as i32).div_euclid(2);
        let center = na::Point2::new(cx, cy);

        if self.canvas.contains(center) {
            Some(center)
        } else {
            trace!(frame = observation.frame_index, ?center, "center outside frame");
            None
        }
    }

    /// Adds the observed center (if any) and draws the queue onto the canvas.
    /// Returns whether anything was drawn.
    pub fn update(&mut self, observation: &Observation) -> bool {
        let center = match self.accept(observation) {
            Some(center) => center,
            None => return false,
        };

        self.points.push(center);

        for (prev, curr) in self.points.pairs() {
            self.canvas.draw_line(
                *prev,
                *curr,
                self.config.line_color,
                self.config.line_thickness,
            );
        }

        self.canvas
            .fill_circle(center, self.config.marker_radius, self.config.marker_color);

        true
    }

    /// Blends the persistent canvas over `frame`.
    pub fn composite(&self, frame: &Raster) -> Result<Raster, Error> {
        frame.add_weighted(
            self.config.frame_weight,
            &self.canvas,
            self.config.canvas_weight,
            0.0,
        )
    }

    /// One step of the frame loop.
    pub fn render(&mut self, observation: &Observation, frame: &Raster) -> Result<Raster, Error> {
        self.update(observation);
        self.composite(frame)
    }
}
