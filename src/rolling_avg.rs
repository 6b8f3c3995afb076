use crate::circular_queue::CircularQueue;

/// Trailing mean over the last `window` pushed values.
///
/// Until `window` values were seen the mean is taken over what is available,
/// so the first output equals the first input.
#[derive(Debug, Clone)]
pub struct RollingAvg {
    history: CircularQueue<f32>,
}

impl RollingAvg {
    pub fn new(window: usize) -> Self {
        Self {
            history: CircularQueue::with_capacity(window.max(1)),
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn push(&mut self, value: f32) -> f32 {
        self.history.push(value);
        self.mean()
    }

    /// Summed oldest first on every call, so long runs do not drift.
    pub fn mean(&self) -> f32 {
        let n = self.history.len();

        if n == 0 {
            return 0.0;
        }

        self.history.iter().sum::<f32>() / n as f32
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.history.len()
    }
}

pub fn trailing_mean(values: &[f32], window: usize) -> Vec<f32> {
    let mut avg = RollingAvg::new(window);

    values.iter().map(|&v| avg.push(v)).collect()
}
