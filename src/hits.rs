//! Hit detection: frames where the smoothed vertical motion of the ball flips
//! direction and keeps the new direction for most of the following window.

use tracing::{debug, info};

use crate::config::HitConfig;
use crate::detection::{HitEvent, Position, Reversal};
use crate::rolling_avg;

/// Number of frames inspected after a candidate reversal.
#[inline]
pub fn scan_window(min_change_frames: usize) -> usize {
    // floor(min_change_frames * 1.2) without going through floats
    min_change_frames * 6 / 5
}

/// First difference, `None` at index 0.
pub fn deltas(values: &[f32]) -> Vec<Option<f32>> {
    std::iter::once(None)
        .chain(values.windows(2).map(|w| Some(w[1] - w[0])))
        .take(values.len())
        .collect()
}

pub fn reversal(curr: Option<f32>, next: Option<f32>) -> Option<Reversal> {
    match (curr, next) {
        (Some(a), Some(b)) if a > 0.0 && b < 0.0 => Some(Reversal::Negative),
        (Some(a), Some(b)) if a < 0.0 && b > 0.0 => Some(Reversal::Positive),
        _ => None,
    }
}

/// Counts frames in `idx + 1 ..= idx + window` whose delta agrees with the
/// reversal found at `idx`. Frames past the end are not counted.
pub fn consistent_changes(
    deltas: &[Option<f32>],
    idx: usize,
    window: usize,
    kind: Reversal,
) -> usize {
    let end = (idx + window + 1).min(deltas.len());
    let from = (idx + 1).min(end);

    deltas[from..end]
        .iter()
        .filter(|d| match (kind, d) {
            (Reversal::Negative, Some(d)) => *d < 0.0,
            (Reversal::Positive, Some(d)) => *d > 0.0,
            _ => false,
        })
        .count()
}

/// Flags direction reversals of the dense trajectory, in ascending frame order.
///
/// Candidates closer than the scan window to the end of the trajectory are
/// never considered, so short trajectories yield no hits.
pub fn detect_hits(trajectory: &[Position], config: &HitConfig) -> Vec<HitEvent> {
    let ys: Vec<f32> = trajectory.iter().map(Position::y).collect();
    let smoothed = rolling_avg::trailing_mean(&ys, config.rolling_window);
    let deltas = deltas(&smoothed);

    let window = scan_window(config.min_change_frames);
    let mut hits = Vec::new();

    for idx in 1..trajectory.len().saturating_sub(window) {
        let kind = match reversal(deltas[idx], deltas[idx + 1]) {
            Some(kind) => kind,
            None => continue,
        };

        let count = consistent_changes(&deltas, idx, window, kind);

        if count >= config.min_change_frames {
            let pos = &trajectory[idx];

            debug!(frame = pos.frame_index, ?kind, count, "hit");

            hits.push(HitEvent {
                frame_index: pos.frame_index,
                point: pos.point,
                reversal: kind,
            });
        } else {
            debug!(frame = trajectory[idx].frame_index, count, "reversal not sustained");
        }
    }

    info!(frames = trajectory.len(), hits = hits.len(), "hit detection done");

    hits
}
