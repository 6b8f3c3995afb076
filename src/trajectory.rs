use nalgebra as na;
use tracing::debug;

use crate::detection::{Observation, Position};
use crate::error::Error;
use crate::math;

/// Fills missing entries of one coordinate channel.
///
/// Interior gaps are linearly interpolated between the nearest known
/// neighbours, leading gaps take the first known value and trailing gaps the
/// last known value. Returns `None` if nothing is known.
pub fn fill_gaps(values: &[Option<f32>]) -> Option<Vec<f32>> {
    let first = values.iter().flatten().next().copied()?;

    // nearest known entry at or after each index
    let mut next_known = vec![None; values.len()];
    let mut next = None;
    for (idx, value) in values.iter().enumerate().rev() {
        if let Some(v) = value {
            next = Some((idx, *v));
        }
        next_known[idx] = next;
    }

    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<(usize, f32)> = None;

    for (idx, value) in values.iter().enumerate() {
        let filled = match (value, prev, next_known[idx]) {
            (Some(v), _, _) => {
                prev = Some((idx, *v));
                *v
            }

            // leading gap, backward fill
            (None, None, _) => first,

            (None, Some((pidx, pval)), Some((nidx, nval))) => {
                let t = (idx - pidx) as f32 / (nidx - pidx) as f32;
                math::lerp(pval, nval, t)
            }

            // trailing gap, forward fill
            (None, Some((_, pval)), None) => pval,
        };

        out.push(filled);
    }

    Some(out)
}

/// Turns a detection sequence into a dense per-frame trajectory of box centers.
pub fn interpolate(observations: &[Observation]) -> Result<Vec<Position>, Error> {
    let positions: Vec<_> = observations.iter().map(Observation::position).collect();
    let known = positions.iter().flatten().count();

    let xs: Vec<_> = positions.iter().map(|p| p.map(|p| p.x())).collect();
    let ys: Vec<_> = positions.iter().map(|p| p.map(|p| p.y())).collect();

    let insufficient = || Error::InsufficientData {
        frames: observations.len(),
    };

    let xs = fill_gaps(&xs).ok_or_else(insufficient)?;
    let ys = fill_gaps(&ys).ok_or_else(insufficient)?;

    debug!(
        frames = observations.len(),
        known,
        filled = observations.len() - known,
        "trajectory interpolated"
    );

    Ok(observations
        .iter()
        .zip(xs.into_iter().zip(ys))
        .map(|(obs, (x, y))| Position::new(obs.frame_index, na::Point2::new(x, y)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::detection::Detection;

    fn obs(idx: usize, b: Option<[f32; 4]>) -> Observation {
        Observation::new(
            idx,
            b.map(|[x1, y1, x2, y2]| Detection::new(BBox::ltrb(x1, y1, x2, y2), 1.0, 0)),
        )
    }

    #[test]
    fn fills_interior_gap_linearly() {
        let out = fill_gaps(&[Some(0.0), None, None, None, Some(8.0)]).unwrap();
        assert_eq!(out, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn fills_edges_by_propagation() {
        let out = fill_gaps(&[None, None, Some(3.0), None, Some(5.0), None]).unwrap();
        assert_eq!(out, vec![3.0, 3.0, 3.0, 4.0, 5.0, 5.0]);
    }

    #[test]
    fn long_gap_is_linear_time() {
        let mut values = vec![None; 200_000];
        values[0] = Some(0.0);
        values[150_000] = Some(150_000.0);

        let started = std::time::Instant::now();
        let out = fill_gaps(&values).unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(out.len(), values.len());
        assert_eq!(out[75_000], 75_000.0);
        assert_eq!(out[199_999], 150_000.0);
    }

    #[test]
    fn nothing_known() {
        assert!(fill_gaps(&[None, None]).is_none());
        assert!(fill_gaps(&[]).is_none());

        let err = interpolate(&[obs(0, None), obs(1, None)]).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { frames: 2 }));
        assert!(matches!(interpolate(&[]), Err(Error::InsufficientData { frames: 0 })));
    }

    #[test]
    fn dense_and_same_length() {
        let seq = vec![
            obs(0, None),
            obs(1, Some([0.0, 0.0, 10.0, 10.0])),
            obs(2, None),
            obs(3, Some([10.0, 20.0, 20.0, 30.0])),
            obs(4, None),
        ];

        let traj = interpolate(&seq).unwrap();
        assert_eq!(traj.len(), seq.len());

        let pts: Vec<_> = traj.iter().map(|p| (p.x(), p.y())).collect();
        assert_eq!(
            pts,
            vec![(5.0, 5.0), (5.0, 5.0), (10.0, 15.0), (15.0, 25.0), (15.0, 25.0)]
        );

        for (i, p) in traj.iter().enumerate() {
            assert_eq!(p.frame_index, i);
        }
    }

    #[test]
    fn idempotent_on_dense_input() {
        let seq: Vec<_> = (0..20)
            .map(|i| {
                let v = i as f32 * 1.5;
                obs(i, if i % 3 == 0 { None } else { Some([v, 2.0 * v, v + 4.0, 2.0 * v + 4.0]) })
            })
            .collect();

        let first = interpolate(&seq).unwrap();
        let dense: Vec<_> = first
            .iter()
            .map(|p| obs(p.frame_index, Some([p.x(), p.y(), p.x(), p.y()])))
            .collect();
        let second = interpolate(&dense).unwrap();

        assert_eq!(first, second);
    }
}
