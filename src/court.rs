use nalgebra as na;

/// Reference points and line segments of a court, in heatmap grid space.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtGeometry {
    pub points: Vec<na::Point2<i32>>,
    /// index pairs into `points`
    pub lines: Vec<(usize, usize)>,
}

impl CourtGeometry {
    /// Tennis court as seen from above, sized for a 295x551 grid.
    pub fn tennis() -> Self {
        let points = [
            (19, 19),
            (19, 534),
            (276, 19),
            (276, 534),
            (44, 19),
            (44, 534),
            (251, 20),
            (251, 534),
            (19, 276),
            (276, 276),
            (147, 135),
            (146, 420),
            (19, 19),
            (276, 19),
            (19, 534),
            (276, 534),
            (45, 133),
            (251, 133),
            (44, 422),
            (251, 422),
        ]
        .iter()
        .map(|&(x, y)| na::Point2::new(x, y))
        .collect();

        let lines = (0..10).map(|i| (2 * i, 2 * i + 1)).collect();

        Self { points, lines }
    }

    /// Segment end points. Pairs naming a missing point are skipped.
    pub fn segments(&self) -> impl Iterator<Item = (na::Point2<i32>, na::Point2<i32>)> + '_ {
        self.lines
            .iter()
            .filter_map(move |&(a, b)| Some((*self.points.get(a)?, *self.points.get(b)?)))
    }
}

impl Default for CourtGeometry {
    fn default() -> Self {
        Self::tennis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tennis_court_segments() {
        let court = CourtGeometry::tennis();
        let segs: Vec<_> = court.segments().collect();

        assert_eq!(segs.len(), 10);
        // baselines and sidelines
        assert_eq!(segs[0], (na::Point2::new(19, 19), na::Point2::new(19, 534)));
        // net
        assert_eq!(segs[4], (na::Point2::new(19, 276), na::Point2::new(276, 276)));

        for (a, b) in segs {
            assert!(a.x < 295 && b.x < 295 && a.y < 551 && b.y < 551);
        }
    }

    #[test]
    fn dangling_index_is_skipped() {
        let court = CourtGeometry {
            points: vec![na::Point2::new(0, 0), na::Point2::new(5, 5)],
            lines: vec![(0, 1), (1, 7)],
        };

        assert_eq!(court.segments().count(), 1);
    }
}
