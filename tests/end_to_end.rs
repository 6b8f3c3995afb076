use balltrace::bbox::BBox;
use balltrace::config::{HeatmapConfig, HitConfig};
use balltrace::{pipeline, records, trajectory};
use balltrace::{CourtGeometry, Detection, Heatmap, HeatmapGrid, Observation, SequenceDetector};
use nalgebra as na;

fn ball_box(x1: f32, y1: f32, x2: f32, y2: f32) -> Option<Detection> {
    Some(Detection::new(BBox::ltrb(x1, y1, x2, y2), 0.9, 0))
}

fn falling_ball_with_gap() -> Vec<Option<Detection>> {
    std::iter::repeat(ball_box(10.0, 10.0, 20.0, 20.0))
        .take(30)
        .chain(std::iter::repeat(None).take(5))
        .chain(std::iter::repeat(ball_box(10.0, 70.0, 20.0, 80.0)).take(30))
        .collect()
}

#[test]
fn gap_is_interpolated_and_straight_fall_has_no_hits() {
    let mut detector = SequenceDetector::new(falling_ball_with_gap());
    let frames = (0..65).map(|_| Ok(balltrace::Raster::new(32, 96)));
    let observations = pipeline::detect_sequence(&mut detector, frames).unwrap();

    assert_eq!(observations.len(), 65);
    assert_eq!(observations.iter().filter(|o| o.detection.is_none()).count(), 5);

    let traj = trajectory::interpolate(&observations).unwrap();
    assert_eq!(traj.len(), 65);

    let gap: Vec<f32> = traj[30..35].iter().map(|p| p.y()).collect();
    assert_eq!(gap, vec![25.0, 35.0, 45.0, 55.0, 65.0]);
    assert!(traj[30..35].iter().all(|p| p.x() == 15.0));
    assert!(gap.iter().all(|&y| y > 15.0 && y < 75.0));

    let hits = pipeline::find_hits(&observations, &HitConfig::default()).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn bounce_survives_csv_and_lands_on_heatmap() {
    // ball goes down the image for 60 frames, bounces and comes back up
    let observations: Vec<Observation> = (0..120)
        .map(|i| {
            let y = if i <= 60 { 100.0 + i as f32 * 4.0 } else { 580.0 - i as f32 * 4.0 };
            let det = if i % 11 == 5 { None } else { ball_box(140.0, y - 3.0, 146.0, y + 3.0) };
            Observation::new(i, det)
        })
        .collect();

    let hits = pipeline::find_hits(&observations, &HitConfig::default()).unwrap();
    assert_eq!(hits.len(), 1);
    assert!((hits[0].frame_index as i64 - 60).abs() <= 3);

    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("hits.csv");
    records::save_hits(&csv, &hits).unwrap();

    let loaded = records::load_hits(&csv).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].frame_index, hits[0].frame_index);

    let map = Heatmap::build(
        loaded.iter().map(|p| p.point),
        &HeatmapConfig::default(),
        &CourtGeometry::tennis(),
    )
    .unwrap();
    let (x, y) = (loaded[0].x() as usize, loaded[0].y() as usize);

    assert_eq!(map.grid.get(x, y), Some(1.0));
    assert_eq!(map.dropped, 0);
}

#[test]
fn grid_counts_before_smoothing() {
    let mut grid = HeatmapGrid::new(300, 400);
    let dropped = grid.accumulate(vec![
        na::Point2::new(50.0, 60.0),
        na::Point2::new(50.0, 60.0),
        na::Point2::new(200.0, 300.0),
    ]);

    assert_eq!(dropped, 0);
    assert_eq!(grid.get(50, 60), Some(2.0));
    assert_eq!(grid.get(200, 300), Some(1.0));
    assert_eq!(grid.total(), 3.0);

    let config = HeatmapConfig {
        width: 300,
        height: 400,
        ..Default::default()
    };
    let map = Heatmap::build(
        vec![
            na::Point2::new(50.0, 60.0),
            na::Point2::new(50.0, 60.0),
            na::Point2::new(200.0, 300.0),
            na::Point2::new(350.0, 60.0),
        ],
        &config,
        &CourtGeometry {
            points: vec![],
            lines: vec![],
        },
    )
    .unwrap();

    assert_eq!(map.dropped, 1);
    assert_eq!(map.intensity.iter().copied().max(), Some(255));
    assert_eq!(map.intensity.iter().copied().min(), Some(0));
    assert_eq!(map.intensity[[60, 50]], 255);
    assert!(map.intensity[[300, 200]] > 0 && map.intensity[[300, 200]] < 255);
}
