use searoute_lib::{smooth_path, GeoPoint, DEFAULT_SMOOTHED_POINTS};

fn zigzag() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(-4.0, 0.0),
        GeoPoint::new(-3.0, 1.0),
        GeoPoint::new(-2.0, 0.0),
        GeoPoint::new(-1.0, 1.0),
        GeoPoint::new(0.0, 0.0),
    ]
}

#[test]
fn default_sample_count_keeps_endpoints() {
    let input = zigzag();
    let smoothed = smooth_path(&input, DEFAULT_SMOOTHED_POINTS);
    assert_eq!(smoothed.len(), DEFAULT_SMOOTHED_POINTS);
    assert_eq!(smoothed.first(), input.first());
    assert_eq!(smoothed.last(), input.last());
    assert!(smoothed
        .iter()
        .all(|point| point.lon.is_finite() && point.lat.is_finite()));
}

#[test]
fn two_samples_collapse_to_endpoints() {
    let input = zigzag();
    assert_eq!(smooth_path(&input, 2), vec![input[0], input[4]]);
}

#[test]
fn consecutive_duplicates_do_not_change_the_curve() {
    let input = zigzag();
    let mut doubled = Vec::new();
    for point in &input {
        doubled.push(*point);
        doubled.push(*point);
    }

    assert_eq!(smooth_path(&doubled, 40), smooth_path(&input, 40));
}

#[test]
fn three_point_paths_are_returned_verbatim() {
    let input = vec![
        GeoPoint::new(1.0, 1.0),
        GeoPoint::new(2.0, 3.0),
        GeoPoint::new(4.0, 2.0),
    ];
    assert_eq!(smooth_path(&input, DEFAULT_SMOOTHED_POINTS), input);
}
