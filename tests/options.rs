use super4pcs_core::{CongruentMatcher, CoreError, MatchOptions, Point3D};

#[test]
fn test_options_json_round_trip() {
    let options = MatchOptions {
        max_normal_difference: 20.0,
        multiscale: true,
        healpix_resolution: 8,
        ..Default::default()
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: MatchOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn test_partial_document_keeps_defaults() {
    let options: MatchOptions = serde_json::from_str(r#"{ "min_node_size": 10, "max_color_distance": 0.2 }"#).unwrap();
    assert_eq!(options.min_node_size, 10);
    assert_eq!(options.max_color_distance, 0.2);
    assert_eq!(options.normal_grid_size, MatchOptions::default().normal_grid_size);
    assert!(!options.multiscale);
    assert!(options.filters_colors());
    assert!(!options.filters_normals());

    // pipeline-level keys such as the registration accuracy are ignored
    let options: MatchOptions = serde_json::from_str(r#"{ "delta": 5.0, "min_node_size": 12 }"#).unwrap();
    assert_eq!(options.min_node_size, 12);
}

#[test]
fn test_matcher_rejects_invalid_options() {
    let q = vec![Point3D::from_pos([0.0, 0.0, 0.0])];
    let options: MatchOptions = serde_json::from_str(r#"{ "normal_grid_size": 0 }"#).unwrap();
    assert!(matches!(CongruentMatcher::new(&q, options), Err(CoreError::InvalidConfiguration(_))));
}
