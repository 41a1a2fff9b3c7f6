use super::*;

#[test]
fn empty_object_gives_defaults() {
    let cfg = SlideshowConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, SlideshowConfig::default());
    assert_eq!(cfg.panel.width, 800);
    assert_eq!(cfg.panel.height, 480);
    assert_eq!(cfg.strategy, Strategy::CanvasFull);
    assert_eq!(cfg.delay(), Duration::from_secs(3));
    assert_eq!(cfg.empty_poll(), Duration::from_secs(5));
    assert_eq!(cfg.policy(), SchedulerPolicy::default());
    cfg.validate().unwrap();
}

#[test]
fn parses_overrides() {
    let json = r#"{
        "image_dir": "/tmp/pics",
        "panel": { "width": 400, "height": 300 },
        "strategy": "canvas-partial-circle",
        "delay_secs": 0.5,
        "layer_threshold": 5
    }"#;
    let cfg = SlideshowConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.image_dir, PathBuf::from("/tmp/pics"));
    assert_eq!(cfg.panel, PanelSize::new(400, 300).unwrap());
    assert_eq!(cfg.strategy, Strategy::CanvasPartialCircle);
    assert_eq!(cfg.delay(), Duration::from_millis(500));
    assert_eq!(cfg.policy().layer_threshold, 5);
    assert_eq!(cfg.policy().circle_margin, 10);
}

#[test]
fn unknown_fields_and_strategies_are_serde_errors() {
    let err = SlideshowConfig::from_reader(r#"{"delay": 3}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, GhostError::Serde(_)));
    let err = SlideshowConfig::from_reader(r#"{"strategy": "fast"}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, GhostError::Serde(_)));
}

#[test]
fn validate_rejects_bad_values() {
    let bad = [
        SlideshowConfig {
            panel: PanelSize {
                width: 801,
                height: 480,
            },
            ..SlideshowConfig::default()
        },
        SlideshowConfig {
            maintenance_interval: 0,
            ..SlideshowConfig::default()
        },
        SlideshowConfig {
            delay_secs: -1.0,
            ..SlideshowConfig::default()
        },
        SlideshowConfig {
            empty_poll_secs: f64::NAN,
            ..SlideshowConfig::default()
        },
    ];
    for cfg in bad.into_iter().chain([
        SlideshowConfig {
            delay_secs: 1e30,
            ..SlideshowConfig::default()
        },
        SlideshowConfig {
            empty_poll_secs: MAX_WAIT_SECS + 1.0,
            ..SlideshowConfig::default()
        },
    ]) {
        assert!(
            matches!(cfg.validate(), Err(GhostError::Validation(_))),
            "{cfg:?}"
        );
    }
}

#[test]
fn missing_file_is_validation_error() {
    let err = SlideshowConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("not/here.json"));
}

#[test]
fn durations_saturate_instead_of_panicking() {
    let cfg = SlideshowConfig {
        delay_secs: 1e30,
        empty_poll_secs: -2.0,
        ..SlideshowConfig::default()
    };
    assert_eq!(cfg.delay(), Duration::MAX);
    assert_eq!(cfg.empty_poll(), Duration::ZERO);

    let at_limit = SlideshowConfig {
        delay_secs: MAX_WAIT_SECS,
        ..SlideshowConfig::default()
    };
    at_limit.validate().unwrap();
    assert_eq!(at_limit.delay(), Duration::from_secs(86_400));
}
