use super::*;

#[test]
fn dimensions_reject_zero() {
    assert!(Dimensions::new(0, 10).is_err());
    assert!(Dimensions::new(10, 0).is_err());
    let d = Dimensions::new(240, 280).unwrap();
    assert_eq!(d.pixel_count(), 67_200);
    assert_eq!(d.to_string(), "240x280");
}

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0).is_err());
    let fps = Fps::new(25).unwrap();
    assert!((fps.frame_duration_secs() - 0.04).abs() < 1e-12);
}

#[test]
fn default_config_targets_display_and_validates() {
    let cfg = PipelineConfig::default();
    assert_eq!((cfg.width, cfg.height), (240, 280));
    assert_eq!(cfg.dither_strength, 0.0);
    cfg.validate().unwrap();
}

#[test]
fn validate_rejects_out_of_range_fields() {
    let bad = [
        PipelineConfig {
            dither_strength: 1.5,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            width: 70_000,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            saturation_boost: 0.5,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            palette_pixel_stride: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            jpeg_quality: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            fetch_threads: Some(0),
            ..PipelineConfig::default()
        },
        PipelineConfig {
            sharpen_amount: 0.5,
            sharpen_sigma: 0.0,
            ..PipelineConfig::default()
        },
    ];
    for cfg in bad {
        assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
    }
}

#[test]
fn config_json_fills_missing_fields_with_defaults() {
    let cfg: PipelineConfig =
        serde_json::from_str(r#"{"width": 64, "height": 32, "dither_strength": 0.5}"#).unwrap();
    assert_eq!((cfg.width, cfg.height), (64, 32));
    assert_eq!(cfg.dither_strength, 0.5);
    assert_eq!(cfg.black_floor, PipelineConfig::default().black_floor);
}

#[test]
fn thread_pool_honours_count() {
    let pool = build_thread_pool(Some(2)).unwrap();
    assert_eq!(pool.current_num_threads(), 2);
    assert!(build_thread_pool(Some(0)).is_err());
}
