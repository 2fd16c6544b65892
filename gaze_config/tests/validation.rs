use gaze_config::load_toml;
use rstest::rstest;

#[rstest]
fn accepts_full_config() {
    let toml = r#"
[smoothing]
min_cutoff = 1.5
beta = 0.01
d_cutoff = 1.0
base_freq_hz = 30.0

[outlier]
window = 20
warmup = 5
z_threshold = 3.0
min_std_px = 10.0

[fixation]
radius_px = 50.0
min_duration_ms = 100.0

[tracking]
read_threshold_ms = 250.0

[drift]
window_ms = 10000.0
check_interval_ms = 5000.0
no_data_ms = 3000.0
margin_px = 50.0
off_screen_ratio = 0.4
min_samples = 10

[viewport]
width = 1920.0
height = 1080.0

[calibration]
average_error_px = 92.5

[logging]
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.viewport.width, 1920.0);
    assert_eq!(cfg.calibration.average_error_px, Some(92.5));
}

#[rstest]
#[case("[outlier]\nwindow = 0\n", "outlier.window must be >= 1")]
#[case("[outlier]\nwindow = 4\nwarmup = 5\n", "outlier.warmup must not exceed")]
#[case("[outlier]\nz_threshold = 0.0\n", "outlier.z_threshold must be > 0")]
#[case("[smoothing]\nmin_cutoff = 0.0\n", "smoothing.min_cutoff must be > 0")]
#[case("[smoothing]\nbeta = -0.1\n", "smoothing.beta must be >= 0")]
#[case("[smoothing]\nbase_freq_hz = nan\n", "smoothing.base_freq_hz must be > 0")]
#[case("[fixation]\nradius_px = -5.0\n", "fixation.radius_px must be > 0")]
#[case("[fixation]\nmin_duration_ms = -1.0\n", "fixation.min_duration_ms must be >= 0")]
#[case("[tracking]\nread_threshold_ms = 0.0\n", "tracking.read_threshold_ms must be > 0")]
#[case("[drift]\noff_screen_ratio = 1.5\n", "drift.off_screen_ratio must be in")]
#[case("[drift]\ncheck_interval_ms = 0.0\n", "drift.check_interval_ms must be > 0")]
#[case("[drift]\nmin_samples = 0\n", "drift.min_samples must be >= 1")]
#[case("[viewport]\nwidth = 0.0\n", "viewport.width and viewport.height")]
#[case("[calibration]\naverage_error_px = -3.0\n", "calibration.average_error_px")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[rstest]
fn large_radius_is_accepted_and_left_to_runtime_clamp() {
    let cfg = load_toml("[fixation]\nradius_px = 900.0\n").expect("parse TOML");
    cfg.validate().expect("radius is clamped later, not rejected");
}

#[rstest]
fn wrong_type_fails_to_parse() {
    assert!(load_toml("[outlier]\nwindow = \"twenty\"\n").is_err());
}
