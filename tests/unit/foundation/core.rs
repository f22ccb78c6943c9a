use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(25, 0).is_err());
}

#[test]
fn fps_frame_timestamps() {
    let fps = Fps::new(4, 1).unwrap();
    assert_eq!(fps.frame_duration_secs(), 0.25);
    assert_eq!(fps.frames_to_secs(10), 2.5);

    let ntsc = Fps::new(30000, 1001).unwrap();
    assert!((ntsc.as_f64() - 29.97).abs() < 1e-2);
}

#[test]
fn color_rescales_and_interpolates() {
    assert_eq!(Color::from_rgb8([255, 0, 255]), Color::new(1.0, 0.0, 1.0));
    assert_eq!(Color::from_rgb8([0, 0, 0]), Color::BLACK);

    let mid = Color::lerp(Color::BLACK, Color::WHITE, 0.25);
    assert_eq!(mid, Color::gray(0.25));
    assert_eq!(mid.to_array(), [0.25, 0.25, 0.25]);
}
