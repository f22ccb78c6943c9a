use super::*;

const EPS: f64 = 1e-6;

fn v(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

fn points() -> Vec<TrajectoryPoint> {
    vec![
        TrajectoryPoint::linear(0.0, v(0.0, 0.0, 0.0)),
        TrajectoryPoint::linear(4.0, v(0.0, 0.0, 8.0)),
        TrajectoryPoint::curved(10.0, v(6.0, 0.0, 8.0), &[v(2.0, 5.0, 8.0), v(4.0, -5.0, 9.0)]),
        TrajectoryPoint::linear(10.0, v(6.0, 3.0, 8.0)),
        TrajectoryPoint::curved(14.0, v(2.0, 3.0, 6.0), &[v(6.0, 6.0, 7.0)]),
    ]
}

fn assert_replay_matches(window: TimeWindow) {
    let original = points();
    let cut = trajectory_segments_in_time_window(&original, window).unwrap();

    let mut full = TrajectoryPlayer::from_points(&original, 0.0);
    let mut part = TrajectoryPlayer::from_points(&cut, 0.0);
    let (mut a, mut b) = (Vec3::ZERO, Vec3::ZERO);

    let steps = 200;
    for i in 0..=steps {
        let t = window.start_time + window.duration * f64::from(i) / f64::from(steps);
        full.position_at(t, &mut a).unwrap();
        part.position_at(t, &mut b).unwrap();
        assert!(a.abs_diff_eq(b, EPS), "position at t={t}: {a} vs {b}");

        full.velocity_at(t, &mut a).unwrap();
        part.velocity_at(t, &mut b).unwrap();
        if t < window.end_time() {
            assert!(a.abs_diff_eq(b, 1e-5), "velocity at t={t}: {a} vs {b}");
        }
    }
}

#[test]
fn window_inside_a_cubic_segment() {
    assert_replay_matches(TimeWindow {
        start_time: 5.5,
        duration: 3.0,
    });
}

#[test]
fn window_straddling_several_segments() {
    assert_replay_matches(TimeWindow {
        start_time: 2.0,
        duration: 10.5,
    });
}

#[test]
fn window_covering_everything_and_beyond() {
    assert_replay_matches(TimeWindow {
        start_time: -3.0,
        duration: 25.0,
    });
}

#[test]
fn window_ending_at_a_jump_keeps_the_jump() {
    let cut = trajectory_segments_in_time_window(
        &points(),
        TimeWindow {
            start_time: 8.0,
            duration: 2.0,
        },
    )
    .unwrap();
    let times: Vec<f64> = cut.iter().map(|p| p.time).collect();
    assert_eq!(times, vec![8.0, 10.0, 10.0]);
    assert_eq!(cut[2].position, v(6.0, 3.0, 8.0));
    assert_replay_matches(TimeWindow {
        start_time: 8.0,
        duration: 2.0,
    });
}

#[test]
fn window_starting_at_a_jump_starts_after_it() {
    let cut = trajectory_segments_in_time_window(
        &points(),
        TimeWindow {
            start_time: 10.0,
            duration: 2.0,
        },
    )
    .unwrap();
    assert_eq!(cut[0].time, 10.0);
    assert_eq!(cut[0].position, v(6.0, 3.0, 8.0));
    assert_eq!(cut.len(), 2);
    assert_eq!(cut[1].control_points.len(), 1);
}

#[test]
fn fully_contained_segments_are_copied_verbatim() {
    let original = points();
    let cut = trajectory_segments_in_time_window(
        &original,
        TimeWindow {
            start_time: 0.0,
            duration: 14.0,
        },
    )
    .unwrap();
    assert_eq!(cut[0], TrajectoryPoint::linear(0.0, v(0.0, 0.0, 0.0)));
    assert_eq!(&cut[1..], &original[1..]);
}

#[test]
fn window_outside_the_trajectory_is_a_single_point() {
    let cut = trajectory_segments_in_time_window(
        &points(),
        TimeWindow {
            start_time: 20.0,
            duration: 5.0,
        },
    )
    .unwrap();
    assert_eq!(cut, vec![TrajectoryPoint::linear(20.0, v(2.0, 3.0, 6.0))]);

    let empty = trajectory_segments_in_time_window(
        &points(),
        TimeWindow {
            start_time: 3.0,
            duration: 0.0,
        },
    )
    .unwrap();
    assert_eq!(empty.len(), 1);
    assert!(empty[0].position.abs_diff_eq(v(0.0, 0.0, 6.0), EPS));
}
