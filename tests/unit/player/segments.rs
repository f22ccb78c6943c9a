use super::*;

/// Scalar linear strategy: evaluators are `(from, to)` pairs.
struct Lerp1;

impl SegmentStrategy for Lerp1 {
    type Setpoint = f64;
    type Metadata = ();
    type Evaluator = (f64, f64);

    fn constant_evaluator(&self, setpoint: &f64) -> (f64, f64) {
        (*setpoint, *setpoint)
    }

    fn segment_evaluator(
        &self,
        from: &Segment<f64, ()>,
        to: &Segment<f64, ()>,
        _duration: f64,
    ) -> (f64, f64) {
        (from.setpoint, to.setpoint)
    }
}

fn player(points: &[(f64, f64)]) -> SegmentedPlayer<Lerp1> {
    let segments = points
        .iter()
        .map(|&(t, v)| Segment::new(t, v, ()))
        .collect();
    SegmentedPlayer::new(segments, Lerp1)
}

fn eval(p: &mut SegmentedPlayer<Lerp1>, t: f64) -> f64 {
    let (&(a, b), ratio) = p.evaluator_at(t);
    a + (b - a) * ratio
}

#[test]
fn seek_reports_slot_and_ratio() {
    let mut p = player(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]);
    assert_eq!(p.seek_to(-1.0), (SegmentSlot::BeforeFirst, 0.0));
    assert_eq!(p.seek_to(0.0), (SegmentSlot::Segment(0), 0.0));
    assert_eq!(p.seek_to(2.5), (SegmentSlot::Segment(0), 0.25));
    assert_eq!(p.seek_to(15.0), (SegmentSlot::Segment(1), 0.5));
    assert_eq!(p.seek_to(20.0), (SegmentSlot::AfterLast, 0.0));
    assert_eq!(p.seek_to(1e9), (SegmentSlot::AfterLast, 0.0));
}

#[test]
fn infinities_resolve_to_constant_ends() {
    let mut p = player(&[(1.0, 3.0), (2.0, 5.0), (4.0, -1.0)]);
    assert_eq!(eval(&mut p, f64::NEG_INFINITY), eval(&mut p, 1.0));
    assert_eq!(eval(&mut p, f64::INFINITY), eval(&mut p, 4.0));
    assert_eq!(eval(&mut p, f64::INFINITY), -1.0);
    assert_eq!(eval(&mut p, f64::NEG_INFINITY), 3.0);
}

#[test]
fn single_segment_is_constant_everywhere() {
    let mut p = player(&[(5.0, 7.0)]);
    for t in [f64::NEG_INFINITY, -3.0, 5.0, 6.0, f64::INFINITY] {
        assert_eq!(eval(&mut p, t), 7.0);
    }
}

#[test]
fn empty_player_holds_default() {
    let mut p = player(&[]);
    assert_eq!(p.num_segments(), 0);
    assert_eq!(eval(&mut p, 3.0), 0.0);
    assert_eq!(p.seek_to(3.0).0, SegmentSlot::BeforeFirst);
}

#[test]
fn shuffled_queries_match_sorted_queries() {
    let points: Vec<(f64, f64)> = (0..50)
        .map(|i| (f64::from(i) * 0.7, f64::from((i * 37) % 11)))
        .collect();
    let times: Vec<f64> = (0..400).map(|i| f64::from(i) * 0.1 - 2.0).collect();

    let mut sorted = player(&points);
    let expected: Vec<f64> = times.iter().map(|&t| eval(&mut sorted, t)).collect();

    // Deterministic permutation (multiplicative stride coprime with 400).
    let mut shuffled = player(&points);
    for k in 0..times.len() {
        let idx = (k * 263) % times.len();
        let got = eval(&mut shuffled, times[idx]);
        assert!((got - expected[idx]).abs() <= 1e-5, "t={}", times[idx]);
    }
}

#[test]
fn zero_length_segment_resolves_from_the_right() {
    // Jump from 1 to 5 at t=2.
    let mut p = player(&[(0.0, 0.0), (2.0, 1.0), (2.0, 5.0), (4.0, 5.0)]);
    assert_eq!(p.seek_to(2.0), (SegmentSlot::Segment(2), 0.0));
    assert_eq!(eval(&mut p, 2.0), 5.0);
    assert!((eval(&mut p, 1.999_999) - 0.999_999_5).abs() < 1e-9);

    // Arriving at the jump through the sequential fast path gives the same answer.
    let mut p = player(&[(0.0, 0.0), (2.0, 1.0), (2.0, 5.0), (4.0, 5.0)]);
    eval(&mut p, 1.0);
    assert_eq!(eval(&mut p, 2.0), 5.0);

    // The zero-length evaluator is never selected by a seek but can be built directly.
    let &(a, b) = p.evaluator(SegmentSlot::Segment(1));
    assert_eq!((a, b), (1.0, 5.0));
}

#[test]
fn nan_does_not_advance_the_cursor() {
    let mut p = player(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
    p.seek_to(0.5);
    assert_eq!(p.seek_to(f64::NAN).0, SegmentSlot::BeforeFirst);
}

#[test]
fn evaluators_are_built_lazily_and_memoized() {
    use std::cell::Cell;

    struct Counting<'a>(&'a Cell<usize>);

    impl SegmentStrategy for Counting<'_> {
        type Setpoint = f64;
        type Metadata = ();
        type Evaluator = f64;

        fn constant_evaluator(&self, setpoint: &f64) -> f64 {
            *setpoint
        }

        fn segment_evaluator(&self, from: &Segment<f64, ()>, _: &Segment<f64, ()>, _: f64) -> f64 {
            self.0.set(self.0.get() + 1);
            from.setpoint
        }
    }

    let built = Cell::new(0);
    let segments = (0..10).map(|i| Segment::new(f64::from(i), 0.0, ())).collect();
    let mut p = SegmentedPlayer::new(segments, Counting(&built));
    assert_eq!(built.get(), 0);
    for _ in 0..3 {
        p.evaluator_at(3.5);
        p.evaluator_at(7.5);
    }
    assert_eq!(built.get(), 2);
    assert_eq!(p.start_times().len(), 10);
}
