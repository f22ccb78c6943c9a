use crate::foundation::core::Vec3;
use crate::foundation::error::{ShowError, ShowResult};
use crate::player::bezier;
use crate::player::segments::{Segment, SegmentStrategy, SegmentedPlayer};
use crate::schema::model::{ControlPoints, Trajectory, TrajectoryPoint};

/// Evaluator for one range of a trajectory.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TrajectorySegment {
    Constant(Vec3),
    Linear {
        from: Vec3,
        to: Vec3,
        velocity: Vec3,
    },
    Quadratic {
        p0: Vec3,
        c: Vec3,
        p1: Vec3,
        duration: f64,
    },
    Cubic {
        p0: Vec3,
        c1: Vec3,
        c2: Vec3,
        p1: Vec3,
        duration: f64,
    },
    /// More control points than any supported curve; reported when reached.
    Unsupported { control_points: usize, start: f64 },
}

impl TrajectorySegment {
    fn position(&self, r: f64) -> ShowResult<Vec3> {
        Ok(match *self {
            Self::Constant(p) => p,
            Self::Linear { from, to, .. } => from.lerp(to, r),
            Self::Quadratic { p0, c, p1, .. } => bezier::quadratic_point(p0, c, p1, r),
            Self::Cubic { p0, c1, c2, p1, .. } => bezier::cubic_point(p0, c1, c2, p1, r),
            Self::Unsupported {
                control_points,
                start,
            } => return Err(unsupported_segment(control_points, start)),
        })
    }

    fn velocity(&self, r: f64) -> ShowResult<Vec3> {
        let per_second = |derivative: Vec3, duration: f64| {
            if duration > 0.0 {
                derivative / duration
            } else {
                Vec3::ZERO
            }
        };
        Ok(match *self {
            Self::Constant(_) => Vec3::ZERO,
            Self::Linear { velocity, .. } => velocity,
            Self::Quadratic { p0, c, p1, duration } => {
                per_second(bezier::quadratic_derivative(p0, c, p1, r), duration)
            }
            Self::Cubic {
                p0,
                c1,
                c2,
                p1,
                duration,
            } => per_second(bezier::cubic_derivative(p0, c1, c2, p1, r), duration),
            Self::Unsupported {
                control_points,
                start,
            } => return Err(unsupported_segment(control_points, start)),
        })
    }
}

fn unsupported_segment(control_points: usize, start: f64) -> ShowError {
    ShowError::unsupported_segment(format!(
        "segment starting at {start}s has {control_points} control points; at most 2 are supported"
    ))
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TrajectoryStrategy;

impl SegmentStrategy for TrajectoryStrategy {
    type Setpoint = Vec3;
    type Metadata = ControlPoints;
    type Evaluator = TrajectorySegment;

    fn constant_evaluator(&self, setpoint: &Vec3) -> TrajectorySegment {
        TrajectorySegment::Constant(*setpoint)
    }

    fn segment_evaluator(
        &self,
        from: &Segment<Vec3, ControlPoints>,
        to: &Segment<Vec3, ControlPoints>,
        duration: f64,
    ) -> TrajectorySegment {
        let (p0, p1) = (from.setpoint, to.setpoint);
        match to.meta.as_slice() {
            [] => TrajectorySegment::Linear {
                from: p0,
                to: p1,
                velocity: if duration > 0.0 {
                    (p1 - p0) / duration
                } else {
                    Vec3::ZERO
                },
            },
            &[c] => TrajectorySegment::Quadratic {
                p0,
                c,
                p1,
                duration,
            },
            &[c1, c2] => TrajectorySegment::Cubic {
                p0,
                c1,
                c2,
                p1,
                duration,
            },
            cps => TrajectorySegment::Unsupported {
                control_points: cps.len(),
                start: from.start,
            },
        }
    }
}

/// Time-indexed position and velocity evaluator for one trajectory.
///
/// Segment `i -> i + 1` is a straight line when point `i + 1` has no control points,
/// a quadratic Bezier curve with one and a cubic one with two. A segment of zero
/// duration is an instantaneous jump; queries at the jump time see the value after
/// the jump.
///
/// Outputs are written into caller-owned vectors so that per-frame evaluation does
/// not allocate.
pub struct TrajectoryPlayer {
    inner: SegmentedPlayer<TrajectoryStrategy>,
    landing_time: Option<f64>,
}

/// Build a player for `trajectory`, with all point times shifted by its takeoff time.
pub fn create_trajectory_player(trajectory: &Trajectory) -> TrajectoryPlayer {
    TrajectoryPlayer::new(trajectory)
}

impl TrajectoryPlayer {
    /// Build a player for `trajectory`, with all point times shifted by its takeoff time.
    pub fn new(trajectory: &Trajectory) -> Self {
        let mut player = Self::from_points(&trajectory.points, trajectory.takeoff_offset());
        player.landing_time = trajectory.landing_time;
        player
    }

    /// Build a player from raw points, shifting every time by `time_offset`.
    pub fn from_points(points: &[TrajectoryPoint], time_offset: f64) -> Self {
        let segments = points
            .iter()
            .map(|p| Segment::new(p.time + time_offset, p.position, p.control_points.clone()))
            .collect();
        Self {
            inner: SegmentedPlayer::new(segments, TrajectoryStrategy),
            landing_time: None,
        }
    }

    /// Landing time declared by the trajectory, if any.
    pub fn landing_time(&self) -> Option<f64> {
        self.landing_time
    }

    /// Time of the first point (after the takeoff shift).
    pub fn start_time(&self) -> f64 {
        self.inner.start_times().first().copied().unwrap_or(0.0)
    }

    /// Time of the last point (after the takeoff shift).
    pub fn end_time(&self) -> f64 {
        self.inner.start_times().last().copied().unwrap_or(0.0)
    }

    /// Write the position at `time` into `out` and return it.
    ///
    /// Fails only when the segment containing `time` has more than two control points.
    pub fn position_at<'a>(&mut self, time: f64, out: &'a mut Vec3) -> ShowResult<&'a mut Vec3> {
        let (segment, ratio) = self.inner.evaluator_at(time);
        *out = segment.position(ratio)?;
        Ok(out)
    }

    /// Write the velocity at `time` into `out` and return it.
    ///
    /// At a segment boundary the segment starting at `time` is used.
    pub fn velocity_from_right_at<'a>(
        &mut self,
        time: f64,
        out: &'a mut Vec3,
    ) -> ShowResult<&'a mut Vec3> {
        let (segment, ratio) = self.inner.evaluator_at(time);
        *out = segment.velocity(ratio)?;
        Ok(out)
    }

    /// Alias of [`TrajectoryPlayer::velocity_from_right_at`].
    pub fn velocity_at<'a>(&mut self, time: f64, out: &'a mut Vec3) -> ShowResult<&'a mut Vec3> {
        self.velocity_from_right_at(time, out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/trajectory.rs"]
mod tests;
