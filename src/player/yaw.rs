use crate::foundation::core::Vec3;
use crate::player::segments::{Segment, SegmentStrategy, SegmentedPlayer};
use crate::schema::model::YawControl;

/// Heading in radians and its rate of change over one range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct YawSegment {
    from: f64,
    to: f64,
    rate: f64,
}

impl YawSegment {
    fn heading(&self, r: f64) -> f64 {
        self.from + (self.to - self.from) * r
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct YawStrategy;

impl SegmentStrategy for YawStrategy {
    type Setpoint = f64;
    type Metadata = ();
    type Evaluator = YawSegment;

    fn constant_evaluator(&self, setpoint: &f64) -> YawSegment {
        YawSegment {
            from: *setpoint,
            to: *setpoint,
            rate: 0.0,
        }
    }

    fn segment_evaluator(
        &self,
        from: &Segment<f64, ()>,
        to: &Segment<f64, ()>,
        duration: f64,
    ) -> YawSegment {
        YawSegment {
            from: from.setpoint,
            to: to.setpoint,
            rate: if duration > 0.0 {
                (to.setpoint - from.setpoint) / duration
            } else {
                0.0
            },
        }
    }
}

/// Piecewise-linear heading evaluator.
///
/// Headings are stored in radians and reported in the `z` component of the output
/// vector; `x` and `y` are always zero. Boundary and jump semantics are the same as
/// for [`crate::TrajectoryPlayer`].
pub struct YawControlPlayer {
    inner: SegmentedPlayer<YawStrategy>,
    auto_yaw: bool,
    auto_yaw_offset: f64,
}

/// Build a player for `yaw_control`.
pub fn create_yaw_control_player(yaw_control: &YawControl) -> YawControlPlayer {
    YawControlPlayer::new(yaw_control)
}

impl YawControlPlayer {
    /// Build a player for `yaw_control`, converting its setpoints to radians.
    pub fn new(yaw_control: &YawControl) -> Self {
        let segments = yaw_control
            .setpoints
            .iter()
            .map(|s| Segment::new(s.time, s.heading_deg.to_radians(), ()))
            .collect();
        Self {
            inner: SegmentedPlayer::new(segments, YawStrategy),
            auto_yaw: yaw_control.auto_yaw.unwrap_or(false),
            auto_yaw_offset: yaw_control.auto_yaw_offset.unwrap_or(0.0).to_radians(),
        }
    }

    /// Whether the yaw control asks for heading along the direction of travel.
    pub fn auto_yaw(&self) -> bool {
        self.auto_yaw
    }

    /// Offset applied on top of the automatic heading, in radians.
    pub fn auto_yaw_offset(&self) -> f64 {
        self.auto_yaw_offset
    }

    /// Heading at `time` in radians.
    pub fn heading(&mut self, time: f64) -> f64 {
        let (segment, ratio) = self.inner.evaluator_at(time);
        segment.heading(ratio)
    }

    /// Angular velocity at `time` in radians per second, from the right.
    pub fn angular_velocity(&mut self, time: f64) -> f64 {
        let (segment, _) = self.inner.evaluator_at(time);
        segment.rate
    }

    /// Write `(0, 0, heading)` at `time` into `out` and return it.
    pub fn heading_at<'a>(&mut self, time: f64, out: &'a mut Vec3) -> &'a mut Vec3 {
        *out = Vec3::new(0.0, 0.0, self.heading(time));
        out
    }

    /// Write `(0, 0, angular velocity)` at `time` into `out` and return it.
    pub fn angular_velocity_from_right_at<'a>(
        &mut self,
        time: f64,
        out: &'a mut Vec3,
    ) -> &'a mut Vec3 {
        *out = Vec3::new(0.0, 0.0, self.angular_velocity(time));
        out
    }

    /// Alias of [`YawControlPlayer::angular_velocity_from_right_at`].
    pub fn angular_velocity_at<'a>(&mut self, time: f64, out: &'a mut Vec3) -> &'a mut Vec3 {
        self.angular_velocity_from_right_at(time, out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/yaw.rs"]
mod tests;
