use crate::foundation::core::Vec3;
use crate::foundation::error::ShowResult;
use crate::player::bezier::split_bezier_curve;
use crate::player::trajectory::TrajectoryPlayer;
use crate::schema::model::TrajectoryPoint;

/// A time interval `[start_time, start_time + duration]` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Start of the window.
    pub start_time: f64,
    /// Length of the window; negative values count as zero.
    pub duration: f64,
}

impl TimeWindow {
    /// End of the window.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration.max(0.0)
    }
}

/// Extract the part of a trajectory that falls into `window`.
///
/// The result starts with a point at the window start holding the position there, and
/// contains one point per (partial) segment overlapping the window. Segments that
/// straddle a window boundary are cut with de Casteljau subdivision, so a player built
/// from the result reproduces the original positions and velocities over the window.
/// Jumps inside the window (or exactly at its end) are kept, and a window opening before
/// the first point holds that point until the trajectory starts.
///
/// Times are taken as-is; no takeoff offset is applied.
pub fn trajectory_segments_in_time_window(
    points: &[TrajectoryPoint],
    window: TimeWindow,
) -> ShowResult<Vec<TrajectoryPoint>> {
    let start = window.start_time;
    let end = window.end_time();

    let mut player = TrajectoryPlayer::from_points(points, 0.0);
    let mut pos = Vec3::ZERO;
    player.position_at(start, &mut pos)?;
    let mut out = vec![TrajectoryPoint::linear(start, pos)];

    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (ta, tb) = (a.time, b.time);

        if tb - ta <= 0.0 {
            if start < tb && tb <= end {
                out.push(TrajectoryPoint::linear(tb, b.position));
            }
            continue;
        }

        let (s, e) = (ta.max(start), tb.min(end));
        if e <= s {
            continue;
        }

        // Hold the first position until the trajectory starts inside the window.
        if out.last().is_some_and(|p| p.time < s) {
            out.push(TrajectoryPoint::linear(s, a.position));
        }

        if b.control_points.is_empty() {
            let mut pos = b.position;
            if e < tb {
                player.position_at(e, &mut pos)?;
            }
            out.push(TrajectoryPoint::linear(e, pos));
            continue;
        }

        let mut curve: Vec<Vec3> = std::iter::once(a.position)
            .chain(b.control_points.iter().copied())
            .chain(std::iter::once(b.position))
            .collect();
        if s > ta {
            curve = split_bezier_curve(&curve, (s - ta) / (tb - ta)).1;
        }
        if e < tb {
            curve = split_bezier_curve(&curve, (e - s) / (tb - s)).0;
        }
        let last = curve.len() - 1;
        out.push(TrajectoryPoint::curved(e, curve[last], &curve[1..last]));
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/player/window.rs"]
mod tests;
