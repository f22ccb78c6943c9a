//! Time-indexed segment evaluation shared by the trajectory and yaw players.
//!
//! A segmented player is built from segments sorted by start time. Segment `i` spans
//! `[start_i, start_{i+1})` and interpolates from segment `i`'s setpoint towards
//! segment `i + 1`'s. Times before the first start resolve to a constant evaluator at
//! the first setpoint, times at or after the last start to a constant evaluator at the
//! last setpoint.

/// One input segment: a start time, the setpoint reached at that time, and any
/// shape metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment<S, M> {
    /// Start time in seconds.
    pub start: f64,
    /// Setpoint at `start`.
    pub setpoint: S,
    /// Shape metadata (for example Bezier control points).
    pub meta: M,
}

impl<S, M> Segment<S, M> {
    /// Build a segment.
    pub fn new(start: f64, setpoint: S, meta: M) -> Self {
        Self {
            start,
            setpoint,
            meta,
        }
    }
}

/// Builds the evaluators a [`SegmentedPlayer`] hands out.
pub trait SegmentStrategy {
    /// Value type of the setpoints.
    type Setpoint: Default;
    /// Per-segment shape metadata.
    type Metadata;
    /// Evaluator for one time range.
    type Evaluator;

    /// Evaluator that holds `setpoint` forever.
    fn constant_evaluator(&self, setpoint: &Self::Setpoint) -> Self::Evaluator;

    /// Evaluator for the transition from `from` to `to` lasting `duration` seconds.
    ///
    /// `duration` may be zero (or negative for unsorted input).
    fn segment_evaluator(
        &self,
        from: &Segment<Self::Setpoint, Self::Metadata>,
        to: &Segment<Self::Setpoint, Self::Metadata>,
        duration: f64,
    ) -> Self::Evaluator;
}

/// Time range a seek resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentSlot {
    /// Before the first segment start.
    BeforeFirst,
    /// Transition `i -> i + 1`.
    Segment(usize),
    /// At or after the last segment start.
    AfterLast,
}

#[derive(Clone, Copy, Debug)]
struct Cursor {
    slot: SegmentSlot,
    start: f64,
    end: f64,
}

/// Generic segment-indexed evaluation engine.
///
/// Seeking keeps a cursor: a query inside the current range or in the next one is
/// answered in O(1), which covers monotonically advancing playback; anything else
/// falls back to a binary search over the start times. Evaluators are built lazily and
/// kept for the lifetime of the player.
///
/// Seeking mutates the cursor, so one instance serves one playback loop.
pub struct SegmentedPlayer<St: SegmentStrategy> {
    strategy: St,
    segments: Vec<Segment<St::Setpoint, St::Metadata>>,
    start_times: Vec<f64>,
    cache: Vec<Option<St::Evaluator>>,
    before_first: St::Evaluator,
    after_last: St::Evaluator,
    cursor: Cursor,
}

impl<St: SegmentStrategy> SegmentedPlayer<St> {
    /// Build a player from segments pre-sorted by start time.
    ///
    /// Sortedness is a precondition and is not checked. With no segments the player
    /// holds the default setpoint forever.
    pub fn new(segments: Vec<Segment<St::Setpoint, St::Metadata>>, strategy: St) -> Self {
        let (before_first, after_last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (
                strategy.constant_evaluator(&first.setpoint),
                strategy.constant_evaluator(&last.setpoint),
            ),
            _ => {
                let fallback = St::Setpoint::default();
                (
                    strategy.constant_evaluator(&fallback),
                    strategy.constant_evaluator(&fallback),
                )
            }
        };
        let start_times: Vec<f64> = segments.iter().map(|s| s.start).collect();
        let cache = (0..segments.len().saturating_sub(1)).map(|_| None).collect();
        let cursor = Cursor {
            slot: SegmentSlot::BeforeFirst,
            start: f64::NEG_INFINITY,
            end: start_times.first().copied().unwrap_or(f64::INFINITY),
        };

        Self {
            strategy,
            segments,
            start_times,
            cache,
            before_first,
            after_last,
            cursor,
        }
    }

    /// Number of input segments.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Start times of the input segments.
    pub fn start_times(&self) -> &[f64] {
        &self.start_times
    }

    /// The input segments.
    pub fn segments(&self) -> &[Segment<St::Setpoint, St::Metadata>] {
        &self.segments
    }

    /// Move the cursor to the range containing `time` and return the slot together
    /// with the ratio in `[0, 1)` of `time` within that range.
    ///
    /// Constant ranges and ranges of non-positive length always report ratio 0.
    pub fn seek_to(&mut self, time: f64) -> (SegmentSlot, f64) {
        if !(time >= self.cursor.start && time < self.cursor.end) && !self.try_advance(time) {
            self.cursor = self.locate(time);
        }

        let ratio = match self.cursor.slot {
            SegmentSlot::Segment(_) => {
                let duration = self.cursor.end - self.cursor.start;
                if duration > 0.0 {
                    ((time - self.cursor.start) / duration).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            SegmentSlot::BeforeFirst | SegmentSlot::AfterLast => 0.0,
        };
        (self.cursor.slot, ratio)
    }

    /// Seek to `time` and return the evaluator of the resolved range with the ratio.
    pub fn evaluator_at(&mut self, time: f64) -> (&St::Evaluator, f64) {
        let (slot, ratio) = self.seek_to(time);
        (self.evaluator(slot), ratio)
    }

    /// Evaluator of `slot`, building and caching it on first use.
    pub fn evaluator(&mut self, slot: SegmentSlot) -> &St::Evaluator {
        match slot {
            SegmentSlot::BeforeFirst => &self.before_first,
            SegmentSlot::AfterLast => &self.after_last,
            SegmentSlot::Segment(i) => {
                let (strategy, segments) = (&self.strategy, &self.segments);
                self.cache[i].get_or_insert_with(|| {
                    let (from, to) = (&segments[i], &segments[i + 1]);
                    strategy.segment_evaluator(from, to, to.start - from.start)
                })
            }
        }
    }

    /// Fast path: step from the current range into the one right after it.
    fn try_advance(&mut self, time: f64) -> bool {
        let n = self.start_times.len();
        // Negated so that NaN never advances the cursor.
        if n == 0 || !(time >= self.cursor.end) {
            return false;
        }
        let next = match self.cursor.slot {
            SegmentSlot::BeforeFirst => 0,
            SegmentSlot::Segment(i) => i + 1,
            SegmentSlot::AfterLast => return false,
        };
        if next + 1 >= n {
            self.cursor = self.after_last_cursor();
            return true;
        }
        if self.start_times[next + 1] > time {
            self.cursor = Cursor {
                slot: SegmentSlot::Segment(next),
                start: self.start_times[next],
                end: self.start_times[next + 1],
            };
            return true;
        }
        false
    }

    /// Slow path: binary search for the last segment starting at or before `time`.
    fn locate(&self, time: f64) -> Cursor {
        let n = self.start_times.len();
        let idx = self.start_times.partition_point(|&s| s <= time);
        if idx == 0 {
            Cursor {
                slot: SegmentSlot::BeforeFirst,
                start: f64::NEG_INFINITY,
                end: self.start_times.first().copied().unwrap_or(f64::INFINITY),
            }
        } else if idx >= n {
            self.after_last_cursor()
        } else {
            Cursor {
                slot: SegmentSlot::Segment(idx - 1),
                start: self.start_times[idx - 1],
                end: self.start_times[idx],
            }
        }
    }

    fn after_last_cursor(&self) -> Cursor {
        Cursor {
            slot: SegmentSlot::AfterLast,
            start: self.start_times.last().copied().unwrap_or(f64::NEG_INFINITY),
            end: f64::INFINITY,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/segments.rs"]
mod tests;
