use std::collections::VecDeque;

use crate::foundation::core::{Color, Fps};
use crate::foundation::error::{ShowError, ShowResult};
use crate::light::bytecode::opcode;
use crate::light::interpreter::{ExecutorState, LightProgramInterpreter};
use crate::schema::model::{LightProgram, LightProgramData};

/// Number of slices kept around for evaluation.
pub const SLICE_BUFFER_CAPACITY: usize = 31;

/// Program used when a drone has no light program: white, held.
pub const DEFAULT_LIGHT_PROGRAM: [u8; 2] = [opcode::SET_WHITE, 127];

/// A slice in player units: seconds and `[0, 1]` channels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Slice {
    start: f64,
    end: f64,
    from: Color,
    to: Color,
}

impl From<ExecutorState> for Slice {
    fn from(state: ExecutorState) -> Self {
        Self {
            start: state.timestamp as f64 / 1000.0,
            end: state.end_time as f64 / 1000.0,
            from: Color::from_rgb8(state.start_color),
            to: Color::from_rgb8(state.end_color),
        }
    }
}

impl Slice {
    fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    fn color_at(&self, t: f64) -> Color {
        let duration = self.end - self.start;
        if duration > 0.0 {
            Color::lerp(self.from, self.to, (t - self.start) / duration)
        } else {
            self.to
        }
    }
}

/// Color evaluator for one light program.
///
/// Slices are pulled from a [`LightProgramInterpreter`] on demand and the most recent
/// ones are kept in a bounded buffer. Forward playback never re-executes bytecode;
/// seeking backwards past the buffer replays the program from the start.
pub struct LightProgramPlayer {
    interpreter: LightProgramInterpreter,
    buffer: VecDeque<Slice>,
    evicted: bool,
    exhausted: bool,
}

/// Build a player for `program`; `None` plays [`DEFAULT_LIGHT_PROGRAM`].
///
/// Fails when the payload cannot be decoded or was left in the archive as an asset.
pub fn create_light_program_player(
    program: Option<&LightProgram>,
) -> ShowResult<LightProgramPlayer> {
    let bytecode = match program {
        None => DEFAULT_LIGHT_PROGRAM.to_vec(),
        Some(program) => {
            if let LightProgramData::Asset(asset) = &program.data {
                tracing::warn!(
                    filename = %asset.filename,
                    "light program references an asset that was not loaded"
                );
            }
            program.bytecode()?
        }
    };
    Ok(LightProgramPlayer::new(bytecode))
}

impl LightProgramPlayer {
    /// Build a player executing `bytecode`.
    pub fn new(bytecode: impl Into<Vec<u8>>) -> Self {
        Self {
            interpreter: LightProgramInterpreter::new(bytecode),
            buffer: VecDeque::with_capacity(SLICE_BUFFER_CAPACITY),
            evicted: false,
            exhausted: false,
        }
    }

    /// End of the program in seconds, once the interpreter has reached it.
    pub fn end_time(&self) -> Option<f64> {
        self.exhausted.then(|| self.buffer.back().map_or(0.0, |s| s.end))
    }

    /// Write the color at `seconds` into `out` and return it.
    ///
    /// Negative times (including `-inf`) evaluate at 0; `NaN` and `+inf` are rejected.
    /// At a boundary between two slices the later one wins. Past the end of the
    /// program the last color is held; a program without slices is black.
    pub fn evaluate_color_at<'a>(
        &mut self,
        seconds: f64,
        out: &'a mut Color,
    ) -> ShowResult<&'a mut Color> {
        if seconds.is_nan() || seconds == f64::INFINITY {
            return Err(ShowError::domain(format!(
                "cannot evaluate a light program at {seconds}"
            )));
        }
        let t = seconds.max(0.0);

        if self.evicted && self.buffer.front().is_some_and(|s| t < s.start) {
            tracing::trace!(t, "rewinding light program");
            self.rewind();
        }

        loop {
            let past_newest = self.buffer.back().is_none_or(|s| t >= s.end);
            if !past_newest || self.exhausted {
                break;
            }
            self.pull()?;
        }

        *out = match self.buffer.iter().rev().find(|s| s.contains(t)) {
            Some(slice) => slice.color_at(t),
            None => self.buffer.back().map_or(Color::BLACK, |s| s.to),
        };
        Ok(out)
    }

    /// Colors sampled at `fps` from t = 0.
    ///
    /// The sequence restarts from the beginning on every call. It ends with the first
    /// frame at or past the end of the program, and never ends for looping programs.
    pub fn iterate(&mut self, fps: Fps) -> LightFrames<'_> {
        LightFrames {
            player: self,
            fps,
            frame: 0,
            done: false,
        }
    }

    fn pull(&mut self) -> ShowResult<()> {
        match self.interpreter.next_slice()? {
            Some(state) => {
                if self.buffer.len() == SLICE_BUFFER_CAPACITY {
                    self.buffer.pop_front();
                    self.evicted = true;
                }
                self.buffer.push_back(state.into());
            }
            None => self.exhausted = true,
        }
        Ok(())
    }

    fn rewind(&mut self) {
        self.interpreter.reset();
        self.buffer.clear();
        self.evicted = false;
        self.exhausted = false;
    }
}

/// Iterator returned by [`LightProgramPlayer::iterate`].
pub struct LightFrames<'a> {
    player: &'a mut LightProgramPlayer,
    fps: Fps,
    frame: u64,
    done: bool,
}

impl Iterator for LightFrames<'_> {
    type Item = ShowResult<(f64, Color)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let t = self.fps.frames_to_secs(self.frame);
        self.frame += 1;

        let mut color = Color::BLACK;
        if let Err(e) = self.player.evaluate_color_at(t, &mut color) {
            self.done = true;
            return Some(Err(e));
        }
        if self.player.end_time().is_some_and(|end| t >= end) {
            self.done = true;
        }
        Some(Ok((t, color)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/light/player.rs"]
mod tests;
