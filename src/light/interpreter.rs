use crate::foundation::error::{BytecodeError, ShowResult};
use crate::light::bytecode::{BytecodeReader, Command};

/// One materialized interval of a light program.
///
/// Times are in milliseconds and colors in 0-255 channels. The interval is closed:
/// at `timestamp` the color is `start_color`, at `end_time` it is `end_color`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutorState {
    /// Start of the interval.
    pub timestamp: u64,
    /// Length of the interval; never zero.
    pub duration: u64,
    /// End of the interval.
    pub end_time: u64,
    /// Color at the start.
    pub start_color: [u8; 3],
    /// Color at the end; equal to `start_color` unless this is a fade.
    pub end_color: [u8; 3],
    /// Whether the color changes linearly over the interval.
    pub is_fade: bool,
}

#[derive(Clone, Copy, Debug)]
struct LoopFrame {
    body: usize,
    /// Iterations left including the current one; `None` loops forever.
    remaining: Option<u8>,
    iteration_started_at: u64,
}

/// Pull-based executor for light program bytecode.
///
/// Each call to [`LightProgramInterpreter::next_slice`] runs commands until one of them
/// occupies time, and returns that interval. Zero-length commands only update the
/// current color. Errors surface on the call that reaches the offending command.
#[derive(Clone, Debug)]
pub struct LightProgramInterpreter {
    bytecode: Vec<u8>,
    pc: usize,
    now: u64,
    color: [u8; 3],
    loops: Vec<LoopFrame>,
    finished: bool,
}

impl LightProgramInterpreter {
    /// Wrap `bytecode`; nothing is decoded until the first slice is requested.
    pub fn new(bytecode: impl Into<Vec<u8>>) -> Self {
        Self {
            bytecode: bytecode.into(),
            pc: 0,
            now: 0,
            color: [0, 0, 0],
            loops: Vec::new(),
            finished: false,
        }
    }

    /// Restart execution from the first command.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.now = 0;
        self.color = [0, 0, 0];
        self.loops.clear();
        self.finished = false;
    }

    /// Whether the program has run to completion.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Execute until the next slice with nonzero duration, or `None` at the end.
    pub fn next_slice(&mut self) -> ShowResult<Option<ExecutorState>> {
        while !self.finished {
            let mut reader = BytecodeReader::new(&self.bytecode, self.pc);
            if reader.at_end() {
                self.finished = true;
                break;
            }
            let offset = reader.position();
            let command = reader.command()?;
            self.pc = reader.position();

            match command {
                Command::End => self.finished = true,
                Command::Nop | Command::Pyro => {}
                Command::Sleep { duration } => {
                    if let Some(slice) = self.hold(duration) {
                        return Ok(Some(slice));
                    }
                }
                Command::WaitUntil { timestamp } => {
                    if let Some(slice) = self.hold(timestamp.saturating_sub(self.now)) {
                        return Ok(Some(slice));
                    }
                }
                Command::Set { color, duration } => {
                    self.color = color;
                    if let Some(slice) = self.hold(duration) {
                        return Ok(Some(slice));
                    }
                }
                Command::Fade { color, duration } => {
                    let from = std::mem::replace(&mut self.color, color);
                    if duration > 0 {
                        return Ok(Some(self.advance(from, color, duration, true)));
                    }
                }
                Command::LoopBegin { count } => self.loops.push(LoopFrame {
                    body: self.pc,
                    remaining: (count > 0).then_some(count),
                    iteration_started_at: self.now,
                }),
                Command::LoopEnd => self.end_iteration(offset)?,
            }
        }
        Ok(None)
    }

    fn end_iteration(&mut self, offset: usize) -> Result<(), BytecodeError> {
        let now = self.now;
        let frame = self
            .loops
            .last_mut()
            .ok_or(BytecodeError::EmptyLoopStack { offset })?;
        let (remaining, idle) = (frame.remaining, frame.iteration_started_at == now);
        match remaining {
            // An endless loop whose body takes no time would never yield again.
            None if idle => self.finished = true,
            None => {
                frame.iteration_started_at = now;
                self.pc = frame.body;
            }
            Some(n) if n > 1 => {
                frame.remaining = Some(n - 1);
                frame.iteration_started_at = now;
                self.pc = frame.body;
            }
            Some(_) => {
                self.loops.pop();
            }
        }
        Ok(())
    }

    fn hold(&mut self, duration: u64) -> Option<ExecutorState> {
        if duration == 0 {
            return None;
        }
        let color = self.color;
        Some(self.advance(color, color, duration, false))
    }

    fn advance(
        &mut self,
        from: [u8; 3],
        to: [u8; 3],
        duration: u64,
        is_fade: bool,
    ) -> ExecutorState {
        let timestamp = self.now;
        self.now = timestamp.saturating_add(duration);
        ExecutorState {
            timestamp,
            duration,
            end_time: self.now,
            start_color: from,
            end_color: to,
            is_fade,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/light/interpreter.rs"]
mod tests;
