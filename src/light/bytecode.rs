use crate::foundation::error::BytecodeError;

/// Length of one bytecode time unit in milliseconds.
pub const TICK_MS: u64 = 20;

/// Opcode bytes of the light program instruction set.
pub mod opcode {
    /// Stop execution.
    pub const END: u8 = 0;
    /// Do nothing.
    pub const NOP: u8 = 1;
    /// Hold the current color for a duration.
    pub const SLEEP: u8 = 2;
    /// Hold the current color until an absolute timestamp.
    pub const WAIT_UNTIL: u8 = 3;
    /// Set an RGB color for a duration.
    pub const SET_COLOR: u8 = 4;
    /// Set a gray level for a duration.
    pub const SET_GRAY: u8 = 5;
    /// Set black for a duration.
    pub const SET_BLACK: u8 = 6;
    /// Set white for a duration.
    pub const SET_WHITE: u8 = 7;
    /// Fade linearly to an RGB color.
    pub const FADE_TO_COLOR: u8 = 8;
    /// Fade linearly to a gray level.
    pub const FADE_TO_GRAY: u8 = 9;
    /// Fade linearly to black.
    pub const FADE_TO_BLACK: u8 = 10;
    /// Fade linearly to white.
    pub const FADE_TO_WHITE: u8 = 11;
    /// Open a loop; the operand is the iteration count, 0 for infinite.
    pub const LOOP_BEGIN: u8 = 12;
    /// Close the innermost loop.
    pub const LOOP_END: u8 = 13;
    /// Trigger one pyro channel.
    pub const SET_PYRO: u8 = 20;
    /// Trigger a set of pyro channels.
    pub const SET_PYRO_ALL: u8 = 21;
}

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];

/// One decoded instruction. Durations and timestamps are in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    End,
    Nop,
    Sleep { duration: u64 },
    WaitUntil { timestamp: u64 },
    Set { color: [u8; 3], duration: u64 },
    Fade { color: [u8; 3], duration: u64 },
    LoopBegin { count: u8 },
    LoopEnd,
    Pyro,
}

/// Cursor over a bytecode buffer.
#[derive(Clone, Debug)]
pub(crate) struct BytecodeReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BytecodeReader<'a> {
    pub(crate) fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn byte(&mut self) -> Result<u8, BytecodeError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or(BytecodeError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    fn rgb(&mut self) -> Result<[u8; 3], BytecodeError> {
        Ok([self.byte()?, self.byte()?, self.byte()?])
    }

    /// LEB128 unsigned integer: seven bits per byte, least significant group first.
    pub(crate) fn varuint(&mut self) -> Result<u64, BytecodeError> {
        let start = self.pos;
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let b = self.byte()?;
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(BytecodeError::VarintOverflow { offset: start })
    }

    fn duration_ms(&mut self) -> Result<u64, BytecodeError> {
        Ok(self.varuint()?.saturating_mul(TICK_MS))
    }

    /// Decode the command at the cursor and move past it.
    pub(crate) fn command(&mut self) -> Result<Command, BytecodeError> {
        let offset = self.pos;
        let code = self.byte()?;
        let cmd = match code {
            opcode::END => Command::End,
            opcode::NOP => Command::Nop,
            opcode::SLEEP => Command::Sleep {
                duration: self.duration_ms()?,
            },
            opcode::WAIT_UNTIL => Command::WaitUntil {
                timestamp: self.duration_ms()?,
            },
            opcode::SET_COLOR => {
                let color = self.rgb()?;
                Command::Set {
                    color,
                    duration: self.duration_ms()?,
                }
            }
            opcode::SET_GRAY => {
                let level = self.byte()?;
                Command::Set {
                    color: [level; 3],
                    duration: self.duration_ms()?,
                }
            }
            opcode::SET_BLACK => Command::Set {
                color: BLACK,
                duration: self.duration_ms()?,
            },
            opcode::SET_WHITE => Command::Set {
                color: WHITE,
                duration: self.duration_ms()?,
            },
            opcode::FADE_TO_COLOR => {
                let color = self.rgb()?;
                Command::Fade {
                    color,
                    duration: self.duration_ms()?,
                }
            }
            opcode::FADE_TO_GRAY => {
                let level = self.byte()?;
                Command::Fade {
                    color: [level; 3],
                    duration: self.duration_ms()?,
                }
            }
            opcode::FADE_TO_BLACK => Command::Fade {
                color: BLACK,
                duration: self.duration_ms()?,
            },
            opcode::FADE_TO_WHITE => Command::Fade {
                color: WHITE,
                duration: self.duration_ms()?,
            },
            opcode::LOOP_BEGIN => Command::LoopBegin {
                count: self.byte()?,
            },
            opcode::LOOP_END => Command::LoopEnd,
            opcode::SET_PYRO | opcode::SET_PYRO_ALL => {
                self.byte()?;
                Command::Pyro
            }
            code => return Err(BytecodeError::UnknownCommand { code, offset }),
        };
        Ok(cmd)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/light/bytecode.rs"]
mod tests;
