use crate::foundation::error::{ShowError, ShowResult};

/// Three-component double-precision vector used for positions and velocities.
pub use glam::DVec3 as Vec3;

/// Rational frame rate used when sampling players at fixed intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds); must be > 0.
    pub den: u32,
}

impl Fps {
    /// Build a validated frame rate of `num / den` frames per second.
    pub fn new(num: u32, den: u32) -> ShowResult<Self> {
        if den == 0 {
            return Err(ShowError::schema("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ShowError::schema("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Length of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp of frame `frames` in seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

/// RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Color {
    /// All channels off.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// All channels fully on.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a color from normalized channels.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Equal-channel gray of the given normalized level.
    pub const fn gray(level: f64) -> Self {
        Self::new(level, level, level)
    }

    /// Rescale 0-255 channels to `[0, 1]`.
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: f64::from(rgb[0]) / 255.0,
            g: f64::from(rgb[1]) / 255.0,
            b: f64::from(rgb[2]) / 255.0,
        }
    }

    /// Interpolate from `a` to `b` with factor `t` in `[0, 1]`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
        }
    }

    /// Channels as an array, in RGB order.
    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
