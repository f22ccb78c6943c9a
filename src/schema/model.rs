use std::collections::BTreeMap;

use base64::Engine as _;
use smallvec::SmallVec;

use crate::foundation::core::Vec3;
use crate::foundation::error::{ShowError, ShowResult};

/// Largest drone swarm a show specification may describe.
pub const MAX_DRONE_COUNT: usize = 5000;

/// Only supported value of every `version` field.
pub const FORMAT_VERSION: u32 = 1;

/// Reads a `version` number, accepting integral floats such as `1.0`.
fn deserialize_version<'de, D: serde::Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    use serde::de::Error as _;

    let raw = <f64 as serde::Deserialize>::deserialize(de)?;
    if raw.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&raw) {
        Ok(raw as u32)
    } else {
        Err(D::Error::custom(format!("version must be a whole number, got {raw}")))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A fully validated show specification.
///
/// Produced once per loaded file by [`crate::validate_show_specification`] (or the
/// archive loader) and read-only afterwards. Every defaultable field has been filled
/// in during validation.
pub struct ShowSpecification {
    /// Format version; always [`FORMAT_VERSION`].
    #[serde(deserialize_with = "deserialize_version")]
    pub version: u32,
    /// Environment the show is performed in.
    #[serde(default)]
    pub environment: Environment,
    /// Media attached to the show (audio tracks and similar), kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<serde_json::Value>,
    /// Free-form metadata (title, author, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    /// Show-level settings, kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
    /// The drones taking part in the show.
    pub swarm: Swarm,
}

impl ShowSpecification {
    /// Number of drones in the swarm.
    pub fn drone_count(&self) -> usize {
        self.swarm.drones.len()
    }

    /// Time in seconds when the last trajectory ends.
    pub fn duration(&self) -> f64 {
        self.swarm
            .drones
            .iter()
            .map(|d| d.settings.trajectory.end_time())
            .fold(0.0, f64::max)
    }

    /// Camera flagged as default, or the first camera when none is flagged.
    pub fn default_camera(&self) -> Option<&Camera> {
        let cameras = &self.environment.cameras;
        cameras
            .iter()
            .find(|c| c.default == Some(true))
            .or_else(|| cameras.first())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Container of the drones in a show.
pub struct Swarm {
    /// Per-drone specifications, in show order.
    pub drones: Vec<DroneSpecification>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One drone of the swarm.
pub struct DroneSpecification {
    /// Drone type identifier (for example `"generic"`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Per-drone settings holding the time-indexed programs.
    pub settings: DroneSettings,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Settings of a single drone.
pub struct DroneSettings {
    /// Display name of the drone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Home (takeoff) position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Vec3>,
    /// Position program.
    pub trajectory: Trajectory,
    /// Light program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_program: Option<LightProgram>,
    /// Heading program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw_control: Option<YawControl>,
    /// Keys not interpreted by this crate, preserved as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Environment of the show and the cameras looking at it.
pub struct Environment {
    /// Indoor or outdoor.
    #[serde(rename = "type", default)]
    pub kind: EnvironmentType,
    /// Predefined viewpoints.
    #[serde(default)]
    pub cameras: Vec<Camera>,
    /// Geographic location, kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            kind: EnvironmentType::Outdoor,
            cameras: Vec::new(),
            location: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Recognized environment types.
pub enum EnvironmentType {
    /// Outdoor show (default).
    #[default]
    Outdoor,
    /// Indoor show.
    Indoor,
}

impl EnvironmentType {
    /// Wire names accepted for `environment.type`.
    pub const NAMES: [&'static str; 2] = ["outdoor", "indoor"];
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A predefined camera.
pub struct Camera {
    /// Projection type.
    #[serde(rename = "type", default)]
    pub kind: CameraType,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Camera position.
    #[serde(default = "default_camera_position")]
    pub position: Vec3,
    /// Orientation quaternion in `[w, x, y, z]` order.
    #[serde(default = "default_camera_orientation")]
    pub orientation: [f64; 4],
    /// Focal length, if specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    /// Whether this is the default viewpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

fn default_camera_position() -> Vec3 {
    Vec3::ZERO
}

fn default_camera_orientation() -> [f64; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Recognized camera projection types.
pub enum CameraType {
    /// Perspective projection (default).
    #[default]
    Perspective,
}

impl CameraType {
    /// Wire names accepted for `camera.type`.
    pub const NAMES: [&'static str; 1] = ["perspective"];
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Piecewise Bezier position program of one drone.
pub struct Trajectory {
    /// Format version; always [`FORMAT_VERSION`].
    #[serde(deserialize_with = "deserialize_version")]
    pub version: u32,
    /// Offset in seconds added to every point time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeoff_time: Option<f64>,
    /// Time in seconds when the drone lands, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_time: Option<f64>,
    /// Points sorted by strictly increasing time (not enforced).
    pub points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Build a version 1 trajectory from points.
    pub fn new(points: Vec<TrajectoryPoint>) -> Self {
        Self {
            version: FORMAT_VERSION,
            takeoff_time: None,
            landing_time: None,
            points,
        }
    }

    /// Takeoff offset in seconds, defaulting to zero.
    pub fn takeoff_offset(&self) -> f64 {
        self.takeoff_time.unwrap_or(0.0)
    }

    /// Time of the first point, shifted by the takeoff offset.
    pub fn start_time(&self) -> f64 {
        self.points
            .first()
            .map_or(0.0, |p| p.time + self.takeoff_offset())
    }

    /// Time of the last point, shifted by the takeoff offset.
    pub fn end_time(&self) -> f64 {
        self.points
            .last()
            .map_or(0.0, |p| p.time + self.takeoff_offset())
    }

    /// Length of the trajectory in seconds.
    pub fn duration(&self) -> f64 {
        (self.end_time() - self.start_time()).max(0.0)
    }

    /// First point, if any.
    pub fn first_point(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    /// Last point, if any.
    pub fn last_point(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// Axis-aligned box containing every setpoint and control point.
    ///
    /// Bezier curves stay within the convex hull of their control points, so this
    /// is a conservative bound of the whole flight path.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self
            .points
            .iter()
            .flat_map(|p| std::iter::once(p.position).chain(p.control_points.iter().copied()));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Inline storage for the control points of one segment (at most two are playable).
pub type ControlPoints = SmallVec<[Vec3; 2]>;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(try_from = "TrajectoryPointRepr")]
/// One trajectory point: `[time, [x, y, z], controlPoints?]` on the wire.
///
/// The control points shape the segment that *ends* at this point.
pub struct TrajectoryPoint {
    /// Time in seconds (before the takeoff offset is applied).
    pub time: f64,
    /// Setpoint reached at `time`.
    pub position: Vec3,
    /// Bezier control points of the incoming segment; empty for a straight line.
    pub control_points: ControlPoints,
}

impl TrajectoryPoint {
    /// Point reached by a straight segment.
    pub fn linear(time: f64, position: Vec3) -> Self {
        Self {
            time,
            position,
            control_points: SmallVec::new(),
        }
    }

    /// Point reached by a Bezier segment with the given control points.
    pub fn curved(time: f64, position: Vec3, control_points: &[Vec3]) -> Self {
        Self {
            time,
            position,
            control_points: SmallVec::from_slice(control_points),
        }
    }
}

impl serde::Serialize for TrajectoryPoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeTuple as _;

        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.time)?;
        tup.serialize_element(&self.position)?;
        if self.control_points.is_empty() {
            tup.serialize_element(&Option::<()>::None)?;
        } else {
            tup.serialize_element(self.control_points.as_slice())?;
        }
        tup.end()
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum TrajectoryPointRepr {
    Full(f64, [f64; 3], Option<Vec<[f64; 3]>>),
    Bare(f64, [f64; 3]),
}

impl TryFrom<TrajectoryPointRepr> for TrajectoryPoint {
    type Error = String;

    fn try_from(repr: TrajectoryPointRepr) -> Result<Self, Self::Error> {
        let (time, position, control_points) = match repr {
            TrajectoryPointRepr::Full(t, p, cps) => (t, p, cps.unwrap_or_default()),
            TrajectoryPointRepr::Bare(t, p) => (t, p, Vec::new()),
        };
        Ok(Self {
            time,
            position: Vec3::from_array(position),
            control_points: control_points.into_iter().map(Vec3::from_array).collect(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Piecewise linear heading program of one drone.
pub struct YawControl {
    /// Format version; always [`FORMAT_VERSION`].
    #[serde(deserialize_with = "deserialize_version")]
    pub version: u32,
    /// Heading setpoints sorted by time.
    pub setpoints: Vec<YawSetpoint>,
    /// Whether the drone turns towards its direction of travel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_yaw: Option<bool>,
    /// Offset in degrees applied on top of the automatic heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_yaw_offset: Option<f64>,
}

impl YawControl {
    /// Build a version 1 yaw control from setpoints.
    pub fn new(setpoints: Vec<YawSetpoint>) -> Self {
        Self {
            version: FORMAT_VERSION,
            setpoints,
            auto_yaw: None,
            auto_yaw_offset: None,
        }
    }

    /// Time span covered by the setpoints, in seconds.
    pub fn duration(&self) -> f64 {
        match (self.setpoints.first(), self.setpoints.last()) {
            (Some(a), Some(b)) => (b.time - a.time).max(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
/// One heading setpoint: `[time, headingDegrees]` on the wire.
pub struct YawSetpoint {
    /// Time in seconds.
    pub time: f64,
    /// Heading in degrees.
    pub heading_deg: f64,
}

impl From<(f64, f64)> for YawSetpoint {
    fn from((time, heading_deg): (f64, f64)) -> Self {
        Self { time, heading_deg }
    }
}

impl From<YawSetpoint> for (f64, f64) {
    fn from(s: YawSetpoint) -> Self {
        (s.time, s.heading_deg)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Placeholder standing in for a binary archive entry that was not loaded.
pub struct Asset {
    /// Archive path of the entry.
    #[serde(rename = "$asset")]
    pub filename: String,
}

impl Asset {
    /// Tree form of the placeholder, as inserted by the archive loader.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "$asset": self.filename })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "LightProgramRepr")]
/// Light program of one drone.
pub struct LightProgram {
    /// Format version; always [`FORMAT_VERSION`].
    pub version: u32,
    /// Encoded bytecode.
    pub data: LightProgramData,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// Encodings accepted for light program bytecode.
pub enum LightProgramData {
    /// Standard base64 text.
    Base64(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Binary archive entry that was not loaded.
    Asset(Asset),
    /// Another versioned wrapper.
    Nested(Box<LightProgram>),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum LightProgramRepr {
    Wrapped {
        #[serde(deserialize_with = "deserialize_version")]
        version: u32,
        data: LightProgramData,
    },
    Base64(String),
    Bytes(Vec<u8>),
    Asset(Asset),
}

impl From<LightProgramRepr> for LightProgram {
    fn from(repr: LightProgramRepr) -> Self {
        let data = match repr {
            LightProgramRepr::Wrapped { version, data } => return Self { version, data },
            LightProgramRepr::Base64(text) => LightProgramData::Base64(text),
            LightProgramRepr::Bytes(bytes) => LightProgramData::Bytes(bytes),
            LightProgramRepr::Asset(asset) => LightProgramData::Asset(asset),
        };
        Self {
            version: FORMAT_VERSION,
            data,
        }
    }
}

impl LightProgram {
    /// Wrap raw bytecode.
    pub fn from_bytecode(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            version: FORMAT_VERSION,
            data: LightProgramData::Bytes(bytes.into()),
        }
    }

    /// Decode the payload into raw bytecode.
    pub fn bytecode(&self) -> ShowResult<Vec<u8>> {
        match &self.data {
            LightProgramData::Base64(text) => base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|e| ShowError::serde(format!("light program base64: {e}"))),
            LightProgramData::Bytes(bytes) => Ok(bytes.clone()),
            LightProgramData::Asset(asset) => Err(ShowError::schema(format!(
                "light program '{}' was not loaded; enable asset loading",
                asset.filename
            ))),
            LightProgramData::Nested(inner) => inner.bytecode(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/model.rs"]
mod tests;
