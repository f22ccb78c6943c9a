//! Structural validation of raw show trees.
//!
//! Every entry point checks the raw JSON tree first, reporting the first problem
//! with a `$.path[index].field` location, and then converts it into the typed model.
//! Defaults are filled in during the conversion, so the input is never modified.

use std::fmt;

use base64::Engine as _;
use serde_json::{Map, Value};

use crate::foundation::error::{ShowError, ShowResult};
use crate::schema::model::{
    CameraType, EnvironmentType, FORMAT_VERSION, LightProgram, MAX_DRONE_COUNT,
    ShowSpecification, Trajectory, YawControl,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone, Default)]
struct SchemaPath(Vec<PathElem>);

impl SchemaPath {
    fn field(&self, name: &'static str) -> Self {
        let mut out = self.clone();
        out.0.push(PathElem::Field(name));
        out
    }

    fn index(&self, i: usize) -> Self {
        let mut out = self.clone();
        out.0.push(PathElem::Index(i));
        out
    }

    fn error(&self, message: impl fmt::Display) -> ShowError {
        ShowError::schema(format!("{self}: {message}"))
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for elem in &self.0 {
            match elem {
                PathElem::Field(name) => write!(f, ".{name}")?,
                PathElem::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// Validate a raw show specification tree and return the typed, default-filled model.
///
/// Checks the format version, the swarm (non-empty, at most [`MAX_DRONE_COUNT`]
/// drones, each with a valid trajectory and optional yaw control / light program)
/// and the environment (type and cameras).
#[tracing::instrument(skip(raw))]
pub fn validate_show_specification(raw: &Value) -> ShowResult<ShowSpecification> {
    let root = SchemaPath::default();
    let obj = expect_object(raw, &root)?;
    check_version(obj, &root)?;

    let swarm_path = root.field("swarm");
    let swarm = expect_object(required(obj, "swarm", &root)?, &swarm_path)?;
    let drones_path = swarm_path.field("drones");
    let drones = expect_array(required(swarm, "drones", &swarm_path)?, &drones_path)?;
    if drones.is_empty() {
        return Err(drones_path.error("must be a non-empty array"));
    }
    if drones.len() > MAX_DRONE_COUNT {
        return Err(drones_path.error(format!(
            "has {} drones; at most {MAX_DRONE_COUNT} are supported",
            drones.len()
        )));
    }
    for (i, drone) in drones.iter().enumerate() {
        check_drone(drone, &drones_path.index(i))?;
    }

    if let Some(env) = obj.get("environment") {
        check_environment(env, &root.field("environment"))?;
    }

    let spec: ShowSpecification = decode(raw, &root)?;
    tracing::debug!(drones = spec.drone_count(), "show specification validated");
    Ok(spec)
}

/// Validate a raw trajectory object.
pub fn validate_trajectory(raw: &Value) -> ShowResult<Trajectory> {
    let root = SchemaPath::default();
    check_trajectory(raw, &root)?;
    decode(raw, &root)
}

/// Validate a raw yaw control object.
pub fn validate_yaw_control(raw: &Value) -> ShowResult<YawControl> {
    let root = SchemaPath::default();
    check_yaw_control(raw, &root)?;
    decode(raw, &root)
}

/// Validate a raw light program (versioned object, base64 text or byte array).
pub fn validate_light_program(raw: &Value) -> ShowResult<LightProgram> {
    let root = SchemaPath::default();
    check_light_program(raw, &root)?;
    decode(raw, &root)
}

fn check_drone(drone: &Value, path: &SchemaPath) -> ShowResult<()> {
    let obj = expect_object(drone, path)?;
    let settings_path = path.field("settings");
    let settings = expect_object(required(obj, "settings", path)?, &settings_path)?;

    let trajectory = required(settings, "trajectory", &settings_path)?;
    check_trajectory(trajectory, &settings_path.field("trajectory"))?;

    if let Some(yaw) = optional(settings, "yawControl") {
        check_yaw_control(yaw, &settings_path.field("yawControl"))?;
    }
    if let Some(lights) = optional(settings, "lightProgram") {
        check_light_program(lights, &settings_path.field("lightProgram"))?;
    }
    if let Some(home) = optional(settings, "home") {
        check_vector(home, 3, &settings_path.field("home"))?;
    }
    Ok(())
}

fn check_trajectory(raw: &Value, path: &SchemaPath) -> ShowResult<()> {
    let obj = expect_object(raw, path)?;
    check_version(obj, path)?;

    for key in ["takeoffTime", "landingTime"] {
        if let Some(v) = optional(obj, key) {
            expect_finite(v, &path.field(key))?;
        }
    }

    let points_path = path.field("points");
    let points = expect_array(required(obj, "points", path)?, &points_path)?;
    if points.is_empty() {
        return Err(points_path.error("must be a non-empty array"));
    }
    for (i, point) in points.iter().enumerate() {
        let point_path = points_path.index(i);
        let items = expect_array(point, &point_path)?;
        if !(2..=3).contains(&items.len()) {
            return Err(point_path.error("must be [time, [x, y, z], controlPoints?]"));
        }
        expect_finite(&items[0], &point_path.index(0))?;
        check_vector(&items[1], 3, &point_path.index(1))?;
        // The number of control points is checked lazily by the trajectory player.
        if let Some(cps) = items.get(2).filter(|v| !v.is_null()) {
            let cps_path = point_path.index(2);
            for (j, cp) in expect_array(cps, &cps_path)?.iter().enumerate() {
                check_vector(cp, 3, &cps_path.index(j))?;
            }
        }
    }
    Ok(())
}

fn check_yaw_control(raw: &Value, path: &SchemaPath) -> ShowResult<()> {
    let obj = expect_object(raw, path)?;
    check_version(obj, path)?;

    let setpoints_path = path.field("setpoints");
    let setpoints = expect_array(required(obj, "setpoints", path)?, &setpoints_path)?;
    for (i, setpoint) in setpoints.iter().enumerate() {
        check_vector(setpoint, 2, &setpoints_path.index(i))?;
    }

    if let Some(v) = optional(obj, "autoYaw")
        && !v.is_boolean()
    {
        return Err(path.field("autoYaw").error("must be a boolean"));
    }
    if let Some(v) = optional(obj, "autoYawOffset") {
        expect_finite(v, &path.field("autoYawOffset"))?;
    }
    Ok(())
}

fn check_light_program(raw: &Value, path: &SchemaPath) -> ShowResult<()> {
    match raw {
        Value::String(text) => base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map(|_| ())
            .map_err(|e| path.error(format!("invalid base64 payload: {e}"))),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if item.as_u64().is_none_or(|b| b > 255) {
                    return Err(path.index(i).error("must be a byte (0-255)"));
                }
            }
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("$asset") => match obj.get("$asset") {
            Some(Value::String(_)) => Ok(()),
            _ => Err(path.field("$asset").error("must be a string")),
        },
        Value::Object(obj) => {
            check_version(obj, path)?;
            check_light_program(required(obj, "data", path)?, &path.field("data"))
        }
        _ => Err(path.error("must be an object, a base64 string or a byte array")),
    }
}

fn check_environment(raw: &Value, path: &SchemaPath) -> ShowResult<()> {
    let obj = expect_object(raw, path)?;

    if let Some(kind) = obj.get("type") {
        check_enum(kind, &EnvironmentType::NAMES, &path.field("type"))?;
    }
    if let Some(location) = optional(obj, "location")
        && !location.is_object()
    {
        return Err(path.field("location").error("must be an object"));
    }

    if let Some(cameras) = obj.get("cameras") {
        let cameras_path = path.field("cameras");
        for (i, camera) in expect_array(cameras, &cameras_path)?.iter().enumerate() {
            check_camera(camera, &cameras_path.index(i))?;
        }
    }
    Ok(())
}

fn check_camera(raw: &Value, path: &SchemaPath) -> ShowResult<()> {
    let obj = expect_object(raw, path)?;
    if let Some(kind) = obj.get("type") {
        check_enum(kind, &CameraType::NAMES, &path.field("type"))?;
    }
    if let Some(name) = optional(obj, "name")
        && !name.is_string()
    {
        return Err(path.field("name").error("must be a string"));
    }
    if let Some(position) = obj.get("position") {
        check_vector(position, 3, &path.field("position"))?;
    }
    if let Some(orientation) = obj.get("orientation") {
        check_vector(orientation, 4, &path.field("orientation"))?;
    }
    if let Some(focal) = optional(obj, "focalLength") {
        expect_finite(focal, &path.field("focalLength"))?;
    }
    if let Some(default) = optional(obj, "default")
        && !default.is_boolean()
    {
        return Err(path.field("default").error("must be a boolean"));
    }
    Ok(())
}

fn check_version(obj: &Map<String, Value>, path: &SchemaPath) -> ShowResult<()> {
    match obj.get("version").and_then(Value::as_f64) {
        Some(v) if v == f64::from(FORMAT_VERSION) => Ok(()),
        Some(v) => Err(path
            .field("version")
            .error(format!("unsupported version {v}; expected {FORMAT_VERSION}"))),
        None => Err(path
            .field("version")
            .error(format!("must be the number {FORMAT_VERSION}"))),
    }
}

fn check_enum(raw: &Value, allowed: &[&str], path: &SchemaPath) -> ShowResult<()> {
    match raw.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(path.error(format!("must be one of {allowed:?}"))),
    }
}

fn check_vector(raw: &Value, len: usize, path: &SchemaPath) -> ShowResult<()> {
    let items = expect_array(raw, path)?;
    if items.len() != len {
        return Err(path.error(format!("must have exactly {len} components")));
    }
    for (i, item) in items.iter().enumerate() {
        expect_finite(item, &path.index(i))?;
    }
    Ok(())
}

fn expect_finite(raw: &Value, path: &SchemaPath) -> ShowResult<f64> {
    raw.as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| path.error("must be a finite number"))
}

fn expect_object<'a>(raw: &'a Value, path: &SchemaPath) -> ShowResult<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| path.error("must be an object"))
}

fn expect_array<'a>(raw: &'a Value, path: &SchemaPath) -> ShowResult<&'a Vec<Value>> {
    raw.as_array().ok_or_else(|| path.error("must be an array"))
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
    path: &SchemaPath,
) -> ShowResult<&'a Value> {
    obj.get(key)
        .ok_or_else(|| path.field(key).error("is required"))
}

fn optional<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn decode<T: serde::de::DeserializeOwned>(raw: &Value, path: &SchemaPath) -> ShowResult<T> {
    T::deserialize(raw).map_err(|e| path.error(e))
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
