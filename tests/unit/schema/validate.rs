use super::*;
use crate::foundation::core::Vec3;
use serde_json::json;

fn minimal_show() -> Value {
    json!({
        "version": 1,
        "swarm": {
            "drones": [{
                "type": "generic",
                "settings": {
                    "name": "d1",
                    "trajectory": {
                        "version": 1,
                        "points": [[0, [0, 0, 0], []], [10, [0, 0, 10], []]]
                    }
                }
            }]
        }
    })
}

fn schema_message(err: ShowError) -> String {
    match err {
        ShowError::Schema(msg) => msg,
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn minimal_show_gets_defaults_filled() {
    let raw = minimal_show();
    let spec = validate_show_specification(&raw).unwrap();
    assert_eq!(spec.environment.kind, EnvironmentType::Outdoor);
    assert!(spec.environment.cameras.is_empty());
    assert_eq!(spec.drone_count(), 1);
    assert_eq!(spec.duration(), 10.0);
    assert_eq!(spec.swarm.drones[0].settings.name.as_deref(), Some("d1"));
    // Validation is pure: the raw tree is untouched.
    assert_eq!(raw, minimal_show());
}

#[test]
fn cameras_receive_defaults() {
    let mut raw = minimal_show();
    raw["environment"] = json!({"cameras": [{"name": "front"}]});
    let spec = validate_show_specification(&raw).unwrap();
    let cam = &spec.environment.cameras[0];
    assert_eq!(cam.kind, CameraType::Perspective);
    assert_eq!(cam.position, Vec3::ZERO);
    assert_eq!(cam.orientation, [1.0, 0.0, 0.0, 0.0]);
    assert!(raw["environment"]["cameras"][0].get("position").is_none());
}

#[test]
fn wrong_version_is_rejected() {
    let mut raw = minimal_show();
    raw["version"] = json!(2);
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(msg.starts_with("$.version"), "{msg}");
}

#[test]
fn integral_float_versions_are_accepted() {
    let mut raw = minimal_show();
    raw["version"] = json!(1.0);
    raw["swarm"]["drones"][0]["settings"]["trajectory"]["version"] = json!(1.0);
    raw["swarm"]["drones"][0]["settings"]["yawControl"] =
        json!({"version": 1.0, "setpoints": [[0, 10]]});
    raw["swarm"]["drones"][0]["settings"]["lightProgram"] =
        json!({"version": 1.0, "data": "BwoA"});
    let spec = validate_show_specification(&raw).unwrap();
    assert_eq!(spec.version, FORMAT_VERSION);
    let settings = &spec.swarm.drones[0].settings;
    assert_eq!(settings.trajectory.version, FORMAT_VERSION);
    assert_eq!(settings.yaw_control.as_ref().unwrap().version, FORMAT_VERSION);
    assert_eq!(settings.light_program.as_ref().unwrap().version, FORMAT_VERSION);

    let traj = validate_trajectory(&json!({"version": 1.0, "points": [[0, [0, 0, 0]]]})).unwrap();
    assert_eq!(traj.version, FORMAT_VERSION);
    let yaw = validate_yaw_control(&json!({"version": 1.0, "setpoints": [[0, 0]]})).unwrap();
    assert_eq!(yaw.version, FORMAT_VERSION);
    let prog = validate_light_program(&json!({"version": 1.0, "data": "BwoA"})).unwrap();
    assert_eq!(prog.bytecode().unwrap(), vec![7, 10, 0]);

    let mut raw = minimal_show();
    raw["version"] = json!(1.5);
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(msg.starts_with("$.version"), "{msg}");
}

#[test]
fn empty_or_missing_drones_are_rejected() {
    let mut raw = minimal_show();
    raw["swarm"]["drones"] = json!([]);
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(msg.contains("$.swarm.drones"), "{msg}");

    let mut raw = minimal_show();
    raw["swarm"] = json!({});
    assert!(validate_show_specification(&raw).is_err());
}

#[test]
fn oversized_swarm_is_rejected() {
    let mut raw = minimal_show();
    let drone = raw["swarm"]["drones"][0].clone();
    raw["swarm"]["drones"] = Value::Array(vec![drone; MAX_DRONE_COUNT + 1]);
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(msg.contains("at most"), "{msg}");
}

#[test]
fn drone_without_trajectory_reports_path() {
    let mut raw = minimal_show();
    raw["swarm"]["drones"][0]["settings"]
        .as_object_mut()
        .unwrap()
        .remove("trajectory");
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(
        msg.starts_with("$.swarm.drones[0].settings.trajectory"),
        "{msg}"
    );
}

#[test]
fn unknown_environment_type_is_rejected() {
    let mut raw = minimal_show();
    raw["environment"] = json!({"type": "underwater"});
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(msg.contains("$.environment.type"), "{msg}");

    raw["environment"] = json!({"type": "indoor"});
    let spec = validate_show_specification(&raw).unwrap();
    assert_eq!(spec.environment.kind, EnvironmentType::Indoor);
}

#[test]
fn camera_vectors_must_be_finite_and_sized() {
    let mut raw = minimal_show();
    raw["environment"] = json!({"cameras": [{"position": [0, 1]}]});
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(msg.contains("$.environment.cameras[0].position"), "{msg}");

    raw["environment"] = json!({"cameras": [{"orientation": [1, 0, 0, "x"]}]});
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(
        msg.contains("$.environment.cameras[0].orientation[3]"),
        "{msg}"
    );
}

#[test]
fn trajectory_validator_checks_points() {
    assert!(validate_trajectory(&json!({"version": 1, "points": []})).is_err());
    assert!(validate_trajectory(&json!({"version": 1, "points": [[0, [0, 0]]]})).is_err());
    assert!(
        validate_trajectory(&json!({"version": 1, "takeoffTime": "soon", "points": [[0, [0, 0, 0]]]}))
            .is_err()
    );

    let traj = validate_trajectory(&json!({
        "version": 1,
        "takeoffTime": 2.5,
        "points": [[0, [0, 0, 0]], [1, [1, 0, 0], null]]
    }))
    .unwrap();
    assert_eq!(traj.takeoff_time, Some(2.5));
    assert_eq!(traj.points.len(), 2);
}

#[test]
fn trajectory_validator_accepts_too_many_control_points() {
    let traj = validate_trajectory(&json!({
        "version": 1,
        "points": [[0, [0, 0, 0]], [1, [1, 0, 0], [[0, 0, 0], [0, 0, 0], [0, 0, 0]]]]
    }))
    .unwrap();
    assert_eq!(traj.points[1].control_points.len(), 3);
}

#[test]
fn yaw_control_validator() {
    let yaw = validate_yaw_control(&json!({
        "version": 1,
        "setpoints": [[0, 0], [5, 90]],
        "autoYawOffset": 15
    }))
    .unwrap();
    assert_eq!(yaw.setpoints.len(), 2);
    assert_eq!(yaw.auto_yaw_offset, Some(15.0));

    assert!(validate_yaw_control(&json!({"version": 1, "setpoints": [[0]]})).is_err());
    assert!(validate_yaw_control(&json!({"version": 1, "setpoints": [], "autoYaw": 1})).is_err());
    assert!(validate_yaw_control(&json!({"setpoints": []})).is_err());
}

#[test]
fn light_program_validator() {
    let prog = validate_light_program(&json!({"version": 1, "data": "BwoA"})).unwrap();
    assert_eq!(prog.bytecode().unwrap(), vec![7, 10, 0]);

    assert!(validate_light_program(&json!({"version": 1, "data": "@@@"})).is_err());
    assert!(validate_light_program(&json!([1, 2, 300])).is_err());
    assert!(validate_light_program(&json!(42)).is_err());
    assert!(validate_light_program(&json!({"version": 1, "data": {"$asset": "a.bin"}})).is_ok());
}

#[test]
fn drone_sub_programs_are_validated() {
    let mut raw = minimal_show();
    raw["swarm"]["drones"][0]["settings"]["lightProgram"] = json!({"version": 3, "data": ""});
    let msg = schema_message(validate_show_specification(&raw).unwrap_err());
    assert!(
        msg.starts_with("$.swarm.drones[0].settings.lightProgram.version"),
        "{msg}"
    );

    let mut raw = minimal_show();
    raw["swarm"]["drones"][0]["settings"]["yawControl"] =
        json!({"version": 1, "setpoints": [[0, 10]]});
    raw["swarm"]["drones"][0]["settings"]["custom"] = json!({"keep": true});
    let spec = validate_show_specification(&raw).unwrap();
    let settings = &spec.swarm.drones[0].settings;
    assert!(settings.yaw_control.is_some());
    assert_eq!(settings.extra["custom"], json!({"keep": true}));
}
