//! Loading and playback of compiled drone light shows.
//!
//! A compiled show (`.skyc`) is a ZIP archive holding a JSON or YAML show
//! specification, possibly split across several entries that reference each other,
//! plus binary payloads such as light programs. This crate turns such an archive
//! into a typed [`ShowSpecification`] and evaluates each drone's behaviour over time.
//!
//! # Pipeline overview
//!
//! 1. **Load**: [`load_compiled_show`] (or a stepwise [`ShowLoader`]) resolves every
//!    `{"$ref": "zip:<entry>"}` object against the archive.
//! 2. **Validate**: [`validate_show_specification`] checks the raw tree and converts it
//!    into the typed model, filling in defaults.
//! 3. **Play**: per drone, [`create_trajectory_player`], [`create_yaw_control_player`]
//!    and [`create_light_program_player`] build time-indexed evaluators for position
//!    and velocity, heading and LED color.
//!
//! Players keep a seek cursor and caches and are meant to be driven by one playback
//! loop each; they write into caller-owned outputs so that evaluation per frame does
//! not allocate.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod archive;
mod foundation;
mod light;
mod player;
mod schema;

pub use archive::loader::{
    LoadOptions, LoadProgress, MAX_REF_DEPTH, ROOT_ENTRIES, ShowLoader, load_compiled_show,
    load_compiled_show_from_reader,
};
pub use foundation::core::{Color, Fps, Vec3};
pub use foundation::error::{BytecodeError, ShowError, ShowResult};
pub use light::bytecode::{TICK_MS, opcode};
pub use light::interpreter::{ExecutorState, LightProgramInterpreter};
pub use light::player::{
    DEFAULT_LIGHT_PROGRAM, LightFrames, LightProgramPlayer, SLICE_BUFFER_CAPACITY,
    create_light_program_player,
};
pub use player::bezier::split_bezier_curve;
pub use player::segments::{Segment, SegmentSlot, SegmentStrategy, SegmentedPlayer};
pub use player::trajectory::{TrajectoryPlayer, create_trajectory_player};
pub use player::window::{TimeWindow, trajectory_segments_in_time_window};
pub use player::yaw::{YawControlPlayer, create_yaw_control_player};
pub use schema::model::{
    Asset, Camera, CameraType, ControlPoints, DroneSettings, DroneSpecification, Environment,
    EnvironmentType, FORMAT_VERSION, LightProgram, LightProgramData, MAX_DRONE_COUNT,
    ShowSpecification, Swarm, Trajectory, TrajectoryPoint, YawControl, YawSetpoint,
};
pub use schema::validate::{
    validate_light_program, validate_show_specification, validate_trajectory,
    validate_yaw_control,
};
