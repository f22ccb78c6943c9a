use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde_json::json;
use show_format::{
    Color, DroneSpecification, Fps, LoadOptions, ShowResult, ShowSpecification, Vec3,
    create_light_program_player, create_trajectory_player, create_yaw_control_player,
    load_compiled_show,
};

#[derive(Parser, Debug)]
#[command(name = "skyc", version, about = "Inspect and sample compiled drone shows")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a show.
    Info(InfoArgs),
    /// Print position, velocity, yaw and color of drones at one instant, as JSON lines.
    Sample(SampleArgs),
    /// Print the light program of one drone at a fixed frame rate, as JSON lines.
    Lights(LightsArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input `.skyc` archive.
    file: PathBuf,

    /// Also read binary entries (light programs).
    #[arg(long, default_value_t = false)]
    assets: bool,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input `.skyc` archive.
    file: PathBuf,

    /// Show time in seconds.
    #[arg(long)]
    at: f64,

    /// Only sample this drone (0-based index).
    #[arg(long)]
    drone: Option<usize>,
}

#[derive(Parser, Debug)]
struct LightsArgs {
    /// Input `.skyc` archive.
    file: PathBuf,

    /// Drone index (0-based).
    #[arg(long)]
    drone: usize,

    /// Frames per second.
    #[arg(long, default_value_t = 25)]
    fps: u32,

    /// Stop after this many frames; looping programs never end on their own.
    #[arg(long, default_value_t = 10_000)]
    limit: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Lights(args) => cmd_lights(args),
    }
}

fn load(file: &Path, assets: bool) -> anyhow::Result<ShowSpecification> {
    load_compiled_show(file, LoadOptions { assets })
        .with_context(|| format!("load show '{}'", file.display()))
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let show = load(&args.file, args.assets)?;
    let env = &show.environment;
    let cameras: Vec<&str> = env
        .cameras
        .iter()
        .map(|c| c.name.as_deref().unwrap_or("<unnamed>"))
        .collect();

    println!("drones:      {}", show.drone_count());
    println!("duration:    {:.3}s", show.duration());
    println!(
        "environment: {}",
        serde_json::to_value(&env.kind)?.as_str().unwrap_or("?")
    );
    println!("cameras:     {}", cameras.join(", "));
    Ok(())
}

fn sample_drone(
    index: usize,
    drone: &DroneSpecification,
    t: f64,
) -> ShowResult<serde_json::Value> {
    let settings = &drone.settings;

    let mut position = Vec3::ZERO;
    let mut velocity = Vec3::ZERO;
    let mut traj = create_trajectory_player(&settings.trajectory);
    traj.position_at(t, &mut position)?;
    traj.velocity_at(t, &mut velocity)?;

    let yaw = settings
        .yaw_control
        .as_ref()
        .map(|yc| create_yaw_control_player(yc).heading(t).to_degrees());

    let mut color = Color::BLACK;
    create_light_program_player(settings.light_program.as_ref())?
        .evaluate_color_at(t, &mut color)?;

    Ok(json!({
        "drone": index,
        "name": settings.name,
        "position": position.to_array(),
        "velocity": velocity.to_array(),
        "yaw": yaw,
        "color": color.to_array(),
    }))
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let show = load(&args.file, true)?;
    let drones = &show.swarm.drones;
    let indices: Vec<usize> = match args.drone {
        Some(i) if i < drones.len() => vec![i],
        Some(i) => anyhow::bail!("drone {i} out of range; the show has {}", drones.len()),
        None => (0..drones.len()).collect(),
    };

    // Players are independent per drone.
    let records = indices
        .par_iter()
        .map(|&i| sample_drone(i, &drones[i], args.at))
        .collect::<ShowResult<Vec<_>>>()
        .with_context(|| format!("sample show at t={}", args.at))?;

    for record in records {
        println!("{record}");
    }
    Ok(())
}

fn cmd_lights(args: LightsArgs) -> anyhow::Result<()> {
    let show = load(&args.file, true)?;
    let drone = show.swarm.drones.get(args.drone).with_context(|| {
        format!(
            "drone {} out of range; the show has {}",
            args.drone,
            show.drone_count()
        )
    })?;
    let fps = Fps::new(args.fps, 1)?;
    let mut player = create_light_program_player(drone.settings.light_program.as_ref())?;

    for frame in player.iterate(fps).take(args.limit) {
        let (t, color) = frame?;
        println!("{}", json!({ "t": t, "color": color.to_array() }));
    }
    Ok(())
}
