use std::error::Error;
use std::path::{Path, PathBuf};

use ap_cascade::{
    CascadeConfig, ControllerOutput, ControllerTarget, LoopId, ManeuverRateCascade, SensorData,
};
use ap_core::Real;
use ap_mission::{GeofenceConfig, OverrideSupervisor, Trigger};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

mod plant;

use plant::Plant;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "ap-cli")]
#[command(about = "Autopilot control-law tool - tune and exercise the maneuver rate cascade", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a cascade configuration file
    Validate {
        /// Path to the cascade YAML file
        config_path: PathBuf,
    },
    /// Run the cascade against a toy aircraft plant
    Simulate {
        /// Path to the cascade YAML file
        config_path: PathBuf,
        /// Number of control ticks
        #[arg(long, default_value_t = 500)]
        steps: usize,
        /// Tick period in seconds
        #[arg(long, default_value_t = 0.02)]
        dt: f64,
        /// Commanded yaw rate (rad/s)
        #[arg(long, default_value_t = 0.0)]
        yaw_rate: f64,
        /// Commanded climb angle (rad)
        #[arg(long, default_value_t = 0.0)]
        climb_angle: f64,
        /// Commanded airspeed (m/s)
        #[arg(long, default_value_t = 20.0)]
        velocity: f64,
        /// Geofence YAML with enter/exit overrides
        #[arg(long)]
        geofence: Option<PathBuf>,
        /// Print one JSON object per tick instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a default cascade configuration
    Defaults,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Simulate {
            config_path,
            steps,
            dt,
            yaw_rate,
            climb_angle,
            velocity,
            geofence,
            json,
        } => cmd_simulate(
            &config_path,
            &SimulateOptions {
                steps,
                dt,
                target: ControllerTarget::new(yaw_rate, climb_angle, velocity),
                geofence,
                json,
            },
        ),
        Commands::Defaults => cmd_defaults(),
    }
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    println!("Validating cascade config: {}", config_path.display());
    let config = CascadeConfig::from_path(config_path)?;

    // Configuring a throwaway cascade exercises every constraint and filter.
    let sensors = SensorData::default();
    let target = ControllerTarget::default();
    let out = ControllerOutput::default();
    let mut cascade = ManeuverRateCascade::new(&sensors, &target, &out)?;
    cascade.configure(&config)?;

    println!("✓ Config is valid");
    for (id, params) in config.pid_params() {
        println!(
            "  {:<12} kp={:<8} ki={:<8} kd={:<8} imax={:<8} ff={}",
            id.as_str(),
            params.kp,
            params.ki,
            params.kd,
            params.imax,
            params.ff
        );
    }
    Ok(())
}

fn cmd_defaults() -> CliResult<()> {
    print!("{}", CascadeConfig::default().to_yaml_string()?);
    Ok(())
}

struct SimulateOptions {
    steps: usize,
    dt: Real,
    target: ControllerTarget,
    geofence: Option<PathBuf>,
    json: bool,
}

#[derive(Serialize)]
struct TickRecord {
    t: Real,
    roll: Real,
    pitch: Real,
    airspeed: Real,
    altitude: Real,
    roll_output: Real,
    pitch_output: Real,
    throttle_output: Real,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<Trigger>,
}

fn cmd_simulate(config_path: &Path, opts: &SimulateOptions) -> CliResult<()> {
    if !(opts.dt.is_finite() && opts.dt > 0.0) {
        return Err(format!("dt must be positive, got {}", opts.dt).into());
    }
    let config = CascadeConfig::from_path(config_path)?;
    let mut supervisor = match &opts.geofence {
        Some(path) => Some(OverrideSupervisor::new(GeofenceConfig::from_path(path)?)),
        None => None,
    };

    let sensors = SensorData::default();
    let out = ControllerOutput::default();
    let mut cascade = ManeuverRateCascade::new(&sensors, &opts.target, &out)?;
    cascade.configure(&config)?;

    let mut plant = Plant::new(opts.target.velocity.get(), 100.0);
    info!(steps = opts.steps, dt = opts.dt, "starting closed-loop simulation");

    if !opts.json {
        println!(
            "{:>8} {:>9} {:>9} {:>9} {:>9} {:>7} {:>7} {:>7}",
            "t", "roll", "pitch", "airspeed", "alt", "ail", "elev", "thr"
        );
    }

    for step in 0..opts.steps {
        let t = step as Real * opts.dt;
        plant.publish(t, &sensors);
        let trigger = supervisor
            .as_mut()
            .and_then(|s| s.update(&plant.position, &mut cascade));
        cascade.evaluate();

        let record = TickRecord {
            t,
            roll: plant.roll,
            pitch: plant.pitch,
            airspeed: plant.airspeed,
            altitude: plant.position.z,
            roll_output: out.roll_output.get(),
            pitch_output: out.pitch_output.get(),
            throttle_output: out.throttle_output.get(),
            trigger,
        };
        if opts.json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            print_row(&record);
        }

        plant.step(&out, opts.dt);
    }

    if !opts.json {
        let status = cascade.pid_status();
        println!("Final loop status:");
        for id in LoopId::ALL {
            if let Some(s) = status.get(&id) {
                println!(
                    "  {:<12} target={:>9.4} value={:>9.4} output={:>9.4}",
                    id.as_str(),
                    s.target,
                    s.value,
                    s.output
                );
            }
        }
    }
    Ok(())
}

fn print_row(r: &TickRecord) {
    let mut line = format!(
        "{:>8.3} {:>9.4} {:>9.4} {:>9.3} {:>9.2} {:>7.3} {:>7.3} {:>7.3}",
        r.t, r.roll, r.pitch, r.airspeed, r.altitude, r.roll_output, r.pitch_output,
        r.throttle_output
    );
    if let Some(trigger) = r.trigger {
        line.push_str(&format!("  {:?}", trigger));
    }
    println!("{}", line);
}
