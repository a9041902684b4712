use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use animation::{
    AnimationConfig, AnimationController, CameraSink, CameraState, CameraTarget,
    InterpolationMode, Keyframe, PlaybackEvent,
};
use clap::{Parser, Subcommand};
use formats::{LoadWarning, ProjectDocument};
use foundation::easing::Easing;
use runtime::{Clock, FramePlan, ManualClock, SystemClock, MAX_PLAN_FRAMES};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Camera fly-through timeline tool")]
struct Args {
    /// Animation config (JSON); missing fields take defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a small example project
    Init {
        /// Output project file
        out: PathBuf,
    },

    /// Print keyframes, durations and load warnings of a project
    Inspect {
        project: PathBuf,
    },

    /// Sample the camera path at a fixed frame rate (deterministic)
    Sample {
        project: PathBuf,

        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Sample this long instead of the project's total duration
        #[arg(long)]
        duration_ms: Option<f64>,

        /// Write JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Play the project in real time and print the camera as it moves
    Preview {
        project: PathBuf,

        /// Stop after this many seconds of wall time
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        /// Print every Nth tick
        #[arg(long, default_value_t = 15)]
        every: u64,

        /// Override the project's playback speed
        #[arg(long)]
        speed: Option<f64>,

        /// Force looping on
        #[arg(long = "loop")]
        looping: bool,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = real_main(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose && std::env::var_os("RUST_LOG").is_none() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(args: Args) -> CliResult<()> {
    let config = match &args.config {
        Some(path) => AnimationConfig::from_path(path)?,
        None => AnimationConfig::default(),
    };
    debug!(?config, "animation config");

    match args.command {
        Command::Init { out } => cmd_init(&out, config),
        Command::Inspect { project } => cmd_inspect(&project, config),
        Command::Sample {
            project,
            fps,
            duration_ms,
            out,
        } => cmd_sample(&project, config, fps, duration_ms, out.as_deref()),
        Command::Preview {
            project,
            seconds,
            every,
            speed,
            looping,
        } => cmd_preview(&project, config, seconds, every, speed, looping),
    }
}

/// Builds a controller and loads `path` into it.
fn load_controller<C: Clock, S: CameraSink>(
    path: &Path,
    clock: C,
    camera: S,
    config: AnimationConfig,
) -> CliResult<(AnimationController<C, S>, Vec<LoadWarning>)> {
    let doc = ProjectDocument::load(path)?;
    let mut controller = AnimationController::new(clock, camera, config);
    let warnings = doc.decode().apply_to(&mut controller);
    for w in &warnings {
        warn!(project = %path.display(), "{w}");
    }
    Ok((controller, warnings))
}

fn cmd_init(out: &Path, config: AnimationConfig) -> CliResult<()> {
    let mut controller = AnimationController::new(ManualClock::new(), CameraTarget::new(), config);
    controller.edit_timeline(|tl| {
        let paris = CameraState::from_zoom(48.8566, 2.3522, 11.0, 0.0, 30.0);
        let berlin = CameraState::from_zoom(52.52, 13.405, 10.5, 20.0, 40.0);
        let rome = CameraState::from_zoom(41.9028, 12.4964, 12.0, 340.0, 45.0);

        tl.insert_keyframe(Keyframe::new(paris, 0.0));
        tl.insert_keyframe(
            Keyframe::new(berlin, 6_000.0)
                .with_interpolation(InterpolationMode::ArcZoom)
                .with_easing(Easing::EaseInOutCubic),
        );
        tl.insert_keyframe(
            Keyframe::new(rome, 12_000.0)
                .with_interpolation(InterpolationMode::DirectFly)
                .with_easing(Easing::Adaptive)
                .with_smoothness(0.7),
        );
    });

    ProjectDocument::from_controller(&controller).save(out)?;
    info!(path = %out.display(), keyframes = controller.timeline().len(), "example project written");
    Ok(())
}

fn cmd_inspect(path: &Path, config: AnimationConfig) -> CliResult<()> {
    let (controller, warnings) =
        load_controller(path, ManualClock::new(), CameraTarget::new(), config)?;
    let timeline = controller.timeline();

    println!("project: {}", path.display());
    println!("keyframes: {}", timeline.len());
    println!("keyframe duration: {:.0} ms", timeline.total_duration_ms());
    println!("total duration: {:.0} ms", controller.total_duration_ms());
    println!(
        "playback: speed {:.2}x, looping {}, speed curve {} ({} points)",
        controller.playback_speed(),
        controller.is_looping(),
        if controller.speed_curve_enabled() { "on" } else { "off" },
        controller.speed_curve().len(),
    );

    for (i, kf) in timeline.keyframes().iter().enumerate() {
        println!(
            "  [{i}] t={:>8.0} ms  lat {:>9.4}  lon {:>9.4}  zoom {:>5.2}  bearing {:>5.1}  tilt {:>4.1}  {:?}/{:?}",
            kf.time_ms,
            kf.latitude,
            kf.longitude,
            kf.zoom(),
            kf.bearing,
            kf.tilt,
            kf.interpolation,
            kf.easing,
        );
    }

    if !warnings.is_empty() {
        println!("warnings:");
        for w in &warnings {
            println!("  {w}");
        }
    }
    Ok(())
}

fn cmd_sample(
    path: &Path,
    config: AnimationConfig,
    fps: u32,
    duration_ms: Option<f64>,
    out: Option<&Path>,
) -> CliResult<()> {
    if fps == 0 {
        return Err("--fps must be at least 1".into());
    }
    let (controller, _warnings) =
        load_controller(path, ManualClock::new(), CameraTarget::new(), config)?;

    let plan = match duration_ms {
        Some(d) => FramePlan::new(fps, d),
        None => controller.export_plan(fps),
    };
    if !plan.is_within_limit() {
        return Err(format!(
            "{} ms at {fps} fps needs {} frames; the limit is {MAX_PLAN_FRAMES}",
            plan.span.duration_ms(),
            plan.frame_count(),
        )
        .into());
    }
    let frames = controller.sample_frames(&plan);
    let payload = serde_json::to_string_pretty(&frames)?;

    match out {
        Some(out) => {
            fs::write(out, payload)?;
            info!(path = %out.display(), frames = frames.len(), fps, "camera path written");
        }
        None => println!("{payload}"),
    }
    Ok(())
}

/// Camera that prints every Nth pose it receives.
struct PrintingCamera {
    every: u64,
    writes: u64,
}

impl CameraSink for PrintingCamera {
    fn set_position(&mut self, state: &CameraState) {
        if self.writes % self.every == 0 {
            println!(
                "lat {:>9.4}  lon {:>9.4}  zoom {:>5.2}  bearing {:>5.1}  tilt {:>4.1}",
                state.latitude,
                state.longitude,
                state.zoom(),
                state.bearing,
                state.tilt,
            );
        }
        self.writes += 1;
    }
}

fn cmd_preview(
    path: &Path,
    config: AnimationConfig,
    seconds: f64,
    every: u64,
    speed: Option<f64>,
    looping: bool,
) -> CliResult<()> {
    let camera = PrintingCamera {
        every: every.max(1),
        writes: 0,
    };
    let clock = SystemClock::new();
    let (mut controller, _warnings) = load_controller(path, clock, camera, config)?;

    if let Some(speed) = speed {
        controller.set_playback_speed(speed);
    }
    if looping {
        controller.set_looping(true);
    }

    let tick = Duration::from_millis(controller.tick_interval_ms());
    let budget_ms = seconds.max(0.0) * 1000.0;
    let started_ms = controller.clock().now_ms();

    controller.play();
    while controller.is_playing() && controller.clock().now_ms() - started_ms < budget_ms {
        thread::sleep(tick);
        controller.tick();
        for event in controller.drain_events() {
            match event {
                PlaybackEvent::AnimationComplete => info!("animation complete"),
                PlaybackEvent::FrameRendered(_) => {}
                other => debug!(?other, "playback event"),
            }
        }
    }
    controller.pause();

    info!(
        time_ms = controller.current_time_ms(),
        frames = controller.camera().writes,
        "preview finished"
    );
    Ok(())
}
