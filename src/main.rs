use anyhow::Context;
use clap::Parser;
use gait_recorder::{GaitRecorder, PoseSource, RecorderConfig, ScriptedWalker, WalkerParams};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Record gait metrics from a scripted walk
#[derive(Parser, Debug)]
#[command(name = "gait-recorder", version, about)]
struct Args {
    /// Walk duration (s)
    #[arg(short, long, default_value_t = 5.0)]
    duration: f64,

    /// Sampling rate (Hz)
    #[arg(short, long, default_value_t = 60.0)]
    rate: f64,

    /// Forward distance between footsteps (m)
    #[arg(long, default_value_t = 0.6)]
    step_length: f64,

    /// Output CSV path
    #[arg(short, long, default_value = "gait.csv")]
    output: PathBuf,

    /// Recorder config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.rate > 0.0, "rate must be positive, got {}", args.rate);

    let config = match &args.config {
        Some(path) => RecorderConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RecorderConfig::default(),
    };

    let params = WalkerParams {
        step_length: args.step_length,
        rate_hz: args.rate,
        ..Default::default()
    };

    println!("Gait Recorder");
    println!("=============\n");

    let mut walker = ScriptedWalker::new(params, args.duration);
    let mut recorder = GaitRecorder::start(config, &walker.leg_segments())?;

    println!("Walker Configuration:");
    println!("  Step length: {:.2} m", walker.params.step_length);
    println!("  Foot spacing: {:.2} m", walker.params.foot_spacing);
    println!("  Leg length: {:.3} m", recorder.leg_length());
    println!("  Step debounce: {:.0} ms", recorder.config().step_debounce_ms);
    println!("  Rate: {:.0} Hz (dt = {:.4}s)", walker.params.rate_hz, walker.dt());
    println!(
        "  Swing: {:.2}s, double support: {:.2}s",
        walker.params.swing_duration, walker.params.double_support_duration
    );
    println!();

    recorder.record_all(&mut walker);
    let rows = recorder
        .flush_to_path(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if let Some(summary) = recorder.last_summary() {
        println!("--- Session Summary ---");
        println!("Frames: {}", summary.frame_count);
        println!("Duration: {:.2} s", summary.duration_s);
        println!("Steps: {} ({:.1} steps/min)", summary.total_steps, summary.cadence_spm);
        if let Some(right) = summary.mean_stride_right {
            println!("Mean stride (right): {:.3} m", right);
        }
        if let Some(left) = summary.mean_stride_left {
            println!("Mean stride (left): {:.3} m", left);
        }
        println!("Peak hip velocity: {:.3} m/s", summary.peak_velocity);
    }
    println!("\nWrote {} rows to {}", rows, args.output.display());

    Ok(())
}
