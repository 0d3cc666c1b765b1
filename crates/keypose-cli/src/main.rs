use std::{error::Error, fs, path::Path};

use clap::Parser;
use keypose::{run_pose_estimation, PoseConfig, PoseInput, PoseReport};

/// Weighted keypoint pose estimation from a JSON problem file.
#[derive(Debug, Parser)]
#[command(author, version, about = "Estimate a 6-DoF pose from weighted 2D-3D keypoints")]
struct Args {
    /// Path to JSON file containing a PoseInput.
    #[arg(long)]
    input: String,

    /// Optional path to JSON PoseConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<String>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&data)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
    Ok(value)
}

fn run_from_files(input_path: &str, config_path: Option<&str>) -> Result<String, Box<dyn Error>> {
    let input: PoseInput = load_json_file(Path::new(input_path))?;
    let config = match config_path {
        Some(path) => load_json_file::<PoseConfig>(Path::new(path))?,
        None => PoseConfig::default(),
    };

    let report: PoseReport = run_pose_estimation(&input, &config)?;
    log::info!(
        "{} keypoints: {:?} after {} iterations",
        input.keypoints.len(),
        report.termination,
        report.iterations
    );
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let json = run_from_files(&args.input, args.config.as_deref())?;
    println!("{json}");
    Ok(())
}
