//! validate - score detector predictions against YOLO-format labels
//!
//! Reads a predictions JSON file, matches each image's detections against
//! `<labels_dir>/<image stem>.txt`, and writes precision/recall/F1 as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use detection_eval::config::{
    EvalConfig, PostprocessConfig, DEFAULT_CONF_THRESHOLD, DEFAULT_EVAL_IOU_THRESHOLD,
    DEFAULT_IMG_SIZE, DEFAULT_NMS_IOU_THRESHOLD,
};
use detection_eval::evaluator::{evaluate_entries, prepare_images};
use detection_eval::loader::{load_predictions_from_file, write_report};

#[derive(Parser, Debug)]
#[command(name = "validate")]
#[command(about = "Validate detector predictions on a labeled dataset")]
struct Cli {
    /// Path to the predictions JSON file
    #[arg(long)]
    predictions: PathBuf,

    /// Directory holding one YOLO label file per image
    #[arg(long, default_value = "dataset/val/labels")]
    labels_dir: PathBuf,

    /// IoU threshold for matching predictions to ground truth
    #[arg(long, default_value_t = DEFAULT_EVAL_IOU_THRESHOLD)]
    iou: f64,

    /// Where to write the metrics report
    #[arg(long, default_value = "validation_metrics.json")]
    output: PathBuf,

    /// Treat detections as raw model output and post-process them first
    #[arg(long)]
    postprocess: bool,

    /// Minimum confidence kept by post-processing
    #[arg(long, env = "CONF_THRESHOLD", default_value_t = DEFAULT_CONF_THRESHOLD)]
    conf_threshold: f64,

    /// IoU threshold used by non-maximum suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = DEFAULT_NMS_IOU_THRESHOLD)]
    nms_iou: f64,

    /// Square inference resolution the detections are expressed in
    #[arg(long, env = "IMG_SIZE", default_value_t = DEFAULT_IMG_SIZE)]
    img_size: u32,
}

fn run(cli: Cli) -> detection_eval::Result<()> {
    let eval_config = EvalConfig::new(cli.iou);
    eval_config.validate()?;

    let postprocess_config = cli.postprocess.then_some(PostprocessConfig {
        conf_threshold: cli.conf_threshold,
        iou_threshold: cli.nms_iou,
        img_size: cli.img_size,
    });
    if let Some(config) = &postprocess_config {
        log::info!(
            "post-processing enabled (conf={:.2}, nms_iou={:.2}, img={})",
            config.conf_threshold,
            config.iou_threshold,
            config.img_size
        );
    }

    log::info!("loading predictions from {}", cli.predictions.display());
    let predictions = load_predictions_from_file(&cli.predictions)?;
    log::info!(
        "loaded predictions for {} images, labels from {}",
        predictions.images.len(),
        cli.labels_dir.display()
    );

    let entries = prepare_images(&predictions, &cli.labels_dir, postprocess_config.as_ref())?;
    let metrics = evaluate_entries(&entries, &eval_config)?;

    write_report(&cli.output, &metrics)?;
    log::info!("report written to {}", cli.output.display());
    println!("{}", metrics.to_json_pretty()?);

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("validation failed: {err}");
            ExitCode::FAILURE
        }
    }
}
