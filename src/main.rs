use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dicom_window::{
    config::Config,
    frame_store::FrameStore,
    study_loader::StudyLoader,
    window::SharedWindow,
    windowed_image::WindowedImage,
};

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.verbose);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config: &Config) -> Result<()> {
    let study = StudyLoader::load_from_path(&config.path, config.sort_by)
        .with_context(|| format!("failed to load {}", config.path.display()))?;

    info!("ID: {}", study.labels.patient_id);
    info!("Name: {}", study.labels.patient_name);
    info!("Study: {}", study.labels.study_description);

    let window = Arc::new(SharedWindow::new(config.window(study.window)));
    let store = Arc::new(FrameStore::new());
    store.load(study.frames)?;
    store.select(config.frame)?;

    let mut image = WindowedImage::new(Arc::clone(&store), window)
        .with_interpolation(config.interpolation);
    if let Some(size) = config.size {
        image.set_target_size(Some((size.width, size.height)));
    }

    let params = image.window();
    info!(
        level = params.level,
        width = params.width,
        slice = %store.position_label().unwrap_or_default(),
        "rendering"
    );

    let raster = image.render()?;
    raster
        .save(&config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    info!("Saved {}", config.output.display());
    Ok(())
}
