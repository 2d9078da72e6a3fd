mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;

use app::DigiscopeApp;
use digiscope::DashboardConfig;
use state::AppState;

/// Enterprise digital-transformation index dashboard.
#[derive(Parser, Debug)]
#[command(name = "digiscope", version, about)]
struct Cli {
    /// JSON configuration file; defaults apply to every missing field
    #[arg(long, env = "DIGISCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the word-frequency and industry files
    #[arg(long, env = "DIGISCOPE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Drop rows with a year below this
    #[arg(long)]
    year_cutoff: Option<i32>,
}

impl Cli {
    fn into_config(self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(cutoff) = self.year_cutoff {
            config.year_cutoff = cutoff;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Cli::parse().into_config()?;
    log::info!(
        "Starting dashboard on {} (year cutoff {})",
        config.data_dir.display(),
        config.year_cutoff
    );
    let state = AppState::new(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Digiscope – Digital Transformation Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DigiscopeApp::new(cc, state)))),
    )
    .map_err(|e| anyhow!("running dashboard: {e}"))
}
