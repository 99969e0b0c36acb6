use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::comparison::VisualizeOptions;
use crate::analysis::figure::SAVE_DPI;
use crate::data_handling::synthetic::GeneratorParams;
use crate::error::Result;
use crate::helper_functions::project_root;

/// Settings of the demo run. Missing keys in a config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub detector_name: String,
    #[serde(flatten)]
    pub generator: GeneratorParams,
    pub n_neighbors: usize,
    pub output_dir: PathBuf,
    pub dpi: f64,
    pub show_figure: bool,
    pub save_figure: bool,
    pub scores_csv: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            detector_name: "LOF".to_string(),
            generator: GeneratorParams::default(),
            n_neighbors: 20,
            output_dir: project_root(),
            dpi: SAVE_DPI,
            show_figure: true,
            save_figure: true,
            scores_csv: None,
        }
    }
}

impl DemoConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the `--config` file if given, then the remaining flags.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        args.apply(&mut config);
        Ok(config)
    }

    pub fn visualize_options(&self) -> VisualizeOptions {
        VisualizeOptions {
            show_figure: self.show_figure,
            save_figure: self.save_figure,
            output_dir: self.output_dir.clone(),
            dpi: self.dpi,
            viewer: None,
        }
    }
}

/// Runs the LOF outlier detection demo and plots ground truth against predictions.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "visualizer", version, about)]
pub struct Args {
    /// JSON file with demo settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Random seed of the data generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of outliers in the generated data and expected by the detector
    #[arg(long)]
    pub contamination: Option<f64>,

    #[arg(long)]
    pub n_train: Option<usize>,

    #[arg(long)]
    pub n_test: Option<usize>,

    /// Neighbourhood size of the detector
    #[arg(long)]
    pub n_neighbors: Option<usize>,

    /// Directory receiving the saved figure
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long)]
    pub dpi: Option<f64>,

    /// Do not open the figure in an image viewer
    #[arg(long)]
    pub no_show: bool,

    /// Do not write the figure to disk
    #[arg(long)]
    pub no_save: bool,

    /// Also write per-sample scores to this CSV file
    #[arg(long)]
    pub scores_csv: Option<PathBuf>,
}

impl Args {
    pub fn apply(&self, config: &mut DemoConfig) {
        if let Some(seed) = self.seed {
            config.generator.seed = seed;
        }
        if let Some(contamination) = self.contamination {
            config.generator.contamination = contamination;
        }
        if let Some(n) = self.n_train {
            config.generator.n_train = n;
        }
        if let Some(n) = self.n_test {
            config.generator.n_test = n;
        }
        if let Some(k) = self.n_neighbors {
            config.n_neighbors = k;
        }
        if let Some(dir) = &self.out_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if self.no_show {
            config.show_figure = false;
        }
        if self.no_save {
            config.save_figure = false;
        }
        if let Some(path) = &self.scores_csv {
            config.scores_csv = Some(path.clone());
        }
    }
}
