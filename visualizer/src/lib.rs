pub mod analysis;
pub mod config;
pub mod data_handling;
pub mod detectors;
pub mod error;
pub mod helper_functions;
pub mod models;

pub use analysis::comparison::{render_comparison, visualize, VisualizeOptions};
pub use analysis::figure::{ComparisonFigure, ImageViewer};
pub use analysis::partition::partition;
pub use error::{Result, VizError};
pub use models::{ComparisonData, Partition};
