//! Ground truth vs. prediction comparison for a detector on both data splits.

use std::fs::create_dir_all;
use std::path::PathBuf;

use ndarray::ArrayView2;
use tracing::{debug, error, info};

use crate::analysis::figure::{ComparisonFigure, ImageViewer, SAVE_DPI};
use crate::analysis::partition::partition;
use crate::analysis::subplot::{Panel, PanelPalette};
use crate::error::{Result, VizError};
use crate::helper_functions::{check_consistent_length, check_x_y, column_or_1d, project_root};
use crate::models::{ComparisonData, Partition};

pub const TRAIN_TRUTH_TITLE: &str = "Train set ground truth";
pub const TRAIN_PRED_TITLE: &str = "Train set prediction";
pub const TEST_TRUTH_TITLE: &str = "Test set ground truth";
pub const TEST_PRED_TITLE: &str = "Test set prediction";

/// What [`visualize`] does with the figure once it is built.
#[derive(Debug, Clone)]
pub struct VisualizeOptions {
    pub show_figure: bool,
    pub save_figure: bool,
    /// Directory receiving `<name>.png`.
    pub output_dir: PathBuf,
    pub dpi: f64,
    /// Viewer for `show_figure`; located on demand when `None`.
    pub viewer: Option<ImageViewer>,
}

impl Default for VisualizeOptions {
    fn default() -> Self {
        Self {
            show_figure: true,
            save_figure: false,
            output_dir: project_root(),
            dpi: SAVE_DPI,
            viewer: None,
        }
    }
}

fn ensure_two_features(x: &ArrayView2<'_, f64>) -> Result<()> {
    if x.ncols() != 2 {
        error!("Cannot visualize data of shape {:?}", x.dim());
        return Err(VizError::NotTwoDimensional { shape: x.dim() });
    }
    Ok(())
}

fn panel(title: &str, split: Partition, palette: PanelPalette) -> Panel {
    Panel {
        title: title.to_string(),
        inliers: split.inliers,
        outliers: split.outliers,
        palette,
    }
}

/// Validates the inputs and builds the four-panel comparison figure for the
/// detector called `name`.
///
/// Nothing is drawn or written here; every shape and length problem is
/// reported before the figure exists.
pub fn render_comparison(name: &str, data: &ComparisonData<'_>) -> Result<ComparisonFigure> {
    let y_train = check_x_y(data.x_train, data.y_train.view())?;
    let y_test = check_x_y(data.x_test, data.y_test.view())?;

    let y_test_pred = column_or_1d(data.y_test_pred.view())?;
    let y_train_pred = column_or_1d(data.y_train_pred.view())?;

    ensure_two_features(&data.x_train)?;
    ensure_two_features(&data.x_test)?;
    check_consistent_length(&[y_train.len(), y_train_pred.len()])?;
    check_consistent_length(&[y_test.len(), y_test_pred.len()])?;

    let train_truth = partition(data.x_train, y_train.view())?;
    let train_pred = partition(data.x_train, y_train_pred.view())?;
    let test_truth = partition(data.x_test, y_test.view())?;
    let test_pred = partition(data.x_test, y_test_pred.view())?;

    info!(
        "{}: train {} outliers / {} inliers, test {} outliers / {} inliers (ground truth)",
        name,
        train_truth.n_outliers(),
        train_truth.n_inliers(),
        test_truth.n_outliers(),
        test_truth.n_inliers()
    );

    Ok(ComparisonFigure::new(
        format!("Demo of {name}"),
        [
            panel(TRAIN_TRUTH_TITLE, train_truth, PanelPalette::train()),
            panel(TRAIN_PRED_TITLE, train_pred, PanelPalette::train()),
            panel(TEST_TRUTH_TITLE, test_truth, PanelPalette::test()),
            panel(TEST_PRED_TITLE, test_pred, PanelPalette::test()),
        ],
    ))
}

/// Builds the comparison figure, then saves it as `<name>.png` and/or shows
/// it according to `options`. Saving always happens before showing.
///
/// Returns the path of the saved image, if any.
pub fn visualize(
    name: &str,
    data: &ComparisonData<'_>,
    options: &VisualizeOptions,
) -> Result<Option<PathBuf>> {
    let figure = render_comparison(name, data)?;

    let saved = if options.save_figure {
        create_dir_all(&options.output_dir)?;
        let path = options.output_dir.join(format!("{name}.png"));
        Some(figure.save(&path, options.dpi)?)
    } else {
        None
    };

    if options.show_figure {
        let viewer = match &options.viewer {
            Some(viewer) => viewer.clone(),
            None => ImageViewer::locate()?,
        };
        let shown = figure.show(&viewer)?;
        debug!("Figure shown from {}", shown.display());
    }

    Ok(saved)
}
