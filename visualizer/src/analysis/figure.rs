//! The owned 2x2 comparison figure and the ways to get it out of memory:
//! PNG, SVG, a raw RGB buffer, or an external image viewer.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, IntoDrawingArea, WHITE};
use plotters_backend::DrawingBackend;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use tracing::{debug, info};

use crate::analysis::subplot::{Panel, PanelStyle};
use crate::error::{render_err, Result, VizError};

/// Figure size in inches, width by height.
pub const FIGURE_SIZE_INCHES: (f64, f64) = (12.0, 10.0);
/// Resolution used when the figure is written to disk.
pub const SAVE_DPI: f64 = 300.0;
/// Resolution used for on-screen display and SVG export.
pub const SCREEN_DPI: f64 = 100.0;

/// Environment variable naming the program used by [`ImageViewer::locate`].
pub const VIEWER_ENV: &str = "VISUALIZER_VIEWER";

/// Four scatter panels under a common title, laid out left to right, top to
/// bottom. Owning the data means the figure can be drawn on any backend, any
/// number of times, without touching shared plotting state.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonFigure {
    title: String,
    panels: [Panel; 4],
    size_inches: (f64, f64),
}

impl ComparisonFigure {
    pub fn new(title: impl Into<String>, panels: [Panel; 4]) -> Self {
        Self {
            title: title.into(),
            panels,
            size_inches: FIGURE_SIZE_INCHES,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn panels(&self) -> &[Panel; 4] {
        &self.panels
    }

    pub fn size_inches(&self) -> (f64, f64) {
        self.size_inches
    }

    pub fn pixel_size(&self, dpi: f64) -> (u32, u32) {
        let (w, h) = self.size_inches;
        ((w * dpi).round() as u32, (h * dpi).round() as u32)
    }

    /// Draws the whole figure onto `root`, sizing fonts and markers for `dpi`.
    pub fn draw_on<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, dpi: f64) -> Result<()> {
        let style = PanelStyle::new(dpi);
        root.fill(&WHITE).map_err(render_err)?;
        let body = root
            .titled(&self.title, ("sans-serif", style.title_px()))
            .map_err(render_err)?;

        let cells = body.split_evenly((2, 2));
        for (panel, cell) in self.panels.iter().zip(cells.iter()) {
            let cell = cell.margin(
                style.points_to_px(12.0) as u32,
                style.points_to_px(12.0) as u32,
                style.points_to_px(18.0) as u32,
                style.points_to_px(18.0) as u32,
            );
            panel.draw(&cell, &style)?;
        }
        Ok(())
    }

    /// Pixel size at `dpi`, rejecting resolutions that leave the figure
    /// without a single pixel along either axis.
    fn checked_pixel_size(&self, dpi: f64) -> Result<(u32, u32)> {
        check_dpi(dpi)?;
        match self.pixel_size(dpi) {
            (0, _) | (_, 0) => Err(crate::error::invalid_param(
                "dpi",
                format!("{dpi} gives a zero-sized figure"),
            )),
            size => Ok(size),
        }
    }

    /// Writes the figure as a raster image; the format follows the file
    /// extension.
    ///
    /// `dpi` only sets the pixel dimensions. The PNG carries no physical
    /// resolution (pHYs) chunk.
    pub fn save(&self, path: impl AsRef<Path>, dpi: f64) -> Result<PathBuf> {
        let size = self.checked_pixel_size(dpi)?;
        let path = path.as_ref();
        {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            self.draw_on(&root, dpi)?;
            root.present().map_err(render_err)?;
        }
        info!("Figure '{}' saved to {}", self.title, path.display());
        Ok(path.to_path_buf())
    }

    pub fn save_svg(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        {
            let root = SVGBackend::new(path, self.pixel_size(SCREEN_DPI)).into_drawing_area();
            self.draw_on(&root, SCREEN_DPI)?;
            root.present().map_err(render_err)?;
        }
        info!("Figure '{}' saved to {}", self.title, path.display());
        Ok(path.to_path_buf())
    }

    /// Renders into a packed RGB buffer of `pixel_size(dpi)` without any file
    /// or display involved.
    pub fn render_rgb(&self, dpi: f64) -> Result<Vec<u8>> {
        let (w, h) = self.checked_pixel_size(dpi)?;
        let mut buffer = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            self.draw_on(&root, dpi)?;
            root.present().map_err(render_err)?;
        }
        Ok(buffer)
    }

    /// Renders a screen-resolution PNG into the temp directory and hands it to
    /// `viewer`. Blocks for as long as the viewer process runs.
    ///
    /// Launchers such as `xdg-open` return before the image is read, so the
    /// file is kept and its path returned; removing it is up to the caller.
    pub fn show(&self, viewer: &ImageViewer) -> Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("visualizer-")
            .suffix(".png")
            .tempfile()?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        self.save(&path, SCREEN_DPI)?;
        viewer.open(&path)?;
        Ok(path)
    }
}

fn check_dpi(dpi: f64) -> Result<()> {
    if dpi.is_finite() && dpi > 0.0 {
        Ok(())
    } else {
        Err(crate::error::invalid_param("dpi", format!("must be positive, got {dpi}")))
    }
}

/// External program that displays an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageViewer {
    program: PathBuf,
}

impl ImageViewer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses `$VISUALIZER_VIEWER` when set, otherwise the first of
    /// `xdg-open` / `open` found on `PATH`.
    pub fn locate() -> Result<Self> {
        if let Some(program) = env::var_os(VIEWER_ENV) {
            let program = which::which(&program).map_err(|_| VizError::ViewerUnavailable)?;
            return Ok(Self::new(program));
        }
        ["xdg-open", "open"]
            .iter()
            .find_map(|candidate| which::which(candidate).ok())
            .map(Self::new)
            .ok_or(VizError::ViewerUnavailable)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn open(&self, image: &Path) -> Result<()> {
        debug!("Opening {} with {}", image.display(), self.program.display());
        let status = Command::new(&self.program).arg(image).status()?;
        if !status.success() {
            return Err(VizError::ViewerFailed(status));
        }
        Ok(())
    }
}
