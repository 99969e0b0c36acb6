//! One scatter panel: inliers as circles, outliers as triangles, equal axes.

use std::ops::Range;

use ndarray::{concatenate, Array2, ArrayView2, Axis};
use ndarray_stats::QuantileExt;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use tracing::debug;

use crate::error::{invalid_param, render_err, Result, VizError};

/// Point sizes and font sizes are given in typographic points and scaled
/// to pixels with the render DPI.
pub const POINTS_PER_INCH: f64 = 72.0;
const TITLE_PT: f64 = 15.0;
const LEGEND_PT: f64 = 10.0;
const INLIER_AREA_PT2: f64 = 40.0;
const OUTLIER_AREA_PT2: f64 = 50.0;
/// Fraction of the data span left free on each side of the points.
const DATA_MARGIN: f64 = 0.05;

/// Resolves a colour identifier: base colour names, single-letter
/// shorthands and `#rrggbb` hex strings.
pub fn parse_color(name: &str) -> Result<RGBColor> {
    let key = name.trim().to_ascii_lowercase();
    let colour = match key.as_str() {
        "blue" | "b" => RGBColor(0, 0, 255),
        "orange" => RGBColor(255, 165, 0),
        "green" => RGBColor(0, 128, 0),
        "g" => RGBColor(0, 128, 0),
        "red" | "r" => RGBColor(255, 0, 0),
        "cyan" => RGBColor(0, 255, 255),
        "c" => RGBColor(0, 191, 191),
        "magenta" => RGBColor(255, 0, 255),
        "m" => RGBColor(191, 0, 191),
        "yellow" => RGBColor(255, 255, 0),
        "y" => RGBColor(191, 191, 0),
        "purple" => RGBColor(128, 0, 128),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "black" | "k" => RGBColor(0, 0, 0),
        "white" | "w" => RGBColor(255, 255, 255),
        hex if hex.len() == 7 && hex.is_ascii() && hex.starts_with('#') => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            match (channel(1), channel(3), channel(5)) {
                (Ok(r), Ok(g), Ok(b)) => RGBColor(r, g, b),
                _ => return Err(VizError::UnknownColor(name.to_string())),
            }
        }
        _ => return Err(VizError::UnknownColor(name.to_string())),
    };
    Ok(colour)
}

/// Inlier and outlier colours of one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPalette {
    pub inlier: RGBColor,
    pub outlier: RGBColor,
}

impl PanelPalette {
    pub fn new(inlier_color: &str, outlier_color: &str) -> Result<Self> {
        Ok(Self {
            inlier: parse_color(inlier_color)?,
            outlier: parse_color(outlier_color)?,
        })
    }

    /// Blue inliers, orange outliers.
    pub fn train() -> Self {
        Self {
            inlier: RGBColor(0, 0, 255),
            outlier: RGBColor(255, 165, 0),
        }
    }

    /// Green inliers, red outliers.
    pub fn test() -> Self {
        Self {
            inlier: RGBColor(0, 128, 0),
            outlier: RGBColor(255, 0, 0),
        }
    }
}

impl Default for PanelPalette {
    fn default() -> Self {
        Self::train()
    }
}

/// Pixel sizes for one rendering resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelStyle {
    pub dpi: f64,
}

impl PanelStyle {
    pub fn new(dpi: f64) -> Self {
        Self { dpi }
    }

    pub fn points_to_px(&self, points: f64) -> f64 {
        points * self.dpi / POINTS_PER_INCH
    }

    pub fn title_px(&self) -> f64 {
        self.points_to_px(TITLE_PT)
    }

    pub fn legend_px(&self) -> f64 {
        self.points_to_px(LEGEND_PT)
    }

    /// Marker radius in pixels for a marker of the given area in points².
    fn marker_radius(&self, area_pt2: f64) -> u32 {
        (self.points_to_px(area_pt2.sqrt()) / 2.0).round().max(1.0) as u32
    }

    pub fn inlier_radius(&self) -> u32 {
        self.marker_radius(INLIER_AREA_PT2)
    }

    pub fn outlier_radius(&self) -> u32 {
        self.marker_radius(OUTLIER_AREA_PT2)
    }
}

/// A titled scatter panel: the owned data behind one subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub inliers: Array2<f64>,
    pub outliers: Array2<f64>,
    pub palette: PanelPalette,
}

impl Panel {
    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        style: &PanelStyle,
    ) -> Result<()> {
        draw_subplot(
            area,
            self.inliers.view(),
            self.outliers.view(),
            &self.title,
            &self.palette,
            style,
        )
    }
}

/// Bounding box of both point sets as `(x_min, x_max, y_min, y_max)`.
fn data_bounds(inliers: ArrayView2<'_, f64>, outliers: ArrayView2<'_, f64>) -> Option<(f64, f64, f64, f64)> {
    let points = concatenate(Axis(0), &[inliers.view(), outliers.view()]).ok()?;
    let (xs, ys) = (points.column(0), points.column(1));
    Some((*xs.min().ok()?, *xs.max().ok()?, *ys.min().ok()?, *ys.max().ok()?))
}

/// Widens the data box so that one data unit spans the same number of
/// pixels along both axes of a `width` x `height` plotting area.
pub fn equal_aspect_ranges(
    bounds: Option<(f64, f64, f64, f64)>,
    (width, height): (u32, u32),
) -> (Range<f64>, Range<f64>) {
    let (x_min, x_max, y_min, y_max) = bounds.unwrap_or((0.0, 1.0, 0.0, 1.0));
    let centre = |lo: f64, hi: f64| (lo + hi) / 2.0;
    let span = |lo: f64, hi: f64| {
        let s = (hi - lo) * (1.0 + 2.0 * DATA_MARGIN);
        if s > 0.0 {
            s
        } else {
            1.0
        }
    };

    let (cx, cy) = (centre(x_min, x_max), centre(y_min, y_max));
    let (mut dx, mut dy) = (span(x_min, x_max), span(y_min, y_max));
    let px_ratio = width.max(1) as f64 / height.max(1) as f64;
    if dx / dy < px_ratio {
        dx = dy * px_ratio;
    } else {
        dy = dx / px_ratio;
    }

    (
        (cx - dx / 2.0)..(cx + dx / 2.0),
        (cy - dy / 2.0)..(cy + dy / 2.0),
    )
}

/// Draws one inlier/outlier scatter panel onto `area`.
///
/// The panel gets its own title, an equal-aspect data box framed without
/// tick labels, inliers as circles and outliers as slightly larger
/// triangles, and a legend in the lower right corner. Either matrix may be
/// empty but both must have two columns.
pub fn draw_subplot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    inliers: ArrayView2<'_, f64>,
    outliers: ArrayView2<'_, f64>,
    title: &str,
    palette: &PanelPalette,
    style: &PanelStyle,
) -> Result<()> {
    for points in [inliers.view(), outliers.view()] {
        if points.ncols() != 2 {
            return Err(VizError::NotTwoDimensional { shape: points.dim() });
        }
    }
    if title.trim().is_empty() {
        return Err(invalid_param("title", "must not be empty"));
    }

    let titled = area
        .titled(title, ("sans-serif", style.title_px()))
        .map_err(render_err)?;
    let pad = style.points_to_px(6.0).round() as u32;
    let plot_area = titled.margin(0u32, pad, pad, pad);
    let (x_range, y_range) =
        equal_aspect_ranges(data_bounds(inliers, outliers), plot_area.dim_in_pixel());
    debug!("Panel '{}' ranges x={:?} y={:?}", title, x_range, y_range);

    let mut chart = ChartBuilder::on(&plot_area)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_err)?;

    // Frame only: tick labels carry no meaning for these panels.
    chart
        .plotting_area()
        .draw(&Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_err)?;

    let inlier_colour = palette.inlier;
    let inlier_radius = style.inlier_radius();
    chart
        .draw_series(
            inliers
                .rows()
                .into_iter()
                .map(|r| Circle::new((r[0], r[1]), inlier_radius, inlier_colour.filled())),
        )
        .map_err(render_err)?
        .label("inliers")
        .legend(move |(x, y)| Circle::new((x, y), inlier_radius, inlier_colour.filled()));

    let outlier_colour = palette.outlier;
    let outlier_radius = style.outlier_radius();
    chart
        .draw_series(outliers.rows().into_iter().map(|r| {
            TriangleMarker::new((r[0], r[1]), outlier_radius, outlier_colour.filled())
        }))
        .map_err(render_err)?
        .label("outliers")
        .legend(move |(x, y)| TriangleMarker::new((x, y), outlier_radius, outlier_colour.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", style.legend_px()))
        .position(SeriesLabelPosition::LowerRight)
        .draw()
        .map_err(render_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use ndarray::array;
    use test_case::test_case;

    #[test_case("blue", RGBColor(0, 0, 255))]
    #[test_case("Orange", RGBColor(255, 165, 0))]
    #[test_case("green", RGBColor(0, 128, 0))]
    #[test_case(" red ", RGBColor(255, 0, 0))]
    #[test_case("#1f77b4", RGBColor(31, 119, 180))]
    fn parses_known_colours(name: &str, expected: RGBColor) {
        assert_eq!(parse_color(name).unwrap(), expected);
    }

    #[test_case("chartreuse-ish")]
    #[test_case("#12345")]
    #[test_case("#zzzzzz")]
    fn rejects_unknown_colours(name: &str) {
        assert!(matches!(parse_color(name), Err(VizError::UnknownColor(_))));
    }

    #[test]
    fn default_palettes_match_the_panel_pairs() {
        assert_eq!(PanelPalette::default(), PanelPalette::new("blue", "orange").unwrap());
        assert_eq!(PanelPalette::test(), PanelPalette::new("green", "red").unwrap());
    }

    #[test]
    fn outlier_markers_are_larger() {
        let style = PanelStyle::new(300.0);
        assert!(style.outlier_radius() > style.inlier_radius());
        assert!(approx_eq!(f64, style.title_px(), 62.5, epsilon = 1e-9));
    }

    #[test]
    fn equal_aspect_matches_pixel_ratio() {
        let bounds = Some((0.0, 10.0, 0.0, 2.0));
        let (xr, yr) = equal_aspect_ranges(bounds, (400, 400));
        let (dx, dy) = (xr.end - xr.start, yr.end - yr.start);
        assert!(approx_eq!(f64, dx, dy, epsilon = 1e-9));
        assert!(xr.start < 0.0 && xr.end > 10.0);

        let (xr, yr) = equal_aspect_ranges(bounds, (800, 200));
        let (dx, dy) = (xr.end - xr.start, yr.end - yr.start);
        assert!(approx_eq!(f64, dx / dy, 4.0, epsilon = 1e-9));
    }

    #[test]
    fn degenerate_bounds_fall_back_to_a_unit_box() {
        let (xr, yr) = equal_aspect_ranges(Some((3.0, 3.0, 3.0, 3.0)), (100, 100));
        assert!(xr.contains(&3.0) && yr.contains(&3.0));
        assert!(xr.end - xr.start > 0.0);

        let empty = Array2::<f64>::zeros((0, 2));
        assert_eq!(data_bounds(empty.view(), empty.view()), None);
    }

    #[test]
    fn bounds_cover_separately_owned_point_sets() {
        let inliers = array![[0.0, 1.0], [2.0, -1.0]];
        let bounds = {
            let outliers = array![[-3.0, 4.0]];
            data_bounds(inliers.view(), outliers.view())
        };
        assert_eq!(bounds, Some((-3.0, 2.0, -1.0, 4.0)));
    }

    #[test]
    fn draws_into_a_bitmap_including_empty_sets() {
        let mut buffer = vec![0u8; 300 * 300 * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (300, 300)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            let inliers = array![[0.0, 0.0], [1.0, 1.0], [0.5, 0.2]];
            let outliers = Array2::<f64>::zeros((0, 2));
            draw_subplot(
                &root,
                inliers.view(),
                outliers.view(),
                "Train set ground truth",
                &PanelPalette::train(),
                &PanelStyle::new(100.0),
            )
            .unwrap();
            root.present().unwrap();
        }
        // Blue inlier pixels made it into the image.
        assert!(buffer.chunks(3).any(|px| px == [0, 0, 255]));
    }

    #[test]
    fn rejects_wrong_width_and_empty_title() {
        let mut buffer = vec![0u8; 50 * 50 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (50, 50)).into_drawing_area();
        let wide = Array2::<f64>::zeros((2, 3));
        let ok = Array2::<f64>::zeros((2, 2));
        let style = PanelStyle::new(72.0);
        assert!(matches!(
            draw_subplot(&root, wide.view(), ok.view(), "t", &PanelPalette::train(), &style),
            Err(VizError::NotTwoDimensional { shape: (2, 3) })
        ));
        assert!(matches!(
            draw_subplot(&root, ok.view(), ok.view(), "  ", &PanelPalette::train(), &style),
            Err(VizError::InvalidParameter { .. })
        ));
    }
}
