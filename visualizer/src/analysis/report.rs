//! Per-sample score export: one CSV row per sample of both splits.

use std::fs::File;
use std::path::Path;

use ndarray::{ArrayView1, ArrayView2};
use polars::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::helper_functions::check_consistent_length;
use crate::models::Split;

/// Samples of one split together with their labels, predictions and scores.
#[derive(Debug, Clone)]
pub struct SplitScores<'a> {
    pub split: Split,
    pub x: ArrayView2<'a, f64>,
    pub y: ArrayView1<'a, u8>,
    pub y_pred: ArrayView1<'a, u8>,
    pub scores: ArrayView1<'a, f64>,
}

impl SplitScores<'_> {
    fn check(&self) -> Result<()> {
        check_consistent_length(&[
            self.x.nrows(),
            self.y.len(),
            self.y_pred.len(),
            self.scores.len(),
        ])
    }
}

/// Builds a frame with columns `split`, `x0..x{d-1}`, `label`, `predicted`
/// and `score`, splits stacked in the given order.
pub fn scores_frame(splits: &[SplitScores<'_>]) -> Result<DataFrame> {
    for s in splits {
        s.check()?;
    }
    let n_features = splits.first().map_or(0, |s| s.x.ncols());
    check_consistent_length(&splits.iter().map(|s| s.x.ncols()).collect::<Vec<_>>())?;

    let mut split_col: Vec<&str> = Vec::new();
    let mut features: Vec<Vec<f64>> = vec![Vec::new(); n_features];
    let mut labels: Vec<i32> = Vec::new();
    let mut predicted: Vec<i32> = Vec::new();
    let mut scores: Vec<f64> = Vec::new();

    for s in splits {
        split_col.extend(std::iter::repeat(s.split.as_str()).take(s.x.nrows()));
        for (j, column) in s.x.columns().into_iter().enumerate() {
            features[j].extend(column.iter().copied());
        }
        labels.extend(s.y.iter().map(|&l| i32::from(l)));
        predicted.extend(s.y_pred.iter().map(|&l| i32::from(l)));
        scores.extend(s.scores.iter().copied());
    }

    let mut columns: Vec<Column> = vec![Series::new(PlSmallStr::from("split"), split_col).into()];
    for (j, values) in features.into_iter().enumerate() {
        columns.push(Series::new(PlSmallStr::from(format!("x{j}")), values).into());
    }
    columns.push(Series::new(PlSmallStr::from("label"), labels).into());
    columns.push(Series::new(PlSmallStr::from("predicted"), predicted).into());
    columns.push(Series::new(PlSmallStr::from("score"), scores).into());

    Ok(DataFrame::new(columns)?)
}

/// Writes [`scores_frame`] to `path` as CSV with a header row.
pub fn write_scores_csv(path: impl AsRef<Path>, splits: &[SplitScores<'_>]) -> Result<()> {
    let path = path.as_ref();
    let mut df = scores_frame(splits)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    info!("Wrote {} scored samples to {}", df.height(), path.display());
    Ok(())
}
