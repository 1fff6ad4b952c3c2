/*!
Declarative draw plans.

A [`DrawPlan`] says what every panel of a figure shows and how its axes are
scaled, without touching any graphics library. A renderer walks
[`DrawPlan::panels`], positions each one at `(row, col)` in a `rows × cols`
grid, and draws the payload: bars for marginal histograms, a heatmap plus
contour lines for joint histograms, one line per chain for traces. Grid cells
with no panel (the upper triangle of a corner plot) are left blank.

Plans serialize with `serde`, so non-Rust renderers can consume
[`DrawPlan::to_json`].
*/

use serde::{Deserialize, Serialize};

use crate::contour::ContourLevelSet;
use crate::density::{Histogram1D, Histogram2D};
use crate::error::{PlotError, Result, Warning};
use crate::range::DimensionRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotKind {
    Corner,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    Diagonal,
    OffDiagonal,
    TraceLine,
}

/// How a joint histogram should be painted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointStyle {
    /// Rectangular heatmap of the bins.
    #[default]
    Histogram,
    /// Hexagonal binning with roughly half as many cells per axis.
    Hexbin,
}

/// Fill and outline of a marginal histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramStyle {
    pub fill_color: String,
    /// `None` draws no outline.
    pub edge_color: Option<String>,
}

impl Default for HistogramStyle {
    fn default() -> Self {
        Self {
            fill_color: "#1f77b4".to_string(),
            edge_color: None,
        }
    }
}

impl HistogramStyle {
    pub fn set_fill_color(mut self, color: &str) -> Self {
        self.fill_color = color.to_string();
        self
    }

    pub fn set_edge_color(mut self, color: &str) -> Self {
        self.edge_color = Some(color.to_string());
        self
    }
}

/// Color map used for joint histograms when none is chosen.
pub const DEFAULT_COLOR_MAP: &str = "viridis";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// `None` lets the renderer autoscale (e.g. the density axis of a marginal).
    pub range: Option<DimensionRange>,
    pub label: Option<String>,
    pub tick_labels: bool,
}

impl AxisSpec {
    pub fn new(range: Option<DimensionRange>) -> Self {
        Self {
            range,
            label: None,
            tick_labels: false,
        }
    }

    /// Shows tick labels, and the axis label when one is given.
    pub fn outer(mut self, label: Option<&str>) -> Self {
        self.label = label.map(str::to_owned);
        self.tick_labels = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub alpha: f64,
    pub width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            alpha: 0.3,
            width: 1.0,
        }
    }
}

impl LineStyle {
    pub fn set_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn set_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn set_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
}

/// One polyline; `values[k]` is plotted at step `k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelPayload {
    Marginal {
        histogram: Histogram1D,
        style: HistogramStyle,
    },
    Joint {
        histogram: Histogram2D,
        contours: ContourLevelSet,
        style: JointStyle,
        /// Name of the color map for the cell values, e.g. `"viridis"`.
        color_map: String,
    },
    Trace {
        /// One series per chain, in chain order.
        chains: Vec<LineSeries>,
        aggregate: LineSeries,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub row: usize,
    pub col: usize,
    pub kind: PanelKind,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub payload: PanelPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    pub kind: PlotKind,
    pub rows: usize,
    pub cols: usize,
    pub labels: Vec<String>,
    pub panels: Vec<Panel>,
    pub warnings: Vec<Warning>,
}

impl DrawPlan {
    pub fn panel(&self, row: usize, col: usize) -> Option<&Panel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }

    pub fn panels_of(&self, kind: PanelKind) -> impl Iterator<Item = &Panel> + '_ {
        self.panels.iter().filter(move |p| p.kind == kind)
    }

    pub fn diagonal_panels(&self) -> impl Iterator<Item = &Panel> + '_ {
        self.panels_of(PanelKind::Diagonal)
    }

    pub fn off_diagonal_panels(&self) -> impl Iterator<Item = &Panel> + '_ {
        self.panels_of(PanelKind::OffDiagonal)
    }

    pub fn trace_panels(&self) -> impl Iterator<Item = &Panel> + '_ {
        self.panels_of(PanelKind::TraceLine)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Labels for each dimension, falling back to `"dim 0"`, `"dim 1"`, ….
pub fn resolve_labels<S: AsRef<str>>(labels: Option<&[S]>, n_dims: usize) -> Result<Vec<String>> {
    match labels {
        None => Ok((0..n_dims).map(|i| format!("dim {i}")).collect()),
        Some(labels) if labels.len() != n_dims => Err(PlotError::DimensionMismatch {
            what: "dimension labels",
            expected: n_dims,
            got: labels.len(),
        }),
        Some(labels) => Ok(labels.iter().map(|l| l.as_ref().to_owned()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_labels() {
        let labels = resolve_labels::<&str>(None, 3).unwrap();
        assert_eq!(labels, vec!["dim 0", "dim 1", "dim 2"]);
    }

    #[test]
    fn test_label_count_must_match() {
        let err = resolve_labels(Some(&["a", "b"][..]), 3).unwrap_err();
        assert!(matches!(
            err,
            PlotError::DimensionMismatch {
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_histogram_style_builder() {
        let style = HistogramStyle::default();
        assert_eq!(style.edge_color, None);
        let style = style.set_fill_color("grey").set_edge_color("black");
        assert_eq!(style.fill_color, "grey");
        assert_eq!(style.edge_color.as_deref(), Some("black"));
    }

    #[test]
    fn test_line_style_builder() {
        let style = LineStyle::default().set_color("red").set_alpha(1.0);
        assert_eq!(style.color, "red");
        assert_eq!(style.alpha, 1.0);
        assert_eq!(style.width, 1.0);
    }
}
