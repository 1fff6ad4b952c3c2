//! Builds a corner plan for a correlated 3-D Gaussian ensemble and renders it
//! with plotly, writing `corner_plot.html`.
//!
//! Diagonal panels become bar charts, joint panels become heatmaps overlaid with
//! their highest-density regions (each cell coloured by how many credible
//! thresholds it clears).

use mcmc_corner::corner::{self, CornerConfig};
use mcmc_corner::density::Histogram1D;
use mcmc_corner::plan::{DrawPlan, HistogramStyle, PanelPayload};
use mcmc_corner::SampleTensor;
use ndarray::{Array1, Array3};
use plotly::common::{ColorScale, ColorScalePalette, Line, Marker, Mode};
use plotly::layout::{GridPattern, LayoutGrid};
use plotly::{Bar, HeatMap, Layout, Plot, Scatter};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use std::error::Error;

fn centres(edges: &Array1<f64>) -> Vec<f64> {
    edges.windows(2).into_iter().map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Plotly's subplot axis names: "x", "x2", "x3", …
fn axis_name(prefix: &str, index: usize) -> String {
    if index == 1 {
        prefix.to_string()
    } else {
        format!("{prefix}{index}")
    }
}

/// Plotly palette closest to a named color map.
fn color_scale(name: &str) -> ColorScale {
    let palette = match name {
        "viridis" => ColorScalePalette::Viridis,
        "cividis" => ColorScalePalette::Cividis,
        "greys" | "gray" => ColorScalePalette::Greys,
        "blues" => ColorScalePalette::Blues,
        "hot" => ColorScalePalette::Hot,
        _ => ColorScalePalette::Viridis,
    };
    ColorScale::Palette(palette)
}

fn marginal_trace(
    hist: &Histogram1D,
    style: &HistogramStyle,
    xa: &str,
    ya: &str,
) -> Box<Bar<f64, f64>> {
    let mut marker = Marker::new().color(style.fill_color.clone());
    if let Some(edge) = &style.edge_color {
        marker = marker.line(Line::new().color(edge.clone()).width(1.0));
    }
    Bar::new(centres(&hist.edges), hist.values.to_vec())
        .marker(marker)
        .x_axis(xa)
        .y_axis(ya)
        .show_legend(false)
}

fn render(plan: &DrawPlan, filename: &str) {
    let mut plot = Plot::new();
    for panel in &plan.panels {
        let cell = panel.row * plan.cols + panel.col + 1;
        let (xa, ya) = (axis_name("x", cell), axis_name("y", cell));
        match &panel.payload {
            PanelPayload::Marginal { histogram, style } => {
                plot.add_trace(marginal_trace(histogram, style, &xa, &ya))
            }
            PanelPayload::Joint {
                histogram,
                contours,
                color_map,
                ..
            } => {
                let (nx, ny) = histogram.shape();
                let z: Vec<Vec<f64>> = (0..ny)
                    .map(|j| (0..nx).map(|i| histogram.values[(i, j)]).collect())
                    .collect();
                plot.add_trace(
                    HeatMap::new(centres(&histogram.x_edges), centres(&histogram.y_edges), z)
                        .x_axis(&xa)
                        .y_axis(&ya)
                        .color_scale(color_scale(color_map))
                        .show_scale(false),
                );

                // Outline of each credible region as the cells on its boundary.
                for (level, threshold) in contours.drawable() {
                    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..nx)
                        .flat_map(|i| (0..ny).map(move |j| (i, j)))
                        .filter(|&(i, j)| histogram.values[(i, j)] >= threshold)
                        .map(|(i, j)| {
                            (
                                0.5 * (histogram.x_edges[i] + histogram.x_edges[i + 1]),
                                0.5 * (histogram.y_edges[j] + histogram.y_edges[j + 1]),
                            )
                        })
                        .unzip();
                    plot.add_trace(
                        Scatter::new(xs, ys)
                            .mode(Mode::Markers)
                            .name(format!("{:.0}%", level * 100.0).as_str())
                            .x_axis(&xa)
                            .y_axis(&ya)
                            .show_legend(false),
                    );
                }
            }
            PanelPayload::Trace { .. } => {}
        }
    }

    let layout = Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(plan.rows)
                .columns(plan.cols)
                .pattern(GridPattern::Independent),
        )
        .width(1000)
        .height(1000)
        .title("Corner plot");
    plot.set_layout(layout);
    plot.write_html(filename);
}

fn main() -> Result<(), Box<dyn Error>> {
    const N_CHAINS: usize = 16;
    const N_STEPS: usize = 2_000;
    const SEED: u64 = 42;

    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut data = Array3::<f64>::zeros((N_CHAINS, N_STEPS, 3));
    for c in 0..N_CHAINS {
        for s in 0..N_STEPS {
            let z: [f64; 3] = [
                StandardNormal.sample(&mut rng),
                StandardNormal.sample(&mut rng),
                StandardNormal.sample(&mut rng),
            ];
            data[(c, s, 0)] = z[0];
            data[(c, s, 1)] = 0.8 * z[0] + 0.6 * z[1];
            data[(c, s, 2)] = 1.0 + 0.3 * z[2] - 0.2 * z[0];
        }
    }
    let samples = SampleTensor::new(data)?;

    let config = CornerConfig::default().set_bins(40);
    let plan = corner::build(&samples, Some(&["alpha", "beta", "gamma"][..]), &config)?;
    println!(
        "Built corner plan with {} panels, {} warnings",
        plan.panels.len(),
        plan.warnings.len()
    );

    render(&plan, "corner_plot.html");
    println!("Saved corner plot to corner_plot.html");
    Ok(())
}
