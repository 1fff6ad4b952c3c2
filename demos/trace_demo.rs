//! Walker traces for an ensemble of AR(1) chains started far from the mode,
//! rendered with plotly into `trace_plot.html`.

use mcmc_corner::plan::PanelPayload;
use mcmc_corner::trace::{self, TraceConfig};
use mcmc_corner::SampleTensor;
use ndarray::Array3;
use plotly::common::{Line, Mode};
use plotly::layout::{GridPattern, LayoutGrid};
use plotly::{Layout, Plot, Scatter};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    const N_CHAINS: usize = 8;
    const N_STEPS: usize = 500;
    const N_DIMS: usize = 2;

    let noise = Normal::new(0.0, 0.3)?;
    let mut rng = SmallRng::seed_from_u64(42);
    let mut data = Array3::<f64>::zeros((N_CHAINS, N_STEPS, N_DIMS));
    for c in 0..N_CHAINS {
        for d in 0..N_DIMS {
            let mut x = 5.0 * (c as f64 - 3.5);
            for s in 0..N_STEPS {
                x = 0.95 * x + noise.sample(&mut rng);
                data[(c, s, d)] = x;
            }
        }
    }
    let samples = SampleTensor::new(data)?;
    let plan = trace::build(&samples, Some(&["mu", "tau"][..]), &TraceConfig::default())?;

    let mut plot = Plot::new();
    for panel in &plan.panels {
        let PanelPayload::Trace { chains, aggregate } = &panel.payload else {
            continue;
        };
        let suffix = if panel.row == 0 {
            String::new()
        } else {
            (panel.row + 1).to_string()
        };
        for series in chains.iter().chain(std::iter::once(aggregate)) {
            let steps: Vec<usize> = (0..series.values.len()).collect();
            plot.add_trace(
                Scatter::new(steps, series.values.clone())
                    .mode(Mode::Lines)
                    .name(series.name.as_str())
                    .opacity(series.style.alpha)
                    .line(
                        Line::new()
                            .color(series.style.color.clone())
                            .width(series.style.width),
                    )
                    .x_axis(format!("x{suffix}").as_str())
                    .y_axis(format!("y{suffix}").as_str())
                    .show_legend(false),
            );
        }
    }
    plot.set_layout(
        Layout::new()
            .grid(
                LayoutGrid::new()
                    .rows(plan.rows)
                    .columns(1)
                    .pattern(GridPattern::Independent),
            )
            .width(1000)
            .height(600)
            .title("Walker traces"),
    );
    plot.write_html("trace_plot.html");
    println!("Saved walker traces to trace_plot.html");
    Ok(())
}
