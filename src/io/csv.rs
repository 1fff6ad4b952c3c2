/*!
# CSV Sample Files

Saves and loads [`SampleTensor`]s in long format. Enable via the `csv` feature.

The file has a header row `chain,sample,dim_0,dim_1,…` and one row per
(chain, step) pair. Rows may appear in any order, but every chain must cover
the same contiguous step indices `0..steps`.
*/

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use csv::{Reader, Writer};
use ndarray::Axis;

use crate::error::{PlotError, Result};
use crate::tensor::SampleTensor;

/**
Saves samples as a CSV file.

# Examples

```rust
use mcmc_corner::io::csv::save_csv;
use mcmc_corner::tensor::SampleTensor;
use ndarray::arr3;

let samples = SampleTensor::new(arr3(&[[[1.0, 2.0], [3.0, 4.0]]]))?;
let path = std::env::temp_dir().join("mcmc_corner_doc.csv");
save_csv(&samples, &path)?;
# Ok::<(), mcmc_corner::error::PlotError>(())
```
*/
pub fn save_csv<P: AsRef<Path>>(samples: &SampleTensor, path: P) -> Result<()> {
    let mut wtr = Writer::from_writer(File::create(path)?);

    let mut header: Vec<String> = vec!["chain".to_string(), "sample".to_string()];
    header.extend((0..samples.n_dims()).map(|i| format!("dim_{}", i)));
    wtr.write_record(&header)?;

    for (chain_idx, chain) in samples.view().axis_iter(Axis(0)).enumerate() {
        for (sample_idx, sample) in chain.axis_iter(Axis(0)).enumerate() {
            let mut row = vec![chain_idx.to_string(), sample_idx.to_string()];
            row.extend(sample.iter().map(|v| v.to_string()));
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Loads samples written by [`save_csv`] (or any file in the same layout).
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<SampleTensor> {
    let mut rdr = Reader::from_reader(File::open(path)?);
    let headers = rdr.headers()?.clone();
    if headers.len() < 3 || &headers[0] != "chain" || &headers[1] != "sample" {
        return Err(PlotError::Parse(format!(
            "expected header `chain,sample,dim_0,...`, got `{}`",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }
    let n_dims = headers.len() - 2;

    let mut chains: BTreeMap<usize, BTreeMap<usize, Vec<f64>>> = BTreeMap::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let index = |col: usize| -> Result<usize> {
            record[col].trim().parse().map_err(|_| {
                PlotError::Parse(format!("row {}: bad index `{}`", line + 1, &record[col]))
            })
        };
        let (chain, step) = (index(0)?, index(1)?);
        let values = (2..2 + n_dims)
            .map(|col| {
                record[col].trim().parse::<f64>().map_err(|_| {
                    PlotError::Parse(format!("row {}: bad value `{}`", line + 1, &record[col]))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if chains.entry(chain).or_default().insert(step, values).is_some() {
            return Err(PlotError::Parse(format!(
                "row {}: duplicate chain {chain}, sample {step}",
                line + 1
            )));
        }
    }

    let mut nested = Vec::with_capacity(chains.len());
    for (expected, (chain, steps)) in chains.into_iter().enumerate() {
        if chain != expected {
            return Err(PlotError::RaggedSamples(format!("chain {expected} is missing")));
        }
        if let Some(step) = steps.keys().enumerate().find_map(|(i, &s)| (i != s).then_some(i)) {
            return Err(PlotError::RaggedSamples(format!(
                "chain {chain} is missing sample {step}"
            )));
        }
        nested.push(steps.into_values().collect::<Vec<_>>());
    }
    SampleTensor::from_nested(&nested)
}
