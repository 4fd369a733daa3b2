use std::collections::BTreeMap;

use anyhow::Result;

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::math::stats::{mean, median, min_max, round2, sample_std};
use crate::schema::v1::{FrequencyRow, Population, PopulationSummary, Sample};

/// Relative frequency of each population within one sample.
///
/// Missing counts are zero. A sample with no counted cells still yields five
/// rows at 0%.
pub fn sample_frequencies(sample: &Sample) -> Vec<FrequencyRow> {
    let total = sample.total_count();
    Population::ALL
        .iter()
        .map(|&population| {
            let count = sample.count(population).unwrap_or(0);
            let percentage = if total > 0 {
                round2(count as f64 / total as f64 * 100.0)
            } else {
                0.0
            };
            FrequencyRow {
                sample: sample.sample.clone(),
                total_count: total,
                population,
                count,
                percentage,
            }
        })
        .collect()
}

/// Frequency rows for every sample, in input order. `threads == 0` lets rayon
/// pick the pool size.
pub fn compute_frequencies(samples: &[Sample], threads: usize) -> Result<Vec<FrequencyRow>> {
    #[cfg(feature = "mt")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        let per_sample: Vec<Vec<FrequencyRow>> =
            pool.install(|| samples.par_iter().map(sample_frequencies).collect());
        Ok(per_sample.into_iter().flatten().collect())
    }

    #[cfg(not(feature = "mt"))]
    {
        let _ = threads;
        Ok(samples.iter().flat_map(sample_frequencies).collect())
    }
}

/// Mean/std/min/max/median of the percentage column per population.
pub fn summary_statistics(rows: &[FrequencyRow]) -> Vec<PopulationSummary> {
    let mut by_population: BTreeMap<Population, Vec<f64>> = BTreeMap::new();
    for row in rows {
        by_population
            .entry(row.population)
            .or_default()
            .push(row.percentage);
    }

    by_population
        .into_iter()
        .map(|(population, mut values)| {
            let (min, max) = min_max(&values);
            PopulationSummary {
                population,
                mean: round2(mean(&values)),
                std: round2(sample_std(&values)),
                min: round2(min),
                max: round2(max),
                median: round2(median(&mut values)),
            }
        })
        .collect()
}
