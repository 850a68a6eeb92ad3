use serde::Serialize;

use crate::record::PoemRecord;
use crate::taxonomy::{RegionId, TaxonomyCatalog};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CorrelationCell {
    pub region_a: RegionId,
    pub region_b: RegionId,
    pub coefficient: f64,
    /// Absolute coefficient, for significance shading.
    pub significance: f64,
}

/// Full ordered region × region matrix, row-major in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub size: usize,
    pub cells: Vec<CorrelationCell>,
}

impl CorrelationMatrix {
    pub fn coefficient(&self, a: RegionId, b: RegionId) -> f64 {
        self.cells[a.0 as usize * self.size + b.0 as usize].coefficient
    }
}

/// Pairwise Pearson correlation between regions' per-period mean
/// emotion-weight vectors (one scalar per chronological period, zero for
/// periods where a region has no records). Self-pairs are exactly 1.0; a
/// zero-variance vector on either side yields 0.0 rather than NaN.
pub fn correlation_matrix(catalog: &TaxonomyCatalog, records: &[PoemRecord]) -> CorrelationMatrix {
    let region_count = catalog.regions().len();
    let period_count = catalog.periods().len();

    let mut sums = vec![vec![0.0f64; period_count]; region_count];
    let mut counts = vec![vec![0u64; period_count]; region_count];
    for record in records {
        let region = record.region.0 as usize;
        let period = record.period.0 as usize;
        sums[region][period] += record.emotion.weight();
        counts[region][period] += 1;
    }

    let score_vectors: Vec<Vec<f64>> = (0..region_count)
        .map(|region| {
            (0..period_count)
                .map(|period| {
                    if counts[region][period] > 0 {
                        sums[region][period] / counts[region][period] as f64
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();
    let region_totals: Vec<u64> = counts.iter().map(|row| row.iter().sum()).collect();

    let mut cells = Vec::with_capacity(region_count * region_count);
    for a in 0..region_count {
        for b in 0..region_count {
            let coefficient = if a == b {
                1.0
            } else if region_totals[a] == 0 || region_totals[b] == 0 {
                0.0
            } else {
                pearson(&score_vectors[a], &score_vectors[b])
            };
            cells.push(CorrelationCell {
                region_a: RegionId(a as u16),
                region_b: RegionId(b as u16),
                coefficient,
                significance: coefficient.abs(),
            });
        }
    }

    CorrelationMatrix {
        size: region_count,
        cells,
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n == 0 {
        return 0.0;
    }
    let n_f = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n_f * sum_xy - sum_x * sum_y;
    let denominator = ((n_f * sum_x2 - sum_x * sum_x) * (n_f * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, GeneratorConfig};

    #[test]
    fn pearson_identity_and_inverse() {
        let x = [0.1, 0.4, -0.2, 0.8];
        let inverted: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!((pearson(&x, &x) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &inverted) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_zero_variance_is_zero() {
        let flat = [0.5, 0.5, 0.5];
        let varied = [0.1, 0.2, 0.3];
        assert_eq!(pearson(&flat, &varied), 0.0);
        assert_eq!(pearson(&varied, &flat), 0.0);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let catalog = TaxonomyCatalog::builtin();
        let config = GeneratorConfig {
            total_records: 3_000,
            seed: 55,
            ..GeneratorConfig::default()
        };
        let set = generate(catalog, &config).expect("generation");
        let matrix = correlation_matrix(catalog, &set.records);
        assert_eq!(matrix.size, catalog.regions().len());
        assert_eq!(matrix.cells.len(), matrix.size * matrix.size);

        for a in catalog.region_ids() {
            assert_eq!(matrix.coefficient(a, a), 1.0);
            for b in catalog.region_ids() {
                let forward = matrix.coefficient(a, b);
                let backward = matrix.coefficient(b, a);
                assert!(
                    (forward - backward).abs() < 1e-12,
                    "corr({a:?},{b:?}) = {forward} vs {backward}"
                );
                assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(&forward));
            }
        }
    }

    #[test]
    fn empty_records_yield_zero_off_diagonal() {
        let catalog = TaxonomyCatalog::builtin();
        let matrix = correlation_matrix(catalog, &[]);
        for cell in &matrix.cells {
            if cell.region_a == cell.region_b {
                assert_eq!(cell.coefficient, 1.0);
            } else {
                assert_eq!(cell.coefficient, 0.0);
            }
        }
    }
}
