// ============================================================
// Layer 4 — IQR Outlier Filter
// ============================================================
// Removes rows whose value in a configured numeric column lies
// outside that column's interquartile-range band:
//
//   IQR  = Q3 - Q1
//   band = [Q1 - k·IQR, Q3 + k·IQR]     (inclusive)
//
// k = 1.5 is the conventional "mild outlier" threshold.
//
// Columns are processed one after another, and each column's
// quartiles are computed over the rows that survived the
// previous columns. The result therefore depends on the order
// of `columns`; with the default order this matches one
// sequential cleaning pass over carat, depth, table, x, y, z.
//
// Quartiles use linear interpolation between closest ranks,
// the same definition pandas uses for `Series.quantile`.
//
// A zero-variance column (Q1 == Q3) yields a zero-width band
// and keeps only rows equal to that value. This is expected.
//
// NaN values are ignored when computing quartiles, as pandas
// does, and a NaN row never falls inside a band: it is removed
// by the first configured column in which it is NaN.
//
// Reference: Tukey (1977) Exploratory Data Analysis

use crate::data::dataset::Dataset;
use crate::domain::diamond::{NumericColumn, NumericRow};

/// Inclusive lower/upper bound of one column's IQR band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBand {
    pub lower: f64,
    pub upper: f64,
}

impl IqrBand {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
}

/// Quantile `q` in [0, 1] of the non-NaN `values` with linear
/// interpolation. Returns None when there are no such values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    // Position in the sorted array, e.g. q=0.25 over 5 values → 1.0
    let pos   = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo    = pos.floor() as usize;
    let hi    = pos.ceil() as usize;
    let frac  = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// IQR band of `values` for multiplier `k`
pub fn iqr_band(values: &[f64], k: f64) -> Option<IqrBand> {
    let q1  = quantile(values, 0.25)?;
    let q3  = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some(IqrBand { lower: q1 - k * iqr, upper: q3 + k * iqr })
}

/// Filter `dataset` in place, column by column.
/// Returns the total number of rows removed.
pub fn filter<R: NumericRow>(
    dataset:        &mut Dataset<R>,
    columns:        &[NumericColumn],
    iqr_multiplier: f64,
) -> usize {
    let initial = dataset.len();

    for &column in columns {
        let values: Vec<f64> = dataset.rows().iter().map(|r| r.numeric(column)).collect();

        // No band when every value is NaN (or there are no rows):
        // only the NaN rows go
        let Some(band) = iqr_band(&values, iqr_multiplier) else {
            let dropped = dataset.retain(|r| !r.numeric(column).is_nan());
            tracing::debug!("Outlier column '{}': no quartiles, dropped {} NaN rows", column, dropped);
            continue;
        };

        let dropped = dataset.retain(|r| band.contains(r.numeric(column)));
        tracing::debug!(
            "Outlier column '{}': band [{:.4}, {:.4}], dropped {} rows",
            column, band.lower, band.upper, dropped
        );
    }

    let removed = initial - dataset.len();
    tracing::info!("Outlier cleaning finished: {} rows removed", removed);
    removed
}
