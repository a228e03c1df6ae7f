// Univariate statistics over a single extracted column
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;

use crate::data::Value;
use super::ModelError;

/// An owned, immutable snapshot of one column's values, extracted from a
/// table via `Table::list`. Univariate analysis is performed on a
/// `Series`: count, sum, min/max, mean, percentile, unique, mode,
/// variance, standard deviation and correlation.
///
/// Null and NaN entries are "missing". The numeric value `0` is present:
/// a naive falsy check would drop zeros and skew every statistic, so the
/// missing test is always `Value::is_missing`.
#[derive(Debug, Clone, Default)]
pub struct Series {
    values: Vec<Value>,
}

impl Series {
    /// Create a series from raw values, missing entries included.
    pub fn new(values: Vec<Value>) -> Self {
        Series { values }
    }

    /// Total number of entries, missing values included.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw entries, missing values included.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// A new series holding the non-missing entries only. Duplicates are
    /// kept; zeros are kept.
    pub fn values(&self) -> Series {
        Series {
            values: self
                .values
                .iter()
                .filter(|v| !v.is_missing())
                .cloned()
                .collect(),
        }
    }

    /// Distinct non-missing entries, in first-seen order.
    pub fn unique(&self) -> Series {
        let mut seen: HashMap<String, ()> = HashMap::new();
        let mut out = Vec::new();
        for v in self.values.iter().filter(|v| !v.is_missing()) {
            if seen.insert(v.canonical_key(), ()).is_none() {
                out.push(v.clone());
            }
        }
        Series { values: out }
    }

    /// The type of the series, taken from its first entry. Returns
    /// "undefined" for an empty series.
    pub fn type_name(&self) -> &'static str {
        match self.values.first() {
            Some(v) => v.type_name(),
            None => "undefined",
        }
    }

    /// Numeric entries as f64, missing and non-numeric entries skipped.
    fn numeric(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| v.as_f64()).collect()
    }

    /// Sum of the numeric entries; 0.0 when there are none.
    pub fn sum(&self) -> f64 {
        self.numeric().iter().sum()
    }

    /// Smallest non-missing entry, or None on an empty series.
    pub fn min(&self) -> Option<Value> {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .cloned()
            .min_by(|a, b| a.compare(b))
    }

    /// Largest non-missing entry, or None on an empty series.
    pub fn max(&self) -> Option<Value> {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .cloned()
            .max_by(|a, b| a.compare(b))
    }

    /// Mean of the numeric entries, or None when there are none.
    pub fn mean(&self) -> Option<f64> {
        let nums = self.numeric();
        if nums.is_empty() {
            return None;
        }
        Some(nums.iter().sum::<f64>() / nums.len() as f64)
    }

    /// Nearest-rank percentile over the non-missing entries, sorted
    /// ascending: index = round((len - 1) * p / 100). None when empty.
    pub fn percentile(&self, percentile: f64) -> Option<Value> {
        let mut sorted: Vec<Value> = self
            .values
            .iter()
            .filter(|v| !v.is_missing())
            .cloned()
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.compare(b));

        let pos = (sorted.len() - 1) as f64 * (percentile / 100.0);
        let idx = (pos + 0.5).floor() as usize;
        sorted.get(idx.min(sorted.len() - 1)).cloned()
    }

    /// The most frequent value(s), ties included, sorted ascending.
    /// Returns None on an empty series, and None when more than 5 values
    /// tie for the mode (a tie list that long is not meaningful).
    pub fn mode(&self) -> Option<Vec<Value>> {
        let mut counts: HashMap<String, (Value, usize)> = HashMap::new();
        for v in self.values.iter().filter(|v| !v.is_missing()) {
            counts
                .entry(v.canonical_key())
                .or_insert_with(|| (v.clone(), 0))
                .1 += 1;
        }

        let highest = counts.values().map(|(_, c)| *c).max()?;
        let mut result: Vec<Value> = counts
            .into_values()
            .filter(|(_, c)| *c == highest)
            .map(|(v, _)| v)
            .collect();
        result.sort_by(|a, b| a.compare(b));

        if result.len() <= 5 {
            Some(result)
        } else {
            None
        }
    }

    /// Sample variance of the numeric entries (divisor n - 1). None when
    /// fewer than two numeric entries exist.
    pub fn variance(&self) -> Option<f64> {
        let nums = self.numeric();
        if nums.len() < 2 {
            return None;
        }
        let mean = nums.iter().sum::<f64>() / nums.len() as f64;
        let sum_squared_deviations: f64 = nums.iter().map(|x| (x - mean).powi(2)).sum();
        Some(sum_squared_deviations / (nums.len() - 1) as f64)
    }

    /// Sample standard deviation; None when the variance is undefined.
    pub fn std(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Pearson correlation with another series, via standardized-score
    /// products. Both series must have the same `count()`; entries are
    /// paired positionally and a pair is excluded when either side is
    /// missing. The result is rounded to 3 decimal places.
    pub fn corr(&self, other: &Series) -> Result<f64, ModelError> {
        if self.count() != other.count() {
            return Err(ModelError::SeriesLengthMismatch {
                left: self.count(),
                right: other.count(),
            });
        }

        let x_mean = self.mean();
        let x_std = self.std();
        let y_mean = other.mean();
        let y_std = other.std();

        let (x_mean, x_std, y_mean, y_std) = match (x_mean, x_std, y_mean, y_std) {
            (Some(xm), Some(xs), Some(ym), Some(ys)) if xs > 0.0 && ys > 0.0 => {
                (xm, xs, ym, ys)
            },
            _ => {
                return Err(ModelError::InvalidArgument(
                    "correlation requires two numeric, non-constant series".to_string(),
                ));
            },
        };

        let mut numerator = 0.0;
        let mut pairs = 0usize;
        for (xv, yv) in self.values.iter().zip(other.values.iter()) {
            if let (Some(x), Some(y)) = (xv.as_f64(), yv.as_f64()) {
                numerator += ((x - x_mean) / x_std) * ((y - y_mean) / y_std);
                pairs += 1;
            }
        }

        if pairs < 2 {
            return Err(ModelError::InvalidArgument(
                "correlation requires at least two complete pairs".to_string(),
            ));
        }

        let corr = numerator / (pairs - 1) as f64;
        Ok((corr * 1000.0).round() / 1000.0)
    }
}

impl From<Vec<Value>> for Series {
    fn from(values: Vec<Value>) -> Self {
        Series::new(values)
    }
}
