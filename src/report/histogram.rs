//! Equal-width rating histogram. Bins span [min, max] of the observed ratings;
//! every bin is half-open except the last, which also holds the maximum.

use polars::prelude::*;
use serde::Serialize;

use crate::error::PipelineResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingHistogram {
    pub bins: Vec<HistogramBin>,
}

impl RatingHistogram {
    pub fn from_values(values: &[i32], bins: usize) -> Self {
        let bins = bins.max(1);
        let (Some(&lo), Some(&hi)) = (values.iter().min(), values.iter().max()) else {
            return RatingHistogram::default();
        };
        // A single distinct value gets a unit-wide range centred on it.
        let (lo, hi) = if lo == hi { (lo as f64 - 0.5, hi as f64 + 0.5) } else { (lo as f64, hi as f64) };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0u64; bins];
        for &v in values {
            let idx = (((v as f64) - lo) / width).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: lo + width * i as f64,
                end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
                count,
            })
            .collect();
        RatingHistogram { bins }
    }

    pub fn from_column(column: &Column, bins: usize) -> PipelineResult<Self> {
        let ratings = column.cast(&DataType::Int32)?;
        let values: Vec<i32> = ratings.i32()?.into_iter().flatten().collect();
        Ok(Self::from_values(&values, bins))
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_value_once() {
        let values: Vec<i32> = (0..1000).map(|i| 800 + i * 2).collect();
        let h = RatingHistogram::from_values(&values, 50);
        assert_eq!(h.bins.len(), 50);
        assert_eq!(h.total(), 1000);
        assert_eq!(h.bins[0].start, 800.0);
        assert_eq!(h.bins[49].end, 2798.0);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let h = RatingHistogram::from_values(&[1000, 1500, 2000], 2);
        assert_eq!(h.bins[0].count, 1);
        assert_eq!(h.bins[1].count, 2);
    }

    #[test]
    fn zero_filled_ratings_are_counted() {
        let h = RatingHistogram::from_values(&[0, 0, 1600, 2000], 4);
        assert_eq!(h.bins[0].count, 2);
        assert_eq!(h.max_count(), 2);
    }

    #[test]
    fn single_value_and_empty_input() {
        let h = RatingHistogram::from_values(&[1500, 1500], 10);
        assert_eq!(h.total(), 2);
        assert_eq!(h.bins.len(), 10);
        assert!(RatingHistogram::from_values(&[], 10).bins.is_empty());
    }

    #[test]
    fn from_column_reads_ratings() {
        let c = Column::new("WhiteElo".into(), &[1200i32, 1400, 1600]);
        let h = RatingHistogram::from_column(&c, 3).unwrap();
        assert_eq!(h.total(), 3);
    }
}
