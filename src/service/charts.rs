//! Aggregations behind the two dashboard charts: a bar chart of records per
//! country and a pie chart of cost ranges.

use crate::db::SalesRecord;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Right-closed cost bins: (0,50], (50,100], (100,150], (150,200], (200,inf).
/// Serialized as its pie label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CostRange {
    UpTo50,
    UpTo100,
    UpTo150,
    UpTo200,
    Above200,
}

impl Serialize for CostRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl CostRange {
    pub const ALL: [CostRange; 5] = [
        CostRange::UpTo50,
        CostRange::UpTo100,
        CostRange::UpTo150,
        CostRange::UpTo200,
        CostRange::Above200,
    ];

    /// `None` for non-positive and NaN costs, which fall outside every bin.
    pub fn of(cost: f64) -> Option<Self> {
        if cost.is_nan() || cost <= 0.0 {
            return None;
        }
        Some(match cost {
            c if c <= 50.0 => CostRange::UpTo50,
            c if c <= 100.0 => CostRange::UpTo100,
            c if c <= 150.0 => CostRange::UpTo150,
            c if c <= 200.0 => CostRange::UpTo200,
            _ => CostRange::Above200,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            CostRange::UpTo50 => "0-50",
            CostRange::UpTo100 => "51-100",
            CostRange::UpTo150 => "101-150",
            CostRange::UpTo200 => "151-200",
            CostRange::Above200 => "200+",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostRangeSlice {
    pub range: CostRange,
    pub count: usize,
    /// Share of all binned records, 0..=100.
    pub percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Charts {
    pub country_distribution: Vec<CountryCount>,
    pub cost_ranges: Vec<CostRangeSlice>,
}

impl Charts {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        Self {
            country_distribution: country_distribution(records),
            cost_ranges: cost_ranges(records),
        }
    }
}

/// Records per country, most frequent first; ties by name.
pub fn country_distribution(records: &[SalesRecord]) -> Vec<CountryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.country.as_str()).or_default() += 1;
    }
    let mut out: Vec<CountryCount> = counts
        .into_iter()
        .map(|(country, count)| CountryCount {
            country: country.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));
    out
}

/// Non-empty cost bins, largest first; ties keep bin order.
pub fn cost_ranges(records: &[SalesRecord]) -> Vec<CostRangeSlice> {
    let mut counts = [0usize; CostRange::ALL.len()];
    for range in records.iter().filter_map(|r| CostRange::of(r.cost)) {
        counts[range as usize] += 1;
    }
    let total: usize = counts.iter().sum();

    let mut out: Vec<CostRangeSlice> = CostRange::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&range, count)| CostRangeSlice {
            range,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect();
    // stable sort keeps bin order among equal counts
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, country: &str, cost: f64) -> SalesRecord {
        SalesRecord {
            sales_id: id,
            customer_id: format!("C{id}"),
            country: country.into(),
            date: String::new(),
            cost,
        }
    }

    #[test]
    fn bin_edges_are_right_closed() {
        assert_eq!(CostRange::of(0.0), None);
        assert_eq!(CostRange::of(-3.0), None);
        assert_eq!(CostRange::of(f64::NAN), None);
        assert_eq!(CostRange::of(0.01), Some(CostRange::UpTo50));
        assert_eq!(CostRange::of(50.0), Some(CostRange::UpTo50));
        assert_eq!(CostRange::of(50.5), Some(CostRange::UpTo100));
        assert_eq!(CostRange::of(100.0), Some(CostRange::UpTo100));
        assert_eq!(CostRange::of(150.0), Some(CostRange::UpTo150));
        assert_eq!(CostRange::of(200.0), Some(CostRange::UpTo200));
        assert_eq!(CostRange::of(200.01), Some(CostRange::Above200));
        assert_eq!(CostRange::of(f64::INFINITY), Some(CostRange::Above200));
    }

    #[test]
    fn scenario_rows_land_in_expected_buckets() {
        assert_eq!(CostRange::of(40.0).map(CostRange::label), Some("0-50"));
        assert_eq!(CostRange::of(120.0).map(CostRange::label), Some("101-150"));
    }

    #[test]
    fn countries_sorted_by_count_then_name() {
        let records = vec![
            rec(1, "US", 1.0),
            rec(2, "DE", 1.0),
            rec(3, "US", 1.0),
            rec(4, "FR", 1.0),
        ];
        let dist = country_distribution(&records);
        let flat: Vec<(&str, usize)> = dist.iter().map(|c| (c.country.as_str(), c.count)).collect();
        assert_eq!(flat, vec![("US", 2), ("DE", 1), ("FR", 1)]);
    }

    #[test]
    fn cost_slices_skip_empty_bins_and_sum_to_100() {
        let records = vec![
            rec(1, "US", 40.0),
            rec(2, "US", 120.0),
            rec(3, "US", 130.0),
            rec(4, "US", 0.0),
        ];
        let slices = cost_ranges(&records);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].range, CostRange::UpTo150);
        assert_eq!(slices[0].count, 2);
        assert_eq!(slices[1].range, CostRange::UpTo50);
        let total: f64 = slices.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_empty_charts() {
        assert_eq!(Charts::from_records(&[]), Charts::default());
    }

    #[test]
    fn ranges_serialize_as_labels() {
        let labels: Vec<String> = CostRange::ALL
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        assert_eq!(
            labels,
            vec![r#""0-50""#, r#""51-100""#, r#""101-150""#, r#""151-200""#, r#""200+""#]
        );
    }
}
