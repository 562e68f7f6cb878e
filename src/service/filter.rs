use crate::db::SalesRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Distinct values observed per filter dimension, in first-seen order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FilterOptions {
    pub sales_ids: Vec<i64>,
    pub customer_ids: Vec<String>,
    pub countries: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        fn push_unique<T: Clone + Eq + std::hash::Hash>(
            seen: &mut HashSet<T>,
            out: &mut Vec<T>,
            value: &T,
        ) {
            if seen.insert(value.clone()) {
                out.push(value.clone());
            }
        }

        let mut opts = Self::default();
        let (mut ids, mut customers, mut countries) =
            (HashSet::new(), HashSet::new(), HashSet::new());
        for r in records {
            push_unique(&mut ids, &mut opts.sales_ids, &r.sales_id);
            push_unique(&mut customers, &mut opts.customer_ids, &r.customer_id);
            push_unique(&mut countries, &mut opts.countries, &r.country);
        }
        opts
    }
}

/// Allowed values per dimension. An empty set excludes everything.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Selection {
    pub sales_ids: Vec<i64>,
    pub customer_ids: Vec<String>,
    pub countries: Vec<String>,
}

impl Selection {
    /// Everything observed: the default state, showing the full dataset.
    pub fn all(options: &FilterOptions) -> Self {
        Self {
            sales_ids: options.sales_ids.clone(),
            customer_ids: options.customer_ids.clone(),
            countries: options.countries.clone(),
        }
    }
}

/// Selection as sent by a client. An omitted dimension means
/// "all observed values"; an explicit empty list means none.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionRequest {
    pub sales_ids: Option<Vec<i64>>,
    pub customer_ids: Option<Vec<String>>,
    pub countries: Option<Vec<String>>,
}

impl SelectionRequest {
    pub fn resolve(self, options: &FilterOptions) -> Selection {
        Selection {
            sales_ids: self.sales_ids.unwrap_or_else(|| options.sales_ids.clone()),
            customer_ids: self
                .customer_ids
                .unwrap_or_else(|| options.customer_ids.clone()),
            countries: self.countries.unwrap_or_else(|| options.countries.clone()),
        }
    }
}

/// Keep the records whose id, customer and country are all selected.
pub fn filter(
    records: &[SalesRecord],
    sales_ids: &[i64],
    customer_ids: &[String],
    countries: &[String],
) -> Vec<SalesRecord> {
    let ids: HashSet<i64> = sales_ids.iter().copied().collect();
    let customers: HashSet<&str> = customer_ids.iter().map(String::as_str).collect();
    let countries: HashSet<&str> = countries.iter().map(String::as_str).collect();

    records
        .iter()
        .filter(|r| {
            ids.contains(&r.sales_id)
                && customers.contains(r.customer_id.as_str())
                && countries.contains(r.country.as_str())
        })
        .cloned()
        .collect()
}

pub fn apply(records: &[SalesRecord], selection: &Selection) -> Vec<SalesRecord> {
    filter(
        records,
        &selection.sales_ids,
        &selection.customer_ids,
        &selection.countries,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, customer: &str, country: &str, cost: f64) -> SalesRecord {
        SalesRecord {
            sales_id: id,
            customer_id: customer.into(),
            country: country.into(),
            date: String::new(),
            cost,
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            rec(1, "C1", "US", 40.0),
            rec(2, "C2", "US", 120.0),
            rec(3, "C1", "DE", 75.0),
            rec(4, "C3", "FR", 210.0),
        ]
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn options_keep_first_seen_order() {
        let opts = FilterOptions::from_records(&sample());
        assert_eq!(opts.sales_ids, vec![1, 2, 3, 4]);
        assert_eq!(opts.customer_ids, strings(&["C1", "C2", "C3"]));
        assert_eq!(opts.countries, strings(&["US", "DE", "FR"]));
    }

    #[test]
    fn selecting_everything_is_identity() {
        let records = sample();
        let all = Selection::all(&FilterOptions::from_records(&records));
        assert_eq!(apply(&records, &all), records);
    }

    #[test]
    fn empty_dimension_excludes_everything() {
        let records = sample();
        let opts = FilterOptions::from_records(&records);
        assert!(filter(&records, &[], &opts.customer_ids, &opts.countries).is_empty());
        assert!(filter(&records, &opts.sales_ids, &[], &opts.countries).is_empty());
        assert!(filter(&records, &opts.sales_ids, &opts.customer_ids, &[]).is_empty());
    }

    #[test]
    fn dimensions_are_intersected() {
        let records = sample();
        let opts = FilterOptions::from_records(&records);
        let out = filter(
            &records,
            &opts.sales_ids,
            &strings(&["C1"]),
            &strings(&["US", "FR"]),
        );
        assert_eq!(out, vec![rec(1, "C1", "US", 40.0)]);
    }

    #[test]
    fn request_defaults_to_all_but_honours_explicit_empty() {
        let records = sample();
        let opts = FilterOptions::from_records(&records);

        let sel = SelectionRequest::default().resolve(&opts);
        assert_eq!(sel, Selection::all(&opts));

        let req: SelectionRequest = serde_json::from_str(r#"{"countries": []}"#).unwrap();
        let sel = req.resolve(&opts);
        assert_eq!(sel.sales_ids, opts.sales_ids);
        assert!(apply(&records, &sel).is_empty());
    }

    #[test]
    fn unobserved_values_in_selection_are_harmless() {
        let records = sample();
        let opts = FilterOptions::from_records(&records);
        let out = filter(&records, &[2, 99], &opts.customer_ids, &opts.countries);
        assert_eq!(out, vec![rec(2, "C2", "US", 120.0)]);
    }
}
