// services/trip-dash/src/aggregation.rs
//
// Client-side aggregation over rows already fetched for one chart:
// borough group-by-sum, stable descending rank, label shortening.
//

use std::collections::HashMap;

use svckit::types::RevenueRow;

/// Display labels longer than this are cut and suffixed with `…`
pub const LABEL_LIMIT: usize = 22;
pub const ELLIPSIS: char = '…';

const UNKNOWN_BOROUGH: &str = "Unknown";

/// Borough name -> summed revenue, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoroughTotals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl BoroughTotals {
    /// Group-by-sum in one pass. Built fresh per fetch, so boroughs missing
    /// from `rows` never survive from an earlier load.
    pub fn from_rows(rows: &[RevenueRow]) -> Self {
        let mut totals = Self::default();
        for row in rows {
            let borough = row.borough_name.as_deref().unwrap_or(UNKNOWN_BOROUGH);
            totals.add(borough, row.total_revenue);
        }
        totals
    }
    
    fn add(&mut self, borough: &str, revenue: f64) {
        match self.index.get(borough) {
            Some(&i) => self.entries[i].1 += revenue,
            None => {
                self.index.insert(borough.to_string(), self.entries.len());
                self.entries.push((borough.to_string(), revenue));
            }
        }
    }
    
    pub fn get(&self, borough: &str) -> Option<f64> {
        self.index.get(borough).map(|&i| self.entries[i].1)
    }
    
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    
    /// Borough names in first-seen order; the option set for the borough filter
    pub fn boroughs(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }
    
    /// Descending by total. `sort_by` is stable, so ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Cut `label` to `LABEL_LIMIT` characters plus an ellipsis. The caller keeps
/// the full name for lookups and queries.
pub fn shorten_label(label: &str) -> String {
    if label.chars().count() <= LABEL_LIMIT {
        return label.to_string();
    }
    let mut short: String = label.chars().take(LABEL_LIMIT).collect();
    short.push(ELLIPSIS);
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn row(borough: &str, revenue: f64) -> RevenueRow {
        RevenueRow {
            zone_name: Some(format!("{} zone", borough)),
            borough_name: Some(borough.to_string()),
            total_revenue: revenue,
            trip_count: None,
            avg_revenue_per_trip: None,
        }
    }
    
    fn names(ranked: &[(String, f64)]) -> Vec<&str> {
        ranked.iter().map(|(n, _)| n.as_str()).collect()
    }
    
    #[test]
    fn test_group_by_sum() {
        let totals = BoroughTotals::from_rows(&[
            row("Manhattan", 100.0),
            row("Queens", 40.0),
            row("Manhattan", 25.5),
        ]);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("Manhattan"), Some(125.5));
        assert_eq!(totals.boroughs(), vec!["Manhattan", "Queens"]);
    }
    
    #[test]
    fn test_ties_keep_first_seen_order() {
        let totals = BoroughTotals::from_rows(&[
            row("Brooklyn", 100.0),
            row("Manhattan", 100.0),
            row("Queens", 50.0),
        ]);
        assert_eq!(names(&totals.ranked()), vec!["Brooklyn", "Manhattan", "Queens"]);
    }
    
    /// Every ordering of `0..n`
    fn orderings(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut all = Vec::new();
        for shorter in orderings(n - 1) {
            for slot in 0..=shorter.len() {
                let mut perm = shorter.clone();
                perm.insert(slot, n - 1);
                all.push(perm);
            }
        }
        all
    }
    
    #[test]
    fn test_rank_matches_stable_sort_for_all_permutations() {
        let base = [("A", 10.0), ("B", 30.0), ("C", 10.0), ("D", 20.0)];
        let permutations = orderings(base.len());
        assert_eq!(permutations.len(), 24);
        for perm in permutations {
            let rows: Vec<RevenueRow> = perm.iter().map(|&i| row(base[i].0, base[i].1)).collect();
            let ranked = BoroughTotals::from_rows(&rows).ranked();
            
            for pair in ranked.windows(2) {
                assert!(pair[0].1 >= pair[1].1);
            }
            // A and C tie at 10: whichever came first in the input stays first
            let first_tied = rows.iter().position(|r| r.borough_name.as_deref() == Some("A")).unwrap()
                < rows.iter().position(|r| r.borough_name.as_deref() == Some("C")).unwrap();
            assert_eq!(names(&ranked[..2]), vec!["B", "D"]);
            let tail = names(&ranked[2..]);
            assert_eq!(tail, if first_tied { vec!["A", "C"] } else { vec!["C", "A"] });
        }
    }
    
    #[test]
    fn test_fresh_totals_drop_previous_boroughs() {
        let first = BoroughTotals::from_rows(&[row("Bronx", 5.0), row("EWR", 1.0)]);
        assert!(first.get("EWR").is_some());
        let second = BoroughTotals::from_rows(&[row("Bronx", 7.0)]);
        assert_eq!(second.boroughs(), vec!["Bronx"]);
    }
    
    #[test]
    fn test_missing_borough_grouped_as_unknown() {
        let mut orphan = row("x", 3.0);
        orphan.borough_name = None;
        let totals = BoroughTotals::from_rows(&[orphan]);
        assert_eq!(totals.get("Unknown"), Some(3.0));
    }
    
    #[test]
    fn test_shorten_label() {
        let zone = "Upper East Side North Extended";
        assert_eq!(zone.chars().count(), 30);
        
        let label = shorten_label(zone);
        assert_eq!(label.chars().count(), 23);
        assert_eq!(label, "Upper East Side North …");
        
        assert_eq!(shorten_label("JFK Airport"), "JFK Airport");
        let exact = "a".repeat(LABEL_LIMIT);
        assert_eq!(shorten_label(&exact), exact);
    }
}
