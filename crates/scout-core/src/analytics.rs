use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::JobRecord;

/// Length of the top-company and top-location lists.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub name: String,
    pub count: usize,
}

/// Aggregate view over a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub total_jobs: usize,
    pub unique_companies: usize,
    pub unique_locations: usize,
    pub top_companies: Vec<Frequency>,
    pub top_locations: Vec<Frequency>,
}

pub fn summarize(records: &[JobRecord]) -> RecordSummary {
    let companies = tally(records.iter().map(|r| r.company.as_str()));
    let locations = tally(records.iter().map(|r| r.location.as_str()));

    RecordSummary {
        total_jobs: records.len(),
        unique_companies: companies.len(),
        unique_locations: locations.len(),
        top_companies: top(companies),
        top_locations: top(locations),
    }
}

/// Counts in first-seen order.
fn tally<'a>(values: impl Iterator<Item = &'a str>) -> Vec<Frequency> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<Frequency> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(Frequency {
                    name: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts
}

fn top(mut counts: Vec<Frequency>) -> Vec<Frequency> {
    // stable: ties keep first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(company: &str, location: &str) -> JobRecord {
        JobRecord::new("Engineer", company, location, "N/A")
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_jobs, 0);
        assert!(summary.top_companies.is_empty());
        assert!(summary.top_locations.is_empty());
    }

    #[test]
    fn test_counts_and_order() {
        let records = vec![
            job("Globex", "Remote"),
            job("Acme", "Berlin"),
            job("Acme", "Remote"),
            job("Initech", "Remote"),
            job("Globex", "Austin, TX"),
            job("Acme", "Berlin"),
        ];

        let summary = summarize(&records);

        assert_eq!(summary.total_jobs, 6);
        assert_eq!(summary.unique_companies, 3);
        assert_eq!(summary.unique_locations, 3);
        let companies: Vec<_> = summary
            .top_companies
            .iter()
            .map(|f| (f.name.as_str(), f.count))
            .collect();
        assert_eq!(companies, [("Acme", 3), ("Globex", 2), ("Initech", 1)]);
        assert_eq!(summary.top_locations[0].name, "Remote");
        assert_eq!(summary.top_locations[1].name, "Berlin");
    }

    #[test]
    fn test_top_is_capped_and_ties_keep_first_seen() {
        let records: Vec<_> = ["F", "E", "D", "C", "B", "A", "A"]
            .iter()
            .map(|c| job(c, "Remote"))
            .collect();

        let summary = summarize(&records);

        assert_eq!(summary.unique_companies, 6);
        let names: Vec<_> = summary.top_companies.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "F", "E", "D", "C"]);
    }
}
