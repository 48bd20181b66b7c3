//! Status statistics derived from the application collection.
//!
//! # Responsibility
//! - Count applications per canonical status.
//! - Derive the dashboard distribution (non-empty buckets with percentages).
//!
//! # Invariants
//! - Results always carry one bucket per status in `ApplicationStatus::ALL`
//!   order, zero counts included.
//! - Status matching is exact; unknown status text contributes nowhere.
//! - Everything here is a pure function of its input snapshot.

use crate::model::application::{Application, ApplicationStatus};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

const BUCKETS: usize = ApplicationStatus::ALL.len();

/// Per-status application counts in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    counts: [usize; BUCKETS],
}

impl StatusCounts {
    pub fn get(&self, status: ApplicationStatus) -> usize {
        self.counts[status.ordinal()]
    }

    /// Iterates `(status, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ApplicationStatus, usize)> + '_ {
        ApplicationStatus::ALL
            .into_iter()
            .map(|status| (status, self.get(status)))
    }

    /// Number of applications with a known status.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Serializes as an object keyed by status label, in canonical order.
impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(BUCKETS))?;
        for (status, count) in self.iter() {
            map.serialize_entry(status.label(), &count)?;
        }
        map.end()
    }
}

/// Counts applications per canonical status.
pub fn aggregate(applications: &[Application]) -> StatusCounts {
    let mut counts = [0; BUCKETS];
    for status in applications.iter().filter_map(Application::known_status) {
        counts[status.ordinal()] += 1;
    }
    StatusCounts { counts }
}

/// One non-empty bucket of the status distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartSlice {
    pub status: ApplicationStatus,
    pub count: usize,
    /// Share of the total in percent, `0.0..=100.0`.
    pub percent: f64,
}

impl ChartSlice {
    /// Slice label such as `Submitted: 67%`.
    pub fn percent_label(&self) -> String {
        format!("{}: {:.0}%", self.status, self.percent)
    }
}

/// Non-empty buckets in canonical order with their share of the total.
pub fn distribution(counts: &StatusCounts) -> Vec<ChartSlice> {
    let total = counts.total();
    if total == 0 {
        return Vec::new();
    }

    counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| ChartSlice {
            status,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// Read model backing the dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub counts: StatusCounts,
    pub total: usize,
    pub slices: Vec<ChartSlice>,
}

impl DashboardSummary {
    pub fn from_applications(applications: &[Application]) -> Self {
        let counts = aggregate(applications);
        Self {
            counts,
            total: counts.total(),
            slices: distribution(&counts),
        }
    }

    /// Whether the dashboard should show its "no applications yet" state.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{aggregate, distribution, DashboardSummary};
    use crate::model::application::{Application, ApplicationId, ApplicationStatus};
    use chrono::{TimeZone, Utc};

    fn with_status(id: &str, status: &str) -> Application {
        Application {
            id: ApplicationId::new(id),
            company_name: format!("company-{id}"),
            job_title: "Engineer".to_string(),
            status: status.to_string(),
            deadline: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn aggregate_counts_known_statuses_and_ignores_unknown() {
        let applications = vec![
            with_status("1", "Submitted"),
            with_status("2", "Submitted"),
            with_status("3", "Accepted"),
            with_status("4", "Bogus"),
        ];

        let counts = aggregate(&applications);
        let pairs = counts.iter().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                (ApplicationStatus::NotYetSubmitted, 0),
                (ApplicationStatus::Submitted, 2),
                (ApplicationStatus::ProceededToInterview, 0),
                (ApplicationStatus::Rejected, 0),
                (ApplicationStatus::Accepted, 1),
            ]
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn aggregate_of_empty_collection_has_all_zero_buckets() {
        let counts = aggregate(&[]);
        assert_eq!(counts.iter().count(), ApplicationStatus::ALL.len());
        assert!(counts.is_empty());
    }

    #[test]
    fn counts_serialize_as_ordered_label_map() {
        let counts = aggregate(&[with_status("1", "Rejected")]);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(
            json,
            r#"{"Not yet submitted":0,"Submitted":0,"Proceeded to interview":0,"Rejected":1,"Accepted":0}"#
        );
    }

    #[test]
    fn distribution_skips_empty_buckets_and_sums_to_hundred() {
        let applications = vec![
            with_status("1", "Submitted"),
            with_status("2", "Submitted"),
            with_status("3", "Rejected"),
        ];
        let slices = distribution(&aggregate(&applications));

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].status, ApplicationStatus::Submitted);
        assert_eq!(slices[0].percent_label(), "Submitted: 67%");
        assert_eq!(slices[1].percent_label(), "Rejected: 33%");
        let sum: f64 = slices.iter().map(|slice| slice.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn dashboard_with_only_unknown_statuses_is_empty() {
        let summary = DashboardSummary::from_applications(&[with_status("1", "Ghosted")]);
        assert!(summary.is_empty());
        assert!(summary.slices.is_empty());
    }
}
