//! List-view query over an application snapshot.
//!
//! # Responsibility
//! - Filter by free-text search and status.
//! - Order by deadline for the list view.
//!
//! # Invariants
//! - Search is a case-insensitive substring match on company name or job
//!   title; the term is used as typed, and only an empty term matches
//!   everything.
//! - Ordering is ascending by deadline, records without one last; ties keep
//!   insertion order.

use crate::model::application::{Application, ApplicationStatus};
use chrono::NaiveDate;

/// Days ahead (inclusive) within which a deadline counts as soon.
pub const DEADLINE_SOON_DAYS: i64 = 7;

/// Status filter for the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn matches(self, application: &Application) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => application.has_status(status),
        }
    }
}

/// Search and filter criteria for the list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationQuery {
    pub search: String,
    pub status: StatusFilter,
}

impl ApplicationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, filter: StatusFilter) -> Self {
        self.status = filter;
        self
    }

    pub fn matches(&self, application: &Application) -> bool {
        self.matches_with(application, &self.needle())
    }

    /// Filters `applications` and returns the matches ordered by deadline.
    pub fn apply(&self, applications: &[Application]) -> Vec<Application> {
        let needle = self.needle();
        let mut matched = applications
            .iter()
            .filter(|application| self.matches_with(application, &needle))
            .cloned()
            .collect::<Vec<_>>();
        sort_by_deadline(&mut matched);
        matched
    }

    fn needle(&self) -> String {
        self.search.to_lowercase()
    }

    fn matches_with(&self, application: &Application, needle: &str) -> bool {
        self.status.matches(application)
            && (needle.is_empty()
                || application.company_name.to_lowercase().contains(needle)
                || application.job_title.to_lowercase().contains(needle))
    }
}

/// Sorts ascending by deadline with missing deadlines last. Stable.
pub fn sort_by_deadline(applications: &mut [Application]) {
    applications.sort_by_key(|application| (application.deadline.is_none(), application.deadline));
}

/// Whether `deadline` falls between `today` and seven days after it.
pub fn deadline_is_soon(deadline: Option<NaiveDate>, today: NaiveDate) -> bool {
    deadline.is_some_and(|deadline| {
        let days_until = (deadline - today).num_days();
        (0..=DEADLINE_SOON_DAYS).contains(&days_until)
    })
}
