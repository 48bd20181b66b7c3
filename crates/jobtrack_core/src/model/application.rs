//! Application domain model.
//!
//! # Responsibility
//! - Define the persisted application record and its wire field names.
//! - Define the fixed, ordered status vocabulary.
//! - Define typed creation and patch inputs used by the service layer.
//!
//! # Invariants
//! - `id` and `created_at` are never touched by `ApplicationPatch`.
//! - `status` keeps the persisted text verbatim, including values outside the
//!   vocabulary, so unknown data survives a load/save cycle.
//! - Unknown JSON keys are ignored on decode.

use crate::model::timestamp::{deadline_option, iso_millis, iso_millis_option};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one application record.
///
/// Stored as text so ids written by older builds (millisecond strings) load
/// unchanged next to generated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a random v4 UUID identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ApplicationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Application lifecycle status.
///
/// Declaration order is the canonical order used for counts, legends and
/// filter menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Drafted but not sent yet.
    #[serde(rename = "Not yet submitted")]
    NotYetSubmitted,
    #[serde(rename = "Submitted")]
    Submitted,
    #[serde(rename = "Proceeded to interview")]
    ProceededToInterview,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Accepted")]
    Accepted,
}

impl ApplicationStatus {
    /// Canonical status vocabulary in display order.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::NotYetSubmitted,
        ApplicationStatus::Submitted,
        ApplicationStatus::ProceededToInterview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    /// Exact text persisted for this status.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotYetSubmitted => "Not yet submitted",
            Self::Submitted => "Submitted",
            Self::ProceededToInterview => "Proceeded to interview",
            Self::Rejected => "Rejected",
            Self::Accepted => "Accepted",
        }
    }

    /// Exact-match lookup by persisted text. Case and whitespace matter.
    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == value)
    }

    /// Position in `ALL`.
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical persisted application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    /// Raw status text; see `known_status()` for the typed view.
    #[serde(default)]
    pub status: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "deadline_option"
    )]
    pub deadline: Option<NaiveDate>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Last successful update; `None` for records never updated.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Builds a new record from creation input.
    ///
    /// The caller owns id uniqueness and the creation instant.
    pub fn create(id: ApplicationId, input: NewApplication, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            company_name: input.company_name,
            job_title: input.job_title,
            status: input.status.label().to_string(),
            deadline: input.deadline,
            created_at,
            updated_at: None,
        }
    }

    /// Returns the typed status when the stored text is in the vocabulary.
    pub fn known_status(&self) -> Option<ApplicationStatus> {
        ApplicationStatus::from_label(&self.status)
    }

    pub fn has_status(&self, status: ApplicationStatus) -> bool {
        self.status == status.label()
    }

    /// Merges present patch fields over this record and stamps `updated_at`.
    ///
    /// # Invariants
    /// - `id` and `created_at` are left untouched.
    pub fn apply_patch(&mut self, patch: &ApplicationPatch, updated_at: DateTime<Utc>) {
        if let Some(company_name) = &patch.company_name {
            self.company_name = company_name.clone();
        }
        if let Some(job_title) = &patch.job_title {
            self.job_title = job_title.clone();
        }
        if let Some(status) = patch.status {
            self.status = status.label().to_string();
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        self.updated_at = Some(updated_at);
    }
}

/// Input for creating one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub company_name: String,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub deadline: Option<NaiveDate>,
}

impl NewApplication {
    /// Creates input with status `Not yet submitted` and no deadline.
    pub fn new(company_name: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            job_title: job_title.into(),
            status: ApplicationStatus::NotYetSubmitted,
            deadline: None,
        }
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Form-level checks for callers collecting user input.
    ///
    /// The store accepts unvalidated input; this exists for UI layers.
    pub fn validate(&self) -> Result<(), ApplicationValidationError> {
        if self.company_name.trim().is_empty() {
            return Err(ApplicationValidationError::EmptyCompanyName);
        }
        if self.job_title.trim().is_empty() {
            return Err(ApplicationValidationError::EmptyJobTitle);
        }
        Ok(())
    }
}

/// Partial update for one application.
///
/// `None` leaves a field unchanged. `deadline: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub deadline: Option<Option<NaiveDate>>,
}

impl ApplicationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company_name(mut self, value: impl Into<String>) -> Self {
        self.company_name = Some(value.into());
        self
    }

    pub fn job_title(mut self, value: impl Into<String>) -> Self {
        self.job_title = Some(value.into());
        self
    }

    pub fn status(mut self, value: ApplicationStatus) -> Self {
        self.status = Some(value);
        self
    }

    pub fn deadline(mut self, value: Option<NaiveDate>) -> Self {
        self.deadline = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.job_title.is_none()
            && self.status.is_none()
            && self.deadline.is_none()
    }
}

/// Form validation failure for `NewApplication`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationValidationError {
    EmptyCompanyName,
    EmptyJobTitle,
}

impl Display for ApplicationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCompanyName => write!(f, "company name cannot be empty"),
            Self::EmptyJobTitle => write!(f, "job title cannot be empty"),
        }
    }
}

impl Error for ApplicationValidationError {}

#[cfg(test)]
mod tests {
    use super::{ApplicationStatus, NewApplication};

    #[test]
    fn from_label_is_exact() {
        assert_eq!(
            ApplicationStatus::from_label("Submitted"),
            Some(ApplicationStatus::Submitted)
        );
        assert_eq!(ApplicationStatus::from_label("submitted"), None);
        assert_eq!(ApplicationStatus::from_label(" Submitted"), None);
    }

    #[test]
    fn ordinal_matches_canonical_order() {
        for (index, status) in ApplicationStatus::ALL.into_iter().enumerate() {
            assert_eq!(status.ordinal(), index);
        }
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        assert!(NewApplication::new("Acme", "Engineer").validate().is_ok());
        assert!(NewApplication::new("  ", "Engineer").validate().is_err());
        assert!(NewApplication::new("Acme", "").validate().is_err());
    }
}
