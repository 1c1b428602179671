//! Core data models for visa-tracker.
//!
//! An [`Application`] is a tracked visa request; a [`Document`] is a piece of
//! paperwork attached to exactly one application by reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::dates::FlexibleDateTime;

// =============================================================================
// ENUMS
// =============================================================================

/// Kind of visa an application is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum VisaType {
    #[serde(rename = "Blue Card")]
    BlueCard,
    #[serde(rename = "Family Reunion")]
    FamilyReunion,
    #[serde(rename = "Student Visa")]
    StudentVisa,
    #[serde(rename = "Job Seeker")]
    JobSeeker,
    #[serde(rename = "Tourist")]
    Tourist,
    #[serde(rename = "Other")]
    Other,
}

impl VisaType {
    /// Every visa type, in display order.
    pub const ALL: [VisaType; 6] = [
        VisaType::BlueCard,
        VisaType::FamilyReunion,
        VisaType::StudentVisa,
        VisaType::JobSeeker,
        VisaType::Tourist,
        VisaType::Other,
    ];

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            VisaType::BlueCard => "Blue Card",
            VisaType::FamilyReunion => "Family Reunion",
            VisaType::StudentVisa => "Student Visa",
            VisaType::JobSeeker => "Job Seeker",
            VisaType::Tourist => "Tourist",
            VisaType::Other => "Other",
        }
    }
}

impl std::fmt::Display for VisaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VisaType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        VisaType::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("Invalid visa type: {}", s))
    }
}

/// Processing status of an application.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::InProgress,
        ApplicationStatus::Completed,
        ApplicationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::InProgress => "in-progress",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("Invalid application status: {}", s))
    }
}

// =============================================================================
// APPLICATION TYPES
// =============================================================================

/// A tracked visa application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub title: String,
    pub visa_type: VisaType,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application together with its documents, newest document first.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApplicationWithDocuments {
    #[serde(flatten)]
    pub application: Application,
    pub documents: Vec<Document>,
}

/// Request body for creating an application.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub title: String,
    pub visa_type: VisaType,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub appointment_date: Option<FlexibleDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of an application.
///
/// Absent fields keep their stored value. For the optional fields an explicit
/// `null` clears the stored value.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub visa_type: Option<VisaType>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub appointment_date: Option<Option<FlexibleDateTime>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

/// Candidate field values of an application, ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDraft {
    pub title: String,
    pub visa_type: VisaType,
    pub status: ApplicationStatus,
    pub appointment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CreateApplicationRequest {
    /// Normalize the request into a draft: title trimmed, blank notes dropped,
    /// status defaulted to pending.
    pub fn into_draft(self) -> ApplicationDraft {
        ApplicationDraft {
            title: self.title.trim().to_string(),
            visa_type: self.visa_type,
            status: self.status.unwrap_or_default(),
            appointment_date: self.appointment_date.map(FlexibleDateTime::into_inner),
            notes: non_blank(self.notes),
        }
    }
}

impl ApplicationPatch {
    /// Merge this patch onto a stored application.
    pub fn merge(self, current: &Application) -> ApplicationDraft {
        ApplicationDraft {
            title: self
                .title
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| current.title.clone()),
            visa_type: self.visa_type.unwrap_or(current.visa_type),
            status: self.status.unwrap_or(current.status),
            appointment_date: match self.appointment_date {
                Some(value) => value.map(FlexibleDateTime::into_inner),
                None => current.appointment_date,
            },
            notes: match self.notes {
                Some(value) => non_blank(value),
                None => current.notes.clone(),
            },
        }
    }

    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.visa_type.is_none()
            && self.status.is_none()
            && self.appointment_date.is_none()
            && self.notes.is_none()
    }
}

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// A supporting document attached to an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub is_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for attaching a document to an application.
///
/// The owning application comes from the request path, never from the body.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub name: String,
    #[serde(default)]
    pub is_ready: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub deadline: Option<FlexibleDateTime>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Partial update of a document. There is deliberately no `applicationId`:
/// a document cannot be moved to another application.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_ready: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub deadline: Option<Option<FlexibleDateTime>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub file_url: Option<Option<String>>,
}

/// Candidate field values of a document, ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDraft {
    pub name: String,
    pub is_ready: bool,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub file_url: Option<String>,
}

impl CreateDocumentRequest {
    pub fn into_draft(self) -> DocumentDraft {
        DocumentDraft {
            name: self.name.trim().to_string(),
            is_ready: self.is_ready.unwrap_or(false),
            notes: non_blank(self.notes),
            deadline: self.deadline.map(FlexibleDateTime::into_inner),
            file_url: non_blank(self.file_url.map(|u| u.trim().to_string())),
        }
    }
}

impl DocumentPatch {
    /// Merge this patch onto a stored document.
    pub fn merge(self, current: &Document) -> DocumentDraft {
        DocumentDraft {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| current.name.clone()),
            is_ready: self.is_ready.unwrap_or(current.is_ready),
            notes: match self.notes {
                Some(value) => non_blank(value),
                None => current.notes.clone(),
            },
            deadline: match self.deadline {
                Some(value) => value.map(FlexibleDateTime::into_inner),
                None => current.deadline,
            },
            file_url: match self.file_url {
                Some(value) => non_blank(value.map(|u| u.trim().to_string())),
                None => current.file_url.clone(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.is_ready.is_none()
            && self.notes.is_none()
            && self.deadline.is_none()
            && self.file_url.is_none()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Forms submit empty strings for untouched optional inputs.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
