//! Field validation rules for applications and documents.
//!
//! Every rule is a pure function; the current time is passed in so that the
//! future-date rules are deterministic under test. Entity checks stop at the
//! first violated constraint and report it as [`Error::Validation`].

use chrono::{DateTime, Utc};

use crate::defaults::{
    APPLICATION_NOTES_MAX_CHARS, DOCUMENT_NAME_MAX_CHARS, DOCUMENT_NAME_MIN_CHARS,
    DOCUMENT_NOTES_MAX_CHARS, FILE_URL_PREFIX, TITLE_MAX_CHARS, TITLE_MIN_CHARS,
};
use crate::error::{Error, Result};
use crate::models::{Application, ApplicationDraft, Document, DocumentDraft};

/// Length in characters (not bytes).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// True when `ts` lies strictly after `now`.
pub fn is_in_future(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    ts > now
}

/// True when `url` carries the required `http` prefix (covers https).
pub fn is_http_url(url: &str) -> bool {
    url.starts_with(FILE_URL_PREFIX)
}

fn check_required_length(value: &str, label: &str, min: usize, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{} is required", label)));
    }
    let len = char_len(value);
    if len < min {
        return Err(Error::Validation(format!(
            "{} must be at least {} characters long",
            label, min
        )));
    }
    if len > max {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters long",
            label, max
        )));
    }
    Ok(())
}

fn check_optional_max(value: Option<&str>, label: &str, max: usize) -> Result<()> {
    match value {
        Some(v) if char_len(v) > max => Err(Error::Validation(format!(
            "{} must be at most {} characters long",
            label, max
        ))),
        _ => Ok(()),
    }
}

/// A date is checked only when it is being written: always on create, and on
/// update only when it differs from the stored value.
fn check_written_date(
    new: Option<DateTime<Utc>>,
    stored: Option<Option<DateTime<Utc>>>,
    now: &DateTime<Utc>,
    message: &str,
) -> Result<()> {
    let Some(date) = new else {
        return Ok(());
    };
    let unchanged = stored == Some(Some(date));
    if !unchanged && !is_in_future(&date, now) {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(())
}

/// Validate an application draft.
///
/// `stored` is the persisted record when the draft comes from an update.
pub fn validate_application(
    draft: &ApplicationDraft,
    stored: Option<&Application>,
    now: DateTime<Utc>,
) -> Result<()> {
    check_required_length(&draft.title, "Title", TITLE_MIN_CHARS, TITLE_MAX_CHARS)?;
    check_written_date(
        draft.appointment_date,
        stored.map(|a| a.appointment_date),
        &now,
        "Appointment date must be in the future",
    )?;
    check_optional_max(
        draft.notes.as_deref(),
        "Notes",
        APPLICATION_NOTES_MAX_CHARS,
    )?;
    Ok(())
}

/// Validate a document draft.
///
/// `stored` is the persisted record when the draft comes from an update.
pub fn validate_document(
    draft: &DocumentDraft,
    stored: Option<&Document>,
    now: DateTime<Utc>,
) -> Result<()> {
    check_required_length(
        &draft.name,
        "Document name",
        DOCUMENT_NAME_MIN_CHARS,
        DOCUMENT_NAME_MAX_CHARS,
    )?;
    check_optional_max(draft.notes.as_deref(), "Notes", DOCUMENT_NOTES_MAX_CHARS)?;
    check_written_date(
        draft.deadline,
        stored.map(|d| d.deadline),
        &now,
        "Deadline must be in the future",
    )?;
    if let Some(url) = draft.file_url.as_deref() {
        if !is_http_url(url) {
            return Err(Error::Validation(format!(
                "File URL must start with {}",
                FILE_URL_PREFIX
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationStatus, VisaType};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn app_draft(title: &str) -> ApplicationDraft {
        ApplicationDraft {
            title: title.to_string(),
            visa_type: VisaType::BlueCard,
            status: ApplicationStatus::Pending,
            appointment_date: None,
            notes: None,
        }
    }

    fn doc_draft(name: &str) -> DocumentDraft {
        DocumentDraft {
            name: name.to_string(),
            is_ready: false,
            notes: None,
            deadline: None,
            file_url: None,
        }
    }

    fn message(result: Result<()>) -> String {
        match result {
            Err(Error::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_char_len_counts_characters() {
        assert_eq!(char_len("Zoë"), 3);
        assert_eq!(char_len("ab"), 2);
    }

    #[test]
    fn test_is_in_future_is_strict() {
        let n = now();
        assert!(!is_in_future(&n, &n));
        assert!(is_in_future(&(n + Duration::seconds(1)), &n));
        assert!(!is_in_future(&(n - Duration::days(1)), &n));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://example.com/a.pdf"));
        assert!(is_http_url("http://example.com/a.pdf"));
        assert!(!is_http_url("ftp://example.com/a.pdf"));
        assert!(!is_http_url("/local/path.pdf"));
    }

    #[test]
    fn test_valid_application() {
        assert!(validate_application(&app_draft("Blue Card for SAP"), None, now()).is_ok());
    }

    #[test]
    fn test_title_required() {
        let msg = message(validate_application(&app_draft(""), None, now()));
        assert_eq!(msg, "Title is required");
    }

    #[test]
    fn test_title_too_short_and_too_long() {
        let msg = message(validate_application(&app_draft("ab"), None, now()));
        assert_eq!(msg, "Title must be at least 3 characters long");

        let long = "t".repeat(101);
        let msg = message(validate_application(&app_draft(&long), None, now()));
        assert_eq!(msg, "Title must be at most 100 characters long");
    }

    #[test]
    fn test_title_boundaries_accepted() {
        assert!(validate_application(&app_draft("abc"), None, now()).is_ok());
        assert!(validate_application(&app_draft(&"t".repeat(100)), None, now()).is_ok());
    }

    #[test]
    fn test_appointment_must_be_strictly_future() {
        let mut draft = app_draft("Family trip");
        draft.appointment_date = Some(now());
        let msg = message(validate_application(&draft, None, now()));
        assert_eq!(msg, "Appointment date must be in the future");

        draft.appointment_date = Some(now() + Duration::days(3));
        assert!(validate_application(&draft, None, now()).is_ok());
    }

    #[test]
    fn test_first_violation_reported() {
        let mut draft = app_draft("x");
        draft.notes = Some("n".repeat(501));
        let msg = message(validate_application(&draft, None, now()));
        assert!(msg.starts_with("Title"));
    }

    #[test]
    fn test_application_notes_limit() {
        let mut draft = app_draft("Tourist visa");
        draft.notes = Some("n".repeat(500));
        assert!(validate_application(&draft, None, now()).is_ok());
        draft.notes = Some("n".repeat(501));
        let msg = message(validate_application(&draft, None, now()));
        assert_eq!(msg, "Notes must be at most 500 characters long");
    }

    #[test]
    fn test_unchanged_past_date_does_not_block_update() {
        let past = now() - Duration::days(10);
        let stored = Application {
            id: Uuid::nil(),
            title: "Job Seeker visa".to_string(),
            visa_type: VisaType::JobSeeker,
            status: ApplicationStatus::InProgress,
            appointment_date: Some(past),
            notes: None,
            created_at: past - Duration::days(30),
            updated_at: past - Duration::days(30),
        };
        let mut draft = app_draft("Job Seeker visa (renewed)");
        draft.appointment_date = Some(past);
        assert!(validate_application(&draft, Some(&stored), now()).is_ok());

        // Changing it to another past date is a write and is rejected
        draft.appointment_date = Some(past - Duration::days(1));
        assert!(validate_application(&draft, Some(&stored), now()).is_err());
    }

    #[test]
    fn test_valid_document() {
        let mut draft = doc_draft("Passport");
        draft.file_url = Some("https://files.example/passport.pdf".to_string());
        draft.deadline = Some(now() + Duration::days(7));
        assert!(validate_document(&draft, None, now()).is_ok());
    }

    #[test]
    fn test_document_name_rules() {
        assert_eq!(
            message(validate_document(&doc_draft(""), None, now())),
            "Document name is required"
        );
        assert_eq!(
            message(validate_document(&doc_draft("P"), None, now())),
            "Document name must be at least 2 characters long"
        );
        assert_eq!(
            message(validate_document(&doc_draft(&"p".repeat(201)), None, now())),
            "Document name must be at most 200 characters long"
        );
        assert!(validate_document(&doc_draft("ID"), None, now()).is_ok());
    }

    #[test]
    fn test_document_notes_limit() {
        let mut draft = doc_draft("Payslips");
        draft.notes = Some("n".repeat(301));
        assert_eq!(
            message(validate_document(&draft, None, now())),
            "Notes must be at most 300 characters long"
        );
    }

    #[test]
    fn test_document_deadline_must_be_future() {
        let mut draft = doc_draft("Insurance letter");
        draft.deadline = Some(now() - Duration::hours(1));
        assert_eq!(
            message(validate_document(&draft, None, now())),
            "Deadline must be in the future"
        );
    }

    #[test]
    fn test_document_file_url_prefix() {
        let mut draft = doc_draft("Contract");
        draft.file_url = Some("file:///tmp/contract.pdf".to_string());
        assert_eq!(
            message(validate_document(&draft, None, now())),
            "File URL must start with http"
        );
    }
}
