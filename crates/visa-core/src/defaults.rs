//! Centralized default constants for visa-tracker.
//!
//! **This module is the single source of truth** for field limits, pagination
//! defaults, and server defaults. Validation, repositories, and the API all
//! reference these constants instead of defining their own magic numbers.

// =============================================================================
// APPLICATION FIELDS
// =============================================================================

/// Minimum application title length (characters, after trimming).
pub const TITLE_MIN_CHARS: usize = 3;

/// Maximum application title length (characters, after trimming).
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum length of application notes.
pub const APPLICATION_NOTES_MAX_CHARS: usize = 500;

// =============================================================================
// DOCUMENT FIELDS
// =============================================================================

/// Minimum document name length (characters, after trimming).
pub const DOCUMENT_NAME_MIN_CHARS: usize = 2;

/// Maximum document name length (characters, after trimming).
pub const DOCUMENT_NAME_MAX_CHARS: usize = 200;

/// Maximum length of document notes.
pub const DOCUMENT_NOTES_MAX_CHARS: usize = 300;

/// Required prefix of a document file URL.
pub const FILE_URL_PREFIX: &str = "http";

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size when a client asks for a page without a limit.
pub const PAGE_LIMIT: i64 = 10;

/// Largest page size a client may request.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// First page number (pages are 1-based on the wire).
pub const FIRST_PAGE: i64 = 1;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 5000;

/// Default bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/visa_tracker";

/// Default CORS origin (the web client's dev server).
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Maximum accepted request body size in bytes.
pub const REQUEST_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;
