//! Uniform response envelope.
//!
//! Every response body, success or failure, has the shape
//! `{ success, data?, message?, count?, total?, page?, totalPages? }`.

use serde::Serialize;
use visa_core::Listing;

use crate::query_types::Pagination;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl<T> Envelope<T> {
    fn empty(success: bool) -> Self {
        Self {
            success,
            data: None,
            message: None,
            count: None,
            total: None,
            page: None,
            total_pages: None,
        }
    }

    /// Successful response carrying `data`.
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(true)
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    /// Successful response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::empty(true).with_message(message)
    }

    /// Failure response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::empty(false).with_message(message)
    }
}

impl<T> Envelope<Vec<T>> {
    /// List response. Page metadata is present only for paginated requests.
    pub fn listing(listing: Listing<T>, pagination: Option<Pagination>) -> Self {
        let Listing { items, total } = listing;
        let mut envelope = Self {
            count: Some(items.len()),
            total: Some(total),
            ..Self::data(items)
        };
        if let Some(p) = pagination {
            envelope.page = Some(p.page);
            envelope.total_pages = Some(p.total_pages(total));
        }
        envelope
    }
}
