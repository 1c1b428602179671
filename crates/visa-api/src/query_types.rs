//! Query parameter types for list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use visa_core::defaults::{FIRST_PAGE, PAGE_LIMIT, PAGE_LIMIT_MAX};
use visa_core::ListRequest;

use crate::error::ApiError;

/// Optional page-based pagination. Omitting both parameters returns the
/// whole list.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Page size, 1-100 (default 10)
    pub limit: Option<i64>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl PageQuery {
    /// Validate the parameters. `None` means the client did not ask for
    /// pagination.
    pub fn pagination(&self) -> Result<Option<Pagination>, ApiError> {
        if self.page.is_none() && self.limit.is_none() {
            return Ok(None);
        }

        let page = self.page.unwrap_or(FIRST_PAGE);
        if page < FIRST_PAGE {
            return Err(ApiError::BadRequest("page must be >= 1".into()));
        }

        let limit = self.limit.unwrap_or(PAGE_LIMIT);
        if !(1..=PAGE_LIMIT_MAX).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                PAGE_LIMIT_MAX
            )));
        }

        Ok(Some(Pagination { page, limit }))
    }

    /// Repository request for these parameters.
    pub fn list_request(&self) -> Result<(ListRequest, Option<Pagination>), ApiError> {
        let pagination = self.pagination()?;
        let request = pagination
            .map(|p| p.list_request())
            .unwrap_or_else(ListRequest::all);
        Ok((request, pagination))
    }
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn list_request(&self) -> ListRequest {
        ListRequest::page(self.limit, self.offset())
    }

    /// `ceil(total / limit)`, never less than 1.
    pub fn total_pages(&self, total: i64) -> i64 {
        let pages = (total + self.limit - 1) / self.limit;
        pages.max(1)
    }
}
