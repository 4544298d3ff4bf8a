//! Applicants REST API module.
//!
//! `ApplicantApi` is the only boundary between the store and the network; `ApiClient`
//! implements it over HTTP.

mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use client::*;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::models::{Applicant, ApplicantPatch, NewApplicant, PageOf};

/// Remote operations on applicants.
#[async_trait]
pub trait ApplicantApi: Send + Sync {
    /// GET /api/Applicants - One page of applicants with its metadata.
    async fn fetch_applicants(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PageOf<Applicant>, ApiError>;

    /// GET /api/Applicants/:id - A single applicant.
    async fn fetch_applicant(&self, id: i64) -> Result<Applicant, ApiError>;

    /// POST /api/Applicants - Create an applicant and return it with its new id.
    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<Applicant, ApiError>;

    /// PUT /api/Applicants/:id - Replace the fields present in `patch`.
    async fn update_applicant(&self, id: i64, patch: &ApplicantPatch) -> Result<(), ApiError>;

    /// DELETE /api/Applicants/:id - Delete an applicant.
    async fn delete_applicant(&self, id: i64) -> Result<(), ApiError>;

    /// POST /api/Applicants/:id/hire - Set only the hired flag.
    ///
    /// Not every server exposes this endpoint; callers fall back to `update_applicant`.
    async fn set_applicant_hired(&self, id: i64, hired: bool) -> Result<(), ApiError>;
}
