//! HTTP implementation of the Applicants API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use super::ApplicantApi;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::dto::{
    ApplicantDto, ApplicantListBody, CreateApplicantCommand, SetHiredCommand,
    UpdateApplicantCommand, ValidationProblemDto,
};
use crate::models::{Applicant, ApplicantPatch, NewApplicant, PageOf};

/// Path of the applicants resource below the API base URL.
pub const APPLICANTS_PATH: &str = "/api/Applicants";

/// HTTP client for the Applicants API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with default HTTP settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Create a client honouring the timeout and certificate settings.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(builder.build()?, &config.api_base))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, APPLICANTS_PATH, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!("{} {}{}", method, APPLICANTS_PATH, path);
        self.http.request(method, self.url(path))
    }
}

/// Turn a non-success response into a generic error.
fn failure(response: &Response, message: &str) -> ApiError {
    let status = response.status();
    tracing::warn!("{} failed with status {}", response.url().path(), status);
    ApiError::Status {
        status: status.as_u16(),
        message: message.to_string(),
    }
}

/// Like `failure`, but a 400 with a structured `errors` body becomes a validation error.
async fn failure_with_validation(response: Response, message: &str) -> ApiError {
    if response.status() != StatusCode::BAD_REQUEST {
        return failure(&response, message);
    }

    let generic = failure(&response, message);
    let body = match response.text().await {
        Ok(body) => body,
        Err(_) => return generic,
    };

    match serde_json::from_str::<ValidationProblemDto>(&body) {
        Ok(problem) => {
            tracing::debug!("Server rejected {} field(s)", problem.errors.len());
            ApiError::Validation {
                message: problem
                    .title
                    .unwrap_or_else(|| "Validation failed".to_string()),
                errors: problem.errors,
            }
        }
        Err(_) => generic,
    }
}

#[async_trait]
impl ApplicantApi for ApiClient {
    async fn fetch_applicants(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PageOf<Applicant>, ApiError> {
        let mut query = Vec::new();
        if let Some(page) = page.filter(|p| *p > 0) {
            query.push(("Page", page));
        }
        if let Some(size) = page_size.filter(|s| *s > 0) {
            query.push(("PageSize", size));
        }

        let response = self.request(Method::GET, "").query(&query).send().await?;
        if !response.status().is_success() {
            return Err(failure(&response, "Failed to fetch applicants"));
        }

        let body = response.json::<ApplicantListBody>().await?;
        Ok(body.into_page(page, page_size))
    }

    async fn fetch_applicant(&self, id: i64) -> Result<Applicant, ApiError> {
        let response = self
            .request(Method::GET, &format!("/{}", id))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(&response, "Failed to fetch applicant"));
        }

        let dto = response.json::<ApplicantDto>().await?;
        Ok(dto.into())
    }

    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<Applicant, ApiError> {
        let response = self
            .request(Method::POST, "")
            .json(&CreateApplicantCommand::from(applicant))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure_with_validation(response, "Failed to create applicant").await);
        }

        let dto = response.json::<ApplicantDto>().await?;
        tracing::info!("Created applicant {}", dto.id);
        Ok(dto.into())
    }

    async fn update_applicant(&self, id: i64, patch: &ApplicantPatch) -> Result<(), ApiError> {
        let response = self
            .request(Method::PUT, &format!("/{}", id))
            .json(&UpdateApplicantCommand::new(id, patch))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure_with_validation(response, "Failed to update applicant").await);
        }

        tracing::info!("Updated applicant {}", id);
        Ok(())
    }

    async fn delete_applicant(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/{}", id))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(&response, "Failed to delete applicant"));
        }

        tracing::info!("Deleted applicant {}", id);
        Ok(())
    }

    async fn set_applicant_hired(&self, id: i64, hired: bool) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, &format!("/{}/hire", id))
            .json(&SetHiredCommand { hired })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(&response, "Failed to set applicant hired state"));
        }

        Ok(())
    }
}
