//! Applicant Desk
//!
//! Client-side state and REST plumbing for managing job applicants: a typed client for the
//! Applicants API, a store for the currently displayed page, list filtering and form validation.

pub mod api;
pub mod config;
pub mod errors;
pub mod form;
pub mod models;
pub mod store;
pub mod view;

pub use api::{ApiClient, ApplicantApi};
pub use config::Config;
pub use errors::ApiError;
pub use store::ApplicantStore;
