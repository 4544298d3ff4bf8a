//! Data models for the applicant client.
//!
//! Domain records used by the store live beside the wire shapes of the Applicants API.

mod applicant;
pub mod dto;
mod page;

pub use applicant::*;
pub use page::*;
