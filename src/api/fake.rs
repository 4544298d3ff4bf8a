//! In-memory `ApplicantApi` for unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::ApplicantApi;
use crate::errors::ApiError;
use crate::models::{Applicant, ApplicantPatch, NewApplicant, Page, PageOf};

/// Serves applicants from a vector and records how often it was called.
#[derive(Default)]
pub struct FakeApi {
    pub records: Mutex<Vec<Applicant>>,
    pub calls: AtomicUsize,
    pub hire_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    /// Make the hire endpoint answer 404
    pub hire_unavailable: bool,
    /// Make every call fail with a connectivity error
    pub offline: AtomicBool,
    /// Per-field errors returned by create and update
    pub reject_with: Option<BTreeMap<String, Vec<String>>>,
    /// Hold create and update calls until released
    pub pause: Option<Arc<Pause>>,
}

/// Lets a test observe a call while it is still in flight.
#[derive(Default)]
pub struct Pause {
    /// Signalled once the call has started
    pub entered: Notify,
    /// Notify to let the call finish
    pub release: Notify,
}

impl FakeApi {
    pub fn with_records(records: Vec<Applicant>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    async fn hold(&self) {
        if let Some(pause) = &self.pause {
            pause.entered.notify_one();
            pause.release.notified().await;
        }
    }

    fn check_rejection(&self) -> Result<(), ApiError> {
        match &self.reject_with {
            Some(errors) => Err(ApiError::Validation {
                message: "Validation failed".to_string(),
                errors: errors.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn applicant(id: i64, name: &str, family_name: &str, country: &str, hired: bool) -> Applicant {
    Applicant {
        id,
        name: name.to_string(),
        family_name: family_name.to_string(),
        address: Some(format!("{} Main Street", id)),
        country: Some(country.to_string()),
        email: Some(format!(
            "{}.{}@email.com",
            name.to_lowercase(),
            family_name.to_lowercase()
        )),
        age: 30,
        hired,
    }
}

/// The three applicants the demo data starts with.
pub fn seed() -> Vec<Applicant> {
    vec![
        applicant(1, "John", "Doe", "United States", false),
        applicant(2, "Jane", "Smith", "Canada", true),
        applicant(3, "Ahmed", "Hassan", "Egypt", false),
    ]
}

#[async_trait]
impl ApplicantApi for FakeApi {
    async fn fetch_applicants(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PageOf<Applicant>, ApiError> {
        self.enter()?;
        let records = self.records.lock().unwrap();
        let page = page.unwrap_or(1).max(1);
        let size = page_size.unwrap_or(10).max(1);
        let items = records
            .iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .cloned()
            .collect();
        Ok(PageOf {
            items,
            page: Page {
                current_page: page,
                items_per_page: size,
                total_pages: Page::pages_for(records.len() as u64, size),
                total_count: records.len() as u64,
            },
        })
    }

    async fn fetch_applicant(&self, id: i64) -> Result<Applicant, ApiError> {
        self.enter()?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: "Failed to fetch applicant".to_string(),
            })
    }

    async fn create_applicant(&self, applicant: &NewApplicant) -> Result<Applicant, ApiError> {
        self.enter()?;
        self.hold().await;
        self.check_rejection()?;
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let created = applicant.clone().with_id(id);
        records.push(created.clone());
        Ok(created)
    }

    async fn update_applicant(&self, id: i64, patch: &ApplicantPatch) -> Result<(), ApiError> {
        self.enter()?;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.hold().await;
        self.check_rejection()?;
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|a| a.id == id) {
            record.apply(patch);
        }
        Ok(())
    }

    async fn delete_applicant(&self, id: i64) -> Result<(), ApiError> {
        self.enter()?;
        self.records.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn set_applicant_hired(&self, id: i64, hired: bool) -> Result<(), ApiError> {
        self.enter()?;
        self.hire_calls.fetch_add(1, Ordering::SeqCst);
        if self.hire_unavailable {
            return Err(ApiError::Status {
                status: 404,
                message: "Failed to set applicant hired state".to_string(),
            });
        }
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|a| a.id == id) {
            record.hired = hired;
        }
        Ok(())
    }
}
