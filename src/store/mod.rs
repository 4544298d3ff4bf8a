//! Applicant store.
//!
//! Holds the currently displayed page of applicants and its pagination cursor, and applies
//! the result of every confirmed remote mutation to that page. The store is an explicit value
//! owned by the front-end; nothing here is global.

use crate::api::ApplicantApi;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{Applicant, ApplicantPatch, NewApplicant, Page, PageOf};

/// Behaviour switches for the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reload the current page after each successful mutation, keeping totals authoritative.
    pub refresh_after_mutation: bool,
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            refresh_after_mutation: config.refresh_after_mutation,
        }
    }
}

/// Records of the current page plus the page metadata from the last successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub applicants: Vec<Applicant>,
    pub page: Page,
}

/// Identifies one page load. Results carrying an outdated ticket are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    page: u32,
    page_size: u32,
}

impl LoadTicket {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Client-side state for the applicant list.
pub struct ApplicantStore<A> {
    api: A,
    state: StoreState,
    options: StoreOptions,
    latest_ticket: u64,
}

impl<A: ApplicantApi> ApplicantStore<A> {
    pub fn new(api: A, items_per_page: u32) -> Self {
        Self::with_options(api, items_per_page, StoreOptions::default())
    }

    pub fn with_options(api: A, items_per_page: u32, options: StoreOptions) -> Self {
        Self {
            api,
            state: StoreState {
                applicants: Vec::new(),
                page: Page::new(items_per_page),
            },
            options,
            latest_ticket: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn applicants(&self) -> &[Applicant] {
        &self.state.applicants
    }

    pub fn page(&self) -> Page {
        self.state.page
    }

    pub fn find(&self, id: i64) -> Option<&Applicant> {
        self.state.applicants.iter().find(|a| a.id == id)
    }

    /// Move the cursor. Does not fetch.
    pub fn set_current_page(&mut self, page: u32) {
        self.state.page.current_page = page.max(1);
    }

    /// Change the page size and go back to page 1. Does not fetch.
    pub fn set_items_per_page(&mut self, items_per_page: u32) {
        self.state.page.items_per_page = items_per_page.max(1);
        self.state.page.current_page = 1;
    }

    /// Issue a ticket for loading the page under the current cursor.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        LoadTicket {
            seq: self.latest_ticket,
            page: self.state.page.current_page,
            page_size: self.state.page.items_per_page,
        }
    }

    /// Apply the outcome of a load. Returns `Ok(false)` when a newer load has been issued
    /// since `ticket`, in which case the result is dropped whether it succeeded or not.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<PageOf<Applicant>, ApiError>,
    ) -> Result<bool, ApiError> {
        if ticket.seq < self.latest_ticket {
            tracing::debug!(
                "Discarding page {} from load {} (latest is {})",
                ticket.page,
                ticket.seq,
                self.latest_ticket
            );
            return Ok(false);
        }

        let loaded = result?;
        tracing::debug!(
            "Loaded page {}/{} with {} applicant(s), {} in total",
            loaded.page.current_page,
            loaded.page.total_pages,
            loaded.items.len(),
            loaded.page.total_count
        );
        self.state = StoreState {
            applicants: loaded.items,
            page: loaded.page,
        };
        Ok(true)
    }

    /// Fetch the page under the current cursor and replace the state with it.
    pub async fn load_applicants(&mut self) -> Result<(), ApiError> {
        let ticket = self.begin_load();
        let result = self
            .api
            .fetch_applicants(Some(ticket.page), Some(ticket.page_size))
            .await;
        self.finish_load(ticket, result).map(|_| ())
    }

    /// Create an applicant and append it to the loaded page.
    ///
    /// `total_count` is left as is until the next load.
    pub async fn add_applicant(&mut self, applicant: &NewApplicant) -> Result<Applicant, ApiError> {
        let created = self.api.create_applicant(applicant).await?;
        self.state.applicants.push(created.clone());
        self.after_mutation().await;
        Ok(created)
    }

    /// Update an applicant remotely, then merge `patch` into the loaded record if present.
    pub async fn update_applicant(
        &mut self,
        id: i64,
        patch: &ApplicantPatch,
    ) -> Result<(), ApiError> {
        self.api.update_applicant(id, patch).await?;
        if let Some(record) = self.state.applicants.iter_mut().find(|a| a.id == id) {
            record.apply(patch);
        }
        self.after_mutation().await;
        Ok(())
    }

    /// Delete an applicant remotely, then drop it from the loaded page.
    pub async fn delete_applicant(&mut self, id: i64) -> Result<(), ApiError> {
        self.api.delete_applicant(id).await?;
        self.state.applicants.retain(|a| a.id != id);
        self.after_mutation().await;
        Ok(())
    }

    /// Flip the hired flag and return the new value.
    ///
    /// An id missing from the loaded page counts as not hired, so it becomes hired. When the
    /// hire endpoint fails the change is sent through a regular update instead.
    pub async fn toggle_hired(&mut self, id: i64) -> Result<bool, ApiError> {
        let hired = !self.find(id).map(|a| a.hired).unwrap_or(false);

        if let Err(err) = self.api.set_applicant_hired(id, hired).await {
            tracing::warn!("Hire endpoint failed for applicant {} ({}), using update", id, err);
            self.api
                .update_applicant(id, &ApplicantPatch::hired(hired))
                .await?;
        }

        if let Some(record) = self.state.applicants.iter_mut().find(|a| a.id == id) {
            record.hired = hired;
        }
        self.after_mutation().await;
        Ok(hired)
    }

    async fn after_mutation(&mut self) {
        if !self.options.refresh_after_mutation {
            return;
        }
        // The mutation itself succeeded; a failed refresh keeps the merged page.
        if let Err(err) = self.load_applicants().await {
            tracing::warn!("Refresh after mutation failed: {}", err);
        }
    }
}
