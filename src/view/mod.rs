//! List view logic: search and status filtering over the loaded page.
//!
//! Filtering only sees the records the store currently holds, so the filtered count is
//! page-local while `total_count` is the server's figure for the whole collection.

use std::fmt;
use std::str::FromStr;

use crate::api::ApplicantApi;
use crate::models::Applicant;
use crate::store::ApplicantStore;

/// Hired/pending filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Hired,
    Pending,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Hired => "hired",
            StatusFilter::Pending => "pending",
        }
    }

    pub fn matches(&self, applicant: &Applicant) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Hired => applicant.hired,
            StatusFilter::Pending => !applicant.hired,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "hired" => Ok(StatusFilter::Hired),
            "pending" => Ok(StatusFilter::Pending),
            other => Err(format!(
                "unknown status filter '{}', expected all, hired or pending",
                other
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts behind the "Showing X of Y" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSummary {
    /// Records on the loaded page that pass the filters
    pub shown: usize,
    /// Records on the loaded page
    pub loaded: usize,
    /// Server-reported total across all pages
    pub total_count: u64,
}

/// Search term and status filter currently applied to the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    search_term: String,
    status: StatusFilter,
}

impl ListView {
    pub fn new(search_term: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search_term: search_term.into(),
            status,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    /// Change the search term; a different term sends the store back to page 1.
    pub fn set_search_term<A: ApplicantApi>(
        &mut self,
        store: &mut ApplicantStore<A>,
        term: impl Into<String>,
    ) {
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            store.set_current_page(1);
        }
    }

    /// Change the status filter; a different filter sends the store back to page 1.
    pub fn set_status<A: ApplicantApi>(
        &mut self,
        store: &mut ApplicantStore<A>,
        status: StatusFilter,
    ) {
        if status != self.status {
            self.status = status;
            store.set_current_page(1);
        }
    }

    /// Case-insensitive match on name, family name, email or country, combined with the
    /// status filter. Missing fields never match a non-empty term.
    pub fn matches(&self, applicant: &Applicant) -> bool {
        self.status.matches(applicant) && matches_search(applicant, &self.search_term)
    }

    pub fn filter<'a>(&self, applicants: &'a [Applicant]) -> Vec<&'a Applicant> {
        applicants.iter().filter(|a| self.matches(a)).collect()
    }

    pub fn summary<A: ApplicantApi>(&self, store: &ApplicantStore<A>) -> ListSummary {
        ListSummary {
            shown: self.filter(store.applicants()).len(),
            loaded: store.applicants().len(),
            total_count: store.page().total_count,
        }
    }
}

fn matches_search(applicant: &Applicant, term: &str) -> bool {
    let term = term.to_lowercase();
    if term.is_empty() {
        return true;
    }

    [
        Some(applicant.name.as_str()),
        Some(applicant.family_name.as_str()),
        applicant.email.as_deref(),
        applicant.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}
