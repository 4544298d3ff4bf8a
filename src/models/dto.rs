//! Wire shapes exchanged with the Applicants API.
//!
//! Field names follow the server contract (`emailAdress`, `countryOfOrigin`); the
//! conversions in this module are the only place that knows about them.

use serde::{Deserialize, Serialize};

use super::{Applicant, ApplicantPatch, NewApplicant, Page, PageOf};

/// Applicant as returned by the list, get and create endpoints.
///
/// List items omit `address` and `age`; both fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDto {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Older servers send `country` on read
    #[serde(default, alias = "country")]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub email_adress: Option<String>,
    /// Missing or `null` on list items
    #[serde(default)]
    pub age: Option<i32>,
    pub hired: bool,
}

impl From<ApplicantDto> for Applicant {
    fn from(dto: ApplicantDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name.unwrap_or_default(),
            family_name: dto.family_name.unwrap_or_default(),
            address: dto.address,
            country: dto.country_of_origin,
            email: dto.email_adress,
            age: dto.age.unwrap_or(0),
            hired: dto.hired,
        }
    }
}

/// Body of `POST /api/Applicants`. Absent optional fields travel as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicantCommand {
    pub name: Option<String>,
    pub family_name: Option<String>,
    pub address: Option<String>,
    pub country_of_origin: Option<String>,
    pub email_adress: Option<String>,
    pub age: i32,
    pub hired: Option<bool>,
}

impl From<&NewApplicant> for CreateApplicantCommand {
    fn from(applicant: &NewApplicant) -> Self {
        Self {
            name: Some(applicant.name.clone()),
            family_name: Some(applicant.family_name.clone()),
            address: applicant.address.clone(),
            country_of_origin: applicant.country.clone(),
            email_adress: applicant.email.clone(),
            age: applicant.age,
            hired: Some(applicant.hired),
        }
    }
}

/// Body of `PUT /api/Applicants/{id}`.
///
/// Fields missing from the patch travel as `null`, and a missing age as `0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicantCommand {
    pub id: i64,
    pub name: Option<String>,
    pub family_name: Option<String>,
    pub address: Option<String>,
    pub country_of_origin: Option<String>,
    pub email_adress: Option<String>,
    pub age: i32,
    pub hired: Option<bool>,
}

impl UpdateApplicantCommand {
    pub fn new(id: i64, patch: &ApplicantPatch) -> Self {
        Self {
            id,
            name: patch.name.clone(),
            family_name: patch.family_name.clone(),
            address: patch.address.clone(),
            country_of_origin: patch.country.clone(),
            email_adress: patch.email.clone(),
            age: patch.age.unwrap_or(0),
            hired: patch.hired,
        }
    }
}

/// Body of `POST /api/Applicants/{id}/hire`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetHiredCommand {
    pub hired: bool,
}

/// Paged list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedApplicantsDto {
    pub items: Vec<ApplicantDto>,
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    pub total_count: u64,
}

/// List response: the paged envelope, or a bare array from servers without paging metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApplicantListBody {
    Paged(PagedApplicantsDto),
    Bare(Vec<ApplicantDto>),
}

impl ApplicantListBody {
    /// Map to domain records. Bare arrays take their metadata from the request.
    pub fn into_page(
        self,
        requested_page: Option<u32>,
        requested_size: Option<u32>,
    ) -> PageOf<Applicant> {
        match self {
            ApplicantListBody::Paged(dto) => {
                let items_per_page = dto.page_size.max(1);
                let total_pages = dto
                    .total_pages
                    .unwrap_or_else(|| Page::pages_for(dto.total_count, items_per_page));
                PageOf {
                    items: dto.items.into_iter().map(Applicant::from).collect(),
                    page: Page {
                        current_page: dto.page.max(1),
                        items_per_page,
                        total_pages,
                        total_count: dto.total_count,
                    },
                }
            }
            ApplicantListBody::Bare(items) => {
                let total_count = items.len() as u64;
                let items_per_page = requested_size
                    .unwrap_or_else(|| u32::try_from(items.len()).unwrap_or(u32::MAX))
                    .max(1);
                let total_pages = Page::pages_for(total_count, items_per_page);
                let current_page = requested_page.unwrap_or(1).clamp(1, total_pages.max(1));

                // The server ignored paging, so cut the requested page out of the full list.
                let size = items_per_page as usize;
                let items: Vec<Applicant> = if items.len() > size {
                    items
                        .into_iter()
                        .skip((current_page as usize - 1) * size)
                        .take(size)
                        .map(Applicant::from)
                        .collect()
                } else {
                    items.into_iter().map(Applicant::from).collect()
                };

                PageOf {
                    items,
                    page: Page {
                        current_page,
                        items_per_page,
                        total_pages,
                        total_count,
                    },
                }
            }
        }
    }
}

/// 400 body carrying per-field messages.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationProblemDto {
    #[serde(default)]
    pub title: Option<String>,
    pub errors: std::collections::BTreeMap<String, Vec<String>>,
}
