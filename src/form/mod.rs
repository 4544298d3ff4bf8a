//! Applicant form validation and submission.
//!
//! Local rules reject bad input before any request is made. Server-side field errors are
//! mapped back onto the same form fields through each field's API key.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::api::ApplicantApi;
use crate::config::Config;
use crate::errors::{ApiError, NETWORK_MESSAGE};
use crate::models::{Applicant, ApplicantPatch, NewApplicant};
use crate::store::ApplicantStore;

/// A field of the applicant form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    FamilyName,
    Address,
    Country,
    Email,
    Age,
    Hired,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Name,
        FormField::FamilyName,
        FormField::Address,
        FormField::Country,
        FormField::Email,
        FormField::Age,
        FormField::Hired,
    ];

    /// Key the server uses for this field in validation error bodies.
    pub fn api_key(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::FamilyName => "FamilyName",
            FormField::Address => "Address",
            FormField::Country => "CountryOfOrigin",
            FormField::Email => "EmailAdress",
            FormField::Age => "Age",
            FormField::Hired => "Hired",
        }
    }

    /// Name of the field on the domain record.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::FamilyName => "familyName",
            FormField::Address => "address",
            FormField::Country => "country",
            FormField::Email => "email",
            FormField::Age => "age",
            FormField::Hired => "hired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::FamilyName => "Family name",
            FormField::Address => "Address",
            FormField::Country => "Country",
            FormField::Email => "Email",
            FormField::Age => "Age",
            FormField::Hired => "Hired",
        }
    }

    /// Resolve a server error key, accepting either the API key or the domain name.
    pub fn from_key(key: &str) -> Option<Self> {
        // ASP.NET-style keys may carry a "$." or "command." prefix.
        let key = key.rsplit('.').next().unwrap_or(key);
        Self::ALL.into_iter().find(|field| {
            field.api_key().eq_ignore_ascii_case(key) || field.as_str().eq_ignore_ascii_case(key)
        })
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Messages attached to form fields, plus messages that belong to no field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<FormField, Vec<String>>,
    general: Vec<String>,
}

impl FieldErrors {
    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_general(&mut self, message: impl Into<String>) {
        self.general.push(message.into());
    }

    pub fn get(&self, field: FormField) -> &[String] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn general(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }

    /// Map a server `errors` body onto form fields. Unknown keys become general messages.
    pub fn from_server(errors: &BTreeMap<String, Vec<String>>) -> Self {
        let mut mapped = Self::default();
        for (key, messages) in errors {
            match FormField::from_key(key) {
                Some(field) => {
                    for message in messages {
                        mapped.add(field, message.clone());
                    }
                }
                None => {
                    for message in messages {
                        mapped.add_general(format!("{}: {}", key, message));
                    }
                }
            }
        }
        mapped
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, messages) in self.iter() {
            for message in messages {
                writeln!(f, "{}: {}", field, message)?;
            }
        }
        for message in &self.general {
            writeln!(f, "{}", message)?;
        }
        Ok(())
    }
}

/// Limits applied before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Minimum number of characters for name and family name
    pub min_name_len: usize,
    pub age_range: RangeInclusive<i32>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_name_len: 5,
            age_range: 20..=60,
        }
    }
}

impl From<&Config> for ValidationRules {
    fn from(config: &Config) -> Self {
        Self {
            age_range: config.age_range.clone(),
            ..Self::default()
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Raw form input. Age stays text until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantForm {
    pub name: String,
    pub family_name: String,
    pub address: String,
    pub country: String,
    pub email: String,
    pub age: String,
    pub hired: bool,
}

impl ApplicantForm {
    /// Pre-fill the form for editing an existing record.
    pub fn from_applicant(applicant: &Applicant) -> Self {
        Self {
            name: applicant.name.clone(),
            family_name: applicant.family_name.clone(),
            address: applicant.address.clone().unwrap_or_default(),
            country: applicant.country.clone().unwrap_or_default(),
            email: applicant.email.clone().unwrap_or_default(),
            age: applicant.age.to_string(),
            hired: applicant.hired,
        }
    }

    pub fn validate(&self, rules: &ValidationRules) -> Result<NewApplicant, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.chars().count() < rules.min_name_len {
            errors.add(
                FormField::Name,
                format!("Name must be at least {} characters", rules.min_name_len),
            );
        }

        let family_name = self.family_name.trim();
        if family_name.chars().count() < rules.min_name_len {
            errors.add(
                FormField::FamilyName,
                format!("Family name must be at least {} characters", rules.min_name_len),
            );
        }

        let address = self.address.trim();
        if address.is_empty() {
            errors.add(FormField::Address, "Address is required");
        }

        let country = self.country.trim();
        if country.is_empty() {
            errors.add(FormField::Country, "Country is required");
        }

        let email = self.email.trim();
        if !email_regex().is_match(email) {
            errors.add(FormField::Email, "Invalid email address");
        }

        let age = match self.age.trim().parse::<i32>() {
            Ok(age) if rules.age_range.contains(&age) => Some(age),
            Ok(_) => {
                errors.add(
                    FormField::Age,
                    format!(
                        "Age must be between {} and {}",
                        rules.age_range.start(),
                        rules.age_range.end()
                    ),
                );
                None
            }
            Err(_) => {
                errors.add(FormField::Age, "Age must be a number");
                None
            }
        };

        match age {
            Some(age) if errors.is_empty() => Ok(NewApplicant {
                name: name.to_string(),
                family_name: family_name.to_string(),
                address: Some(address.to_string()),
                country: Some(country.to_string()),
                email: Some(email.to_string()),
                age,
                hired: self.hired,
            }),
            _ => Err(errors),
        }
    }
}

/// Returned when a second submit arrives while one is still in flight.
pub const IN_FLIGHT_MESSAGE: &str = "A submission is already in progress.";

/// Result of submitting the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Applicant),
    Updated(i64),
    /// Local validation failed; nothing was sent
    Invalid(FieldErrors),
    /// The server rejected individual fields
    Rejected(FieldErrors),
    /// Any other failure, reduced to a single message
    Failed(String),
}

/// Shared handle on a submission's in-flight state.
///
/// Clones observe the same flag, so a caller can watch it while `submit` holds the
/// submission mutably.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Mark busy until the returned guard drops, or return `None` if already busy.
    fn acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(self))
    }
}

struct BusyGuard<'a>(&'a BusyFlag);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.store(false, Ordering::SeqCst);
    }
}

/// Tracks one form's submission state and its latest field errors.
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    rules: ValidationRules,
    busy: BusyFlag,
    errors: FieldErrors,
}

impl FormSubmission {
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            busy: BusyFlag::default(),
            errors: FieldErrors::default(),
        }
    }

    /// True while a request is in flight; the submit control is disabled meanwhile.
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Handle for watching the in-flight state from outside `submit`.
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Validate and send the form. `editing` holds the id of the record being edited.
    pub async fn submit<A: ApplicantApi>(
        &mut self,
        store: &mut ApplicantStore<A>,
        form: &ApplicantForm,
        editing: Option<i64>,
    ) -> SubmitOutcome {
        let applicant = match form.validate(&self.rules) {
            Ok(applicant) => applicant,
            Err(errors) => {
                tracing::debug!("Form rejected locally: {} field(s)", errors.iter().count());
                self.errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
        };

        let busy = self.busy.clone();
        let Some(guard) = busy.acquire() else {
            tracing::debug!("Submit ignored, a request is already in flight");
            return SubmitOutcome::Failed(IN_FLIGHT_MESSAGE.to_string());
        };

        self.errors = FieldErrors::default();
        let result = match editing {
            Some(id) => store
                .update_applicant(id, &ApplicantPatch::from(applicant))
                .await
                .map(|()| SubmitOutcome::Updated(id)),
            None => store
                .add_applicant(&applicant)
                .await
                .map(SubmitOutcome::Created),
        };
        drop(guard);

        result.unwrap_or_else(|err| self.failure(err))
    }

    fn failure(&mut self, err: ApiError) -> SubmitOutcome {
        match err.field_errors() {
            Some(errors) => {
                self.errors = FieldErrors::from_server(errors);
                SubmitOutcome::Rejected(self.errors.clone())
            }
            None => {
                tracing::warn!("Submission failed: {}", err);
                let mut errors = FieldErrors::default();
                errors.add_general(NETWORK_MESSAGE);
                self.errors = errors;
                SubmitOutcome::Failed(NETWORK_MESSAGE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{seed, FakeApi, Pause};

    fn valid_form() -> ApplicantForm {
        ApplicantForm {
            name: "Johnny".to_string(),
            family_name: "Doever".to_string(),
            address: "1 Main Street".to_string(),
            country: "United States".to_string(),
            email: "johnny.doever@email.com".to_string(),
            age: "28".to_string(),
            hired: false,
        }
    }

    #[test]
    fn test_valid_form() {
        let applicant = valid_form().validate(&ValidationRules::default()).unwrap();
        assert_eq!(applicant.name, "Johnny");
        assert_eq!(applicant.country.as_deref(), Some("United States"));
        assert_eq!(applicant.age, 28);
    }

    #[test]
    fn test_short_name() {
        let form = ApplicantForm {
            name: "Jo".to_string(),
            ..valid_form()
        };
        let errors = form.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(errors.get(FormField::Name), ["Name must be at least 5 characters"]);
        assert!(errors.get(FormField::FamilyName).is_empty());
    }

    #[test]
    fn test_every_rule() {
        let form = ApplicantForm {
            name: "Ann".to_string(),
            family_name: "  Li  ".to_string(),
            address: "   ".to_string(),
            country: String::new(),
            email: "not-an-email".to_string(),
            age: "abc".to_string(),
            hired: true,
        };
        let errors = form.validate(&ValidationRules::default()).unwrap_err();
        for field in FormField::ALL.into_iter().filter(|f| *f != FormField::Hired) {
            assert_eq!(errors.get(field).len(), 1, "{}", field);
        }
        assert_eq!(errors.get(FormField::Age), ["Age must be a number"]);
    }

    #[test]
    fn test_age_range_is_inclusive() {
        let rules = ValidationRules::default();
        for (age, ok) in [("19", false), ("20", true), ("60", true), ("61", false)] {
            let form = ApplicantForm {
                age: age.to_string(),
                ..valid_form()
            };
            assert_eq!(form.validate(&rules).is_ok(), ok, "age {}", age);
        }

        let wide = ValidationRules {
            age_range: 18..=100,
            ..ValidationRules::default()
        };
        let form = ApplicantForm {
            age: "19".to_string(),
            ..valid_form()
        };
        assert!(form.validate(&wide).is_ok());
    }

    #[test]
    fn test_from_server_maps_keys() {
        let mut body = BTreeMap::new();
        body.insert("Age".to_string(), vec!["must be between 20 and 60".to_string()]);
        body.insert("CountryOfOrigin".to_string(), vec!["required".to_string()]);
        body.insert("$.emailAdress".to_string(), vec!["bad".to_string()]);
        body.insert("Photo".to_string(), vec!["too large".to_string()]);

        let errors = FieldErrors::from_server(&body);
        assert_eq!(errors.get(FormField::Age), ["must be between 20 and 60"]);
        assert_eq!(errors.get(FormField::Country), ["required"]);
        assert_eq!(errors.get(FormField::Email), ["bad"]);
        assert_eq!(errors.general(), ["Photo: too large"]);
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let mut store = ApplicantStore::new(FakeApi::default(), 6);
        let mut submission = FormSubmission::default();
        let form = ApplicantForm {
            name: "Jo".to_string(),
            ..valid_form()
        };

        let outcome = submission.submit(&mut store, &form, None).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert_eq!(submission.errors().get(FormField::Name).len(), 1);
        assert_eq!(store.api().calls(), 0);
        assert!(!submission.is_busy());
    }

    #[tokio::test]
    async fn test_server_rejection_lands_on_field() {
        let mut reject = BTreeMap::new();
        reject.insert("Age".to_string(), vec!["must be between 20 and 60".to_string()]);
        let mut store = ApplicantStore::new(
            FakeApi {
                reject_with: Some(reject),
                ..FakeApi::default()
            },
            6,
        );
        let mut submission = FormSubmission::default();

        let outcome = submission.submit(&mut store, &valid_form(), None).await;

        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert_eq!(
            submission.errors().get(FormField::Age),
            ["must be between 20 and 60"]
        );
        assert!(!submission.is_busy());
    }

    #[tokio::test]
    async fn test_network_failure_is_general() {
        let mut store = ApplicantStore::new(FakeApi::offline(), 6);
        let mut submission = FormSubmission::default();

        let outcome = submission.submit(&mut store, &valid_form(), None).await;

        assert_eq!(outcome, SubmitOutcome::Failed(NETWORK_MESSAGE.to_string()));
        assert_eq!(submission.errors().general(), [NETWORK_MESSAGE]);
        assert!(!submission.is_busy());
    }

    #[tokio::test]
    async fn test_busy_while_request_in_flight() {
        let pause = Arc::new(Pause::default());
        let mut store = ApplicantStore::new(
            FakeApi {
                pause: Some(pause.clone()),
                ..FakeApi::default()
            },
            6,
        );
        let mut submission = FormSubmission::default();
        let busy = submission.busy_flag();
        let form = valid_form();
        assert!(!busy.is_set());

        let watch = async {
            pause.entered.notified().await;
            let seen = busy.is_set();
            pause.release.notify_one();
            seen
        };
        let (outcome, seen) = tokio::join!(submission.submit(&mut store, &form, None), watch);

        assert!(seen);
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert!(!submission.is_busy());
    }

    #[tokio::test]
    async fn test_second_submit_refused_while_busy() {
        let mut store = ApplicantStore::new(FakeApi::default(), 6);
        let mut submission = FormSubmission::default();
        let busy = submission.busy_flag();

        let guard = busy.acquire();
        assert!(guard.is_some());
        let outcome = submission.submit(&mut store, &valid_form(), None).await;
        assert_eq!(outcome, SubmitOutcome::Failed(IN_FLIGHT_MESSAGE.to_string()));
        assert_eq!(store.api().calls(), 0);

        drop(guard);
        let outcome = submission.submit(&mut store, &valid_form(), None).await;
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_edit_updates_loaded_record() {
        let mut store = ApplicantStore::new(FakeApi::with_records(seed()), 6);
        store.load_applicants().await.unwrap();
        let mut form = ApplicantForm::from_applicant(store.find(3).unwrap());
        form.family_name = "Hassanein".to_string();

        let outcome = FormSubmission::default()
            .submit(&mut store, &form, Some(3))
            .await;

        assert_eq!(outcome, SubmitOutcome::Updated(3));
        assert_eq!(store.find(3).unwrap().family_name, "Hassanein");
    }
}
