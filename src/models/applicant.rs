//! Applicant model as seen by the store and the command line.

/// A job candidate record. `id` is assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub id: i64,
    pub name: String,
    pub family_name: String,
    pub address: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub age: i32,
    pub hired: bool,
}

impl Applicant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.family_name)
    }

    pub fn status_label(&self) -> &'static str {
        if self.hired {
            "Hired"
        } else {
            "Pending"
        }
    }

    /// Replace exactly the fields present in `patch`.
    pub fn apply(&mut self, patch: &ApplicantPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(family_name) = &patch.family_name {
            self.family_name = family_name.clone();
        }
        if let Some(address) = &patch.address {
            self.address = Some(address.clone());
        }
        if let Some(country) = &patch.country {
            self.country = Some(country.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(hired) = patch.hired {
            self.hired = hired;
        }
    }
}

/// Fields for a new applicant; the id comes back from the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewApplicant {
    pub name: String,
    pub family_name: String,
    pub address: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub age: i32,
    pub hired: bool,
}

impl NewApplicant {
    pub fn with_id(self, id: i64) -> Applicant {
        Applicant {
            id,
            name: self.name,
            family_name: self.family_name,
            address: self.address,
            country: self.country,
            email: self.email,
            age: self.age,
            hired: self.hired,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicantPatch {
    pub name: Option<String>,
    pub family_name: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub hired: Option<bool>,
}

impl ApplicantPatch {
    pub fn hired(hired: bool) -> Self {
        Self {
            hired: Some(hired),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<NewApplicant> for ApplicantPatch {
    fn from(applicant: NewApplicant) -> Self {
        Self {
            name: Some(applicant.name),
            family_name: Some(applicant.family_name),
            address: applicant.address,
            country: applicant.country,
            email: applicant.email,
            age: Some(applicant.age),
            hired: Some(applicant.hired),
        }
    }
}
