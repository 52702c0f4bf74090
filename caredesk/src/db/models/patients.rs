//! Database models for patient records.

use crate::api::models::patients::{Gender, PatientCreate, PatientUpdate};
use crate::types::{PatientId, UserId};
use crate::validation::{self, FieldErrors, NAME_MAX_LENGTH};
use chrono::{DateTime, Utc};

pub const AGE_RANGE: (i32, i32) = (0, 150);
pub const AGE_MESSAGE: &str = "Age must be between 0 and 150.";

/// Database request for creating a patient.
///
/// `owner` always comes from the authenticated requester, never from the payload.
#[derive(Debug, Clone)]
pub struct PatientCreateDBRequest {
    pub owner: UserId,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    pub medical_history: Option<String>,
}

impl PatientCreateDBRequest {
    pub fn new(owner: UserId, api: PatientCreate) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::text(&mut errors, "name", &api.name, NAME_MAX_LENGTH);
        let (min, max) = AGE_RANGE;
        validation::range(&mut errors, "age", api.age, min, max, AGE_MESSAGE);
        validation::phone(&mut errors, "phone", &api.phone);
        validation::text(&mut errors, "address", &api.address, usize::MAX);
        errors.check()?;

        Ok(Self {
            owner,
            name: api.name,
            age: api.age,
            gender: api.gender,
            phone: api.phone,
            address: api.address,
            medical_history: api.medical_history,
        })
    }
}

/// Database request for a partial patient update; `None` leaves the column untouched.
///
/// Ownership never changes after creation, so there is no owner field.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdateDBRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// `Some(None)` clears the column
    pub medical_history: Option<Option<String>>,
}

impl TryFrom<PatientUpdate> for PatientUpdateDBRequest {
    type Error = FieldErrors;

    fn try_from(api: PatientUpdate) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &api.name {
            validation::text(&mut errors, "name", name, NAME_MAX_LENGTH);
        }
        if let Some(age) = api.age {
            let (min, max) = AGE_RANGE;
            validation::range(&mut errors, "age", age, min, max, AGE_MESSAGE);
        }
        if let Some(phone) = &api.phone {
            validation::phone(&mut errors, "phone", phone);
        }
        if let Some(address) = &api.address {
            validation::text(&mut errors, "address", address, usize::MAX);
        }
        errors.check()?;

        Ok(Self {
            name: api.name,
            age: api.age,
            gender: api.gender,
            phone: api.phone,
            address: api.address,
            medical_history: api.medical_history,
        })
    }
}

/// Database response for a patient, joined with its owner's name and email
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDBResponse {
    pub id: PatientId,
    pub owner: UserId,
    pub owner_name: String,
    pub owner_email: String,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
