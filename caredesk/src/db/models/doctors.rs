//! Database models for the doctor directory.

use crate::api::models::doctors::{DoctorCreate, DoctorUpdate, Specialization};
use crate::types::DoctorId;
use crate::validation::{self, FieldErrors, NAME_MAX_LENGTH};
use chrono::{DateTime, Utc};

pub const EXPERIENCE_YEARS_RANGE: (i32, i32) = (0, 70);
pub const EXPERIENCE_YEARS_MESSAGE: &str = "Experience years must be between 0 and 70.";
pub const QUALIFICATION_MAX_LENGTH: usize = 255;

/// Database request for creating a doctor
#[derive(Debug, Clone)]
pub struct DoctorCreateDBRequest {
    pub name: String,
    pub specialization: Specialization,
    pub phone: String,
    pub email: String,
    pub experience_years: i32,
    pub qualification: String,
    pub address: String,
}

impl TryFrom<DoctorCreate> for DoctorCreateDBRequest {
    type Error = FieldErrors;

    fn try_from(api: DoctorCreate) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        validation::text(&mut errors, "name", &api.name, NAME_MAX_LENGTH);
        validation::phone(&mut errors, "phone", &api.phone);
        let email = validation::email(&mut errors, "email", &api.email);
        let (min, max) = EXPERIENCE_YEARS_RANGE;
        validation::range(&mut errors, "experience_years", api.experience_years, min, max, EXPERIENCE_YEARS_MESSAGE);
        validation::text(&mut errors, "qualification", &api.qualification, QUALIFICATION_MAX_LENGTH);
        validation::text(&mut errors, "address", &api.address, usize::MAX);

        match email {
            Some(email) if errors.is_empty() => Ok(Self {
                name: api.name,
                specialization: api.specialization,
                phone: api.phone,
                email,
                experience_years: api.experience_years,
                qualification: api.qualification,
                address: api.address,
            }),
            _ => Err(errors),
        }
    }
}

/// Database request for a partial doctor update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct DoctorUpdateDBRequest {
    pub name: Option<String>,
    pub specialization: Option<Specialization>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub experience_years: Option<i32>,
    pub qualification: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<DoctorUpdate> for DoctorUpdateDBRequest {
    type Error = FieldErrors;

    fn try_from(api: DoctorUpdate) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &api.name {
            validation::text(&mut errors, "name", name, NAME_MAX_LENGTH);
        }
        if let Some(phone) = &api.phone {
            validation::phone(&mut errors, "phone", phone);
        }
        let email = api.email.as_deref().and_then(|email| validation::email(&mut errors, "email", email));
        if let Some(years) = api.experience_years {
            let (min, max) = EXPERIENCE_YEARS_RANGE;
            validation::range(&mut errors, "experience_years", years, min, max, EXPERIENCE_YEARS_MESSAGE);
        }
        if let Some(qualification) = &api.qualification {
            validation::text(&mut errors, "qualification", qualification, QUALIFICATION_MAX_LENGTH);
        }
        if let Some(address) = &api.address {
            validation::text(&mut errors, "address", address, usize::MAX);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            name: api.name,
            specialization: api.specialization,
            phone: api.phone,
            email,
            experience_years: api.experience_years,
            qualification: api.qualification,
            address: api.address,
        })
    }
}

/// Database response for a doctor
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorDBResponse {
    pub id: DoctorId,
    pub name: String,
    pub specialization: Specialization,
    pub phone: String,
    pub email: String,
    pub experience_years: i32,
    pub qualification: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> DoctorCreate {
        DoctorCreate {
            name: "Dr. Ramesh Gupta".to_string(),
            specialization: Specialization::Cardiology,
            phone: "9876543210".to_string(),
            email: "Dr.Ramesh@AIIMS.org".to_string(),
            experience_years: 15,
            qualification: "MBBS, MD (Cardiology), AIIMS Delhi".to_string(),
            address: "AIIMS, Ansari Nagar, New Delhi - 110029".to_string(),
        }
    }

    #[test]
    fn test_create_normalizes_email() {
        let request = DoctorCreateDBRequest::try_from(valid_create()).unwrap();
        assert_eq!(request.email, "dr.ramesh@aiims.org");
    }

    #[test]
    fn test_create_experience_bounds() {
        for years in [0, 70] {
            let mut api = valid_create();
            api.experience_years = years;
            assert!(DoctorCreateDBRequest::try_from(api).is_ok(), "{years} should be accepted");
        }
        for years in [-1, 71] {
            let mut api = valid_create();
            api.experience_years = years;
            let errors = DoctorCreateDBRequest::try_from(api).unwrap_err();
            assert_eq!(errors.get("experience_years").unwrap(), [EXPERIENCE_YEARS_MESSAGE]);
        }
    }

    #[test]
    fn test_create_collects_every_failing_field() {
        let mut api = valid_create();
        api.phone = "12345".to_string();
        api.email = "nope".to_string();
        api.name = " ".to_string();
        let errors = DoctorCreateDBRequest::try_from(api).unwrap_err();
        assert!(errors.get("phone").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("name").is_some());
    }

    #[test]
    fn test_update_only_checks_supplied_fields() {
        let request = DoctorUpdateDBRequest::try_from(DoctorUpdate {
            experience_years: Some(20),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(request.experience_years, Some(20));
        assert!(request.name.is_none());

        let errors = DoctorUpdateDBRequest::try_from(DoctorUpdate {
            phone: Some("123".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(errors.get("phone").unwrap(), [validation::PHONE_TOO_SHORT]);
    }
}
