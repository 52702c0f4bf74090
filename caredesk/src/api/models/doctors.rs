//! API request/response models for the doctor directory.

use crate::db::models::doctors::DoctorDBResponse;
use crate::types::DoctorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Medical specialization of a doctor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "doctor_specialization", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Specialization {
    Cardiology,
    Neurology,
    Orthopedics,
    Pediatrics,
    Gynecology,
    Dermatology,
    Psychiatry,
    General,
    Other,
}

// Doctor request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorCreate {
    pub name: String,
    pub specialization: Specialization,
    pub phone: String,
    pub email: String,
    pub experience_years: i32,
    pub qualification: String,
    pub address: String,
}

/// Partial update: omitted fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub specialization: Option<Specialization>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub experience_years: Option<i32>,
    pub qualification: Option<String>,
    pub address: Option<String>,
}

// Doctor response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorResponse {
    #[schema(value_type = String, format = "uuid")]
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

/// Body of successful create and update responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorMutationResponse {
    pub message: String,
    pub doctor: DoctorResponse,
}

impl From<DoctorDBResponse> for DoctorResponse {
    fn from(db: DoctorDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            specialization: db.specialization,
            phone: db.phone,
            email: db.email,
            experience_years: db.experience_years,
            qualification: db.qualification,
            address: db.address,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
