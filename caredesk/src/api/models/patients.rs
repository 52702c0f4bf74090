//! API request/response models for patient records.

use crate::db::models::patients::PatientDBResponse;
use crate::types::{PatientId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "patient_gender")]
pub enum Gender {
    #[serde(rename = "M")]
    #[sqlx(rename = "M")]
    Male,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    Female,
    #[serde(rename = "O")]
    #[sqlx(rename = "O")]
    Other,
}

/// Patient creation payload. There is no owner field: the owner is always the requester,
/// and an owner supplied in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientCreate {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub medical_history: Option<String>,
}

/// Partial update: omitted fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// None = no change, Some(None) = clear, Some(text) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub medical_history: Option<Option<String>>,
}

// Patient response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PatientId,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    pub medical_history: Option<String>,
    /// Owning user
    #[schema(value_type = String, format = "uuid")]
    pub user: UserId,
    pub user_name: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of successful create and update responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientMutationResponse {
    pub message: String,
    pub patient: PatientResponse,
}

impl From<PatientDBResponse> for PatientResponse {
    fn from(db: PatientDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            age: db.age,
            gender: db.gender,
            phone: db.phone,
            address: db.address,
            medical_history: db.medical_history,
            user: db.owner,
            user_name: db.owner_name,
            user_email: db.owner_email,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
