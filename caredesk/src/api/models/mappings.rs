//! API request/response models for patient-doctor assignments.
//!
//! A mapping is rendered two ways: [`list_projection`] for listings and the create
//! response, and [`detail_projection`] for the single-mapping view that embeds the full
//! patient and doctor records.

use crate::api::models::{doctors::DoctorResponse, doctors::Specialization, patients::PatientResponse};
use crate::db::models::mappings::{MappingDBResponse, MappingDetailDBResponse};
use crate::types::{DoctorId, MappingId, PatientId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MappingCreate {
    #[schema(value_type = String, format = "uuid")]
    pub patient: PatientId,
    #[schema(value_type = String, format = "uuid")]
    pub doctor: DoctorId,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Mapping as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MappingListResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MappingId,
    #[schema(value_type = String, format = "uuid")]
    pub patient: PatientId,
    #[schema(value_type = String, format = "uuid")]
    pub doctor: DoctorId,
    pub patient_name: String,
    pub doctor_name: String,
    pub doctor_specialization: Specialization,
    pub assigned_date: NaiveDate,
    pub notes: Option<String>,
}

/// Mapping with the full patient and doctor records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MappingDetailResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MappingId,
    #[schema(value_type = String, format = "uuid")]
    pub patient: PatientId,
    #[schema(value_type = String, format = "uuid")]
    pub doctor: DoctorId,
    pub patient_name: String,
    pub doctor_name: String,
    pub patient_details: PatientResponse,
    pub doctor_details: DoctorResponse,
    pub assigned_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All doctors assigned to one patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientMappingsResponse {
    #[schema(value_type = String, format = "uuid")]
    pub patient_id: PatientId,
    pub patient_name: String,
    pub doctors: Vec<MappingListResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MappingCreatedResponse {
    pub message: String,
    pub mapping: MappingListResponse,
}

pub fn list_projection(db: MappingDBResponse) -> MappingListResponse {
    MappingListResponse {
        id: db.id,
        patient: db.patient_id,
        doctor: db.doctor_id,
        patient_name: db.patient_name,
        doctor_name: db.doctor_name,
        doctor_specialization: db.doctor_specialization,
        assigned_date: db.assigned_date,
        notes: db.notes,
    }
}

pub fn detail_projection(db: MappingDetailDBResponse) -> MappingDetailResponse {
    let MappingDetailDBResponse { mapping, patient, doctor } = db;
    MappingDetailResponse {
        id: mapping.id,
        patient: mapping.patient_id,
        doctor: mapping.doctor_id,
        patient_name: mapping.patient_name,
        doctor_name: mapping.doctor_name,
        patient_details: patient.into(),
        doctor_details: doctor.into(),
        assigned_date: mapping.assigned_date,
        notes: mapping.notes,
        created_at: mapping.created_at,
        updated_at: mapping.updated_at,
    }
}
