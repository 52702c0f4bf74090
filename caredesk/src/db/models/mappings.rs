//! Database models for patient-doctor assignments.

use crate::api::models::doctors::Specialization;
use crate::db::models::{doctors::DoctorDBResponse, patients::PatientDBResponse};
use crate::types::{DoctorId, MappingId, PatientId, UserId};
use chrono::{DateTime, NaiveDate, Utc};

/// Database request for assigning a doctor to a patient.
///
/// The insert only happens if `owner` owns the patient at the time of the write.
#[derive(Debug, Clone)]
pub struct MappingCreateDBRequest {
    pub owner: UserId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub notes: Option<String>,
}

/// Database response for a mapping, joined with the names shown in listings
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDBResponse {
    pub id: MappingId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub patient_name: String,
    pub doctor_name: String,
    pub doctor_specialization: Specialization,
    pub assigned_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A mapping together with the full patient and doctor records it links
#[derive(Debug, Clone)]
pub struct MappingDetailDBResponse {
    pub mapping: MappingDBResponse,
    pub patient: PatientDBResponse,
    pub doctor: DoctorDBResponse,
}
