//! Doctor assignments.
//!
//! A mapping belongs to whoever owns its patient. Ownership is re-checked through the
//! patient on every request; reads and deletes of someone else's mapping are 404, while
//! trying to assign a doctor to someone else's patient is a 400 on the `patient` field.

use crate::{
    api::{
        models::{
            mappings::{
                detail_projection, list_projection, MappingCreate, MappingCreatedResponse, MappingDetailResponse,
                MappingListResponse, PatientMappingsResponse,
            },
            users::CurrentUser,
            MessageResponse,
        },
        payload::Payload,
    },
    db::{
        errors::DbError,
        handlers::{Doctors, Mappings, Patients, Repository},
        models::mappings::MappingCreateDBRequest,
    },
    errors::{Error, Result},
    types::{MappingId, Owned, PatientId},
    validation::{FieldErrors, NON_FIELD_ERRORS},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::fmt::Display;

pub const NOT_YOUR_PATIENT: &str = "You can only assign doctors to your own patients.";
pub const DUPLICATE_ASSIGNMENT: &str = "The fields patient, doctor must make a unique set.";

fn invalid_pk(id: impl Display) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

#[utoipa::path(
    get,
    path = "/mappings/",
    tag = "mappings",
    summary = "List own assignments",
    description = "Assignments for all patients of the requesting user, newest first.",
    responses(
        (status = 200, description = "List of assignments", body = [MappingListResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_mappings(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<MappingListResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mappings = Mappings::new(&mut conn).list_for_owner(current_user.id).await?;

    Ok(Json(mappings.into_iter().map(list_projection).collect()))
}

#[utoipa::path(
    post,
    path = "/mappings/",
    tag = "mappings",
    summary = "Assign doctor to patient",
    request_body = MappingCreate,
    responses(
        (status = 201, description = "Doctor assigned", body = MappingCreatedResponse),
        (status = 400, description = "Invalid request, foreign patient, or pair already assigned", body = FieldErrors),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_mapping(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Payload(create): Payload<MappingCreate>,
) -> Result<(StatusCode, Json<MappingCreatedResponse>)> {
    let request = MappingCreateDBRequest {
        owner: current_user.id,
        patient_id: create.patient,
        doctor_id: create.doctor,
        notes: create.notes,
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut errors = FieldErrors::new();
    match Patients::new(&mut tx).owner_of(request.patient_id).await? {
        None => errors.add("patient", invalid_pk(request.patient_id)),
        Some(owner) if owner != current_user.id => errors.add("patient", NOT_YOUR_PATIENT),
        Some(_) => {}
    }
    if Doctors::new(&mut tx).get_by_id(request.doctor_id).await?.is_none() {
        errors.add("doctor", invalid_pk(request.doctor_id));
    }
    errors.into_result()?;

    let mut repo = Mappings::new(&mut tx);
    if repo.pair_exists(request.patient_id, request.doctor_id).await? {
        return Err(Error::Validation(FieldErrors::single(NON_FIELD_ERRORS, DUPLICATE_ASSIGNMENT)));
    }

    let mapping = match repo.create(&request).await {
        Ok(mapping) => mapping,
        // The patient was deleted or changed hands after the check above
        Err(DbError::NotFound) => {
            return Err(Error::Validation(FieldErrors::single("patient", invalid_pk(request.patient_id))));
        }
        Err(e) => return Err(e.into()),
    };

    // A concurrent assignment of the same pair surfaces here as a unique violation
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(MappingCreatedResponse {
            message: "Doctor assigned to patient successfully".to_string(),
            mapping: list_projection(mapping),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/mappings/{patient_id}/",
    tag = "mappings",
    summary = "List doctors of a patient",
    params(("patient_id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The patient's assignments", body = PatientMappingsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found or owned by another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_patient_mappings(
    State(state): State<AppState>,
    Path(patient_id): Path<PatientId>,
    current_user: CurrentUser,
) -> Result<Json<PatientMappingsResponse>> {
    let key = Owned::new(patient_id, current_user.id);
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let patient = Patients::new(&mut tx)
        .get_by_id(key)
        .await?
        .ok_or_else(|| Error::not_found("Patient", patient_id))?;
    let mappings = Mappings::new(&mut tx).list_for_patient(key).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(PatientMappingsResponse {
        patient_id: patient.id,
        patient_name: patient.name,
        doctors: mappings.into_iter().map(list_projection).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/mappings/detail/{id}/",
    tag = "mappings",
    summary = "Get assignment",
    params(("id" = String, Path, description = "Mapping ID")),
    responses(
        (status = 200, description = "Assignment with full patient and doctor records", body = MappingDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Mapping not found or its patient is owned by another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_mapping(
    State(state): State<AppState>,
    Path(id): Path<MappingId>,
    current_user: CurrentUser,
) -> Result<Json<MappingDetailResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let detail = Mappings::new(&mut tx)
        .get_detail(Owned::new(id, current_user.id))
        .await?
        .ok_or_else(|| Error::not_found("Mapping", id))?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(detail_projection(detail)))
}

#[utoipa::path(
    delete,
    path = "/mappings/detail/{id}/",
    tag = "mappings",
    summary = "Remove doctor from patient",
    params(("id" = String, Path, description = "Mapping ID")),
    responses(
        (status = 200, description = "Assignment deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Mapping not found or its patient is owned by another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_mapping(
    State(state): State<AppState>,
    Path(id): Path<MappingId>,
    current_user: CurrentUser,
) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Mappings::new(&mut conn).delete(Owned::new(id, current_user.id)).await? {
        return Err(Error::not_found("Mapping", id));
    }

    Ok(Json(MessageResponse::new("Doctor removed from patient successfully")))
}
