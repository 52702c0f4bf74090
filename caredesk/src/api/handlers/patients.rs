//! Patient records, visible only to the user who created them.
//!
//! Every lookup is keyed by [`Owned`], so a patient belonging to someone else is
//! indistinguishable from one that does not exist (404).

use crate::{
    api::{
        models::{
            patients::{PatientCreate, PatientMutationResponse, PatientResponse, PatientUpdate},
            users::CurrentUser,
            MessageResponse,
        },
        payload::Payload,
    },
    db::{
        errors::DbError,
        handlers::{patients::PatientFilter, Patients, Repository},
        models::patients::{PatientCreateDBRequest, PatientUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Owned, PatientId},
    validation::FieldErrors,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

#[utoipa::path(
    get,
    path = "/patients/",
    tag = "patients",
    summary = "List own patients",
    description = "Patients created by the requesting user, newest first.",
    responses(
        (status = 200, description = "List of patients", body = [PatientResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_patients(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<PatientResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let patients = Patients::new(&mut conn).list(&PatientFilter::new(current_user.id)).await?;

    Ok(Json(patients.into_iter().map(PatientResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/patients/",
    tag = "patients",
    summary = "Create patient",
    description = "The requesting user becomes the owner; any owner in the body is ignored.",
    request_body = PatientCreate,
    responses(
        (status = 201, description = "Patient created", body = PatientMutationResponse),
        (status = 400, description = "Invalid request", body = FieldErrors),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_patient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Payload(create): Payload<PatientCreate>,
) -> Result<(StatusCode, Json<PatientMutationResponse>)> {
    let request = PatientCreateDBRequest::new(current_user.id, create).map_err(Error::Validation)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let patient = Patients::new(&mut conn).create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(PatientMutationResponse {
            message: "Patient created successfully".to_string(),
            patient: patient.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/",
    tag = "patients",
    summary = "Get patient",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient", body = PatientResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found or owned by another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<PatientId>,
    current_user: CurrentUser,
) -> Result<Json<PatientResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let patient = Patients::new(&mut conn)
        .get_by_id(Owned::new(id, current_user.id))
        .await?
        .ok_or_else(|| Error::not_found("Patient", id))?;

    Ok(Json(patient.into()))
}

#[utoipa::path(
    put,
    path = "/patients/{id}/",
    tag = "patients",
    summary = "Update patient",
    description = "Fields left out of the body keep their current value. The owner cannot be changed.",
    params(("id" = String, Path, description = "Patient ID")),
    request_body = PatientUpdate,
    responses(
        (status = 200, description = "Patient updated", body = PatientMutationResponse),
        (status = 400, description = "Invalid request", body = FieldErrors),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found or owned by another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<PatientId>,
    current_user: CurrentUser,
    Payload(update): Payload<PatientUpdate>,
) -> Result<Json<PatientMutationResponse>> {
    let request = PatientUpdateDBRequest::try_from(update).map_err(Error::Validation)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let patient = match Patients::new(&mut conn).update(Owned::new(id, current_user.id), &request).await {
        Ok(patient) => patient,
        Err(DbError::NotFound) => return Err(Error::not_found("Patient", id)),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(PatientMutationResponse {
        message: "Patient updated successfully".to_string(),
        patient: patient.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}/",
    tag = "patients",
    summary = "Delete patient",
    description = "Also removes every doctor assignment of this patient.",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found or owned by another user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<PatientId>,
    current_user: CurrentUser,
) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Patients::new(&mut conn).delete(Owned::new(id, current_user.id)).await? {
        return Err(Error::not_found("Patient", id));
    }

    Ok(Json(MessageResponse::new("Patient deleted successfully")))
}
