//! The doctor directory. Doctors are global: any authenticated user may read and edit them.

use crate::{
    api::{
        models::{
            doctors::{DoctorCreate, DoctorMutationResponse, DoctorResponse, DoctorUpdate},
            users::CurrentUser,
            MessageResponse,
        },
        payload::Payload,
    },
    db::{
        handlers::{Doctors, Repository},
        models::doctors::{DoctorCreateDBRequest, DoctorUpdateDBRequest},
    },
    errors::{Error, Result},
    types::DoctorId,
    validation::FieldErrors,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

const DUPLICATE_EMAIL: &str = "A doctor with this email already exists.";

#[utoipa::path(
    get,
    path = "/doctors/",
    tag = "doctors",
    summary = "List doctors",
    description = "All doctors, newest first.",
    responses(
        (status = 200, description = "List of doctors", body = [DoctorResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_doctors(State(state): State<AppState>, _: CurrentUser) -> Result<Json<Vec<DoctorResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let doctors = Doctors::new(&mut conn).list(&()).await?;

    Ok(Json(doctors.into_iter().map(DoctorResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/doctors/",
    tag = "doctors",
    summary = "Create doctor",
    request_body = DoctorCreate,
    responses(
        (status = 201, description = "Doctor created", body = DoctorMutationResponse),
        (status = 400, description = "Invalid request", body = FieldErrors),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_doctor(
    State(state): State<AppState>,
    _: CurrentUser,
    Payload(create): Payload<DoctorCreate>,
) -> Result<(StatusCode, Json<DoctorMutationResponse>)> {
    let request = DoctorCreateDBRequest::try_from(create).map_err(Error::Validation)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let doctor;
    {
        let mut repo = Doctors::new(&mut tx);
        if repo.email_taken(&request.email, None).await? {
            return Err(Error::Validation(FieldErrors::single("email", DUPLICATE_EMAIL)));
        }
        doctor = repo.create(&request).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(DoctorMutationResponse {
            message: "Doctor created successfully".to_string(),
            doctor: doctor.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}/",
    tag = "doctors",
    summary = "Get doctor",
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor", body = DoctorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Doctor not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_doctor(State(state): State<AppState>, Path(id): Path<DoctorId>, _: CurrentUser) -> Result<Json<DoctorResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let doctor = Doctors::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Doctor", id))?;

    Ok(Json(doctor.into()))
}

#[utoipa::path(
    put,
    path = "/doctors/{id}/",
    tag = "doctors",
    summary = "Update doctor",
    description = "Fields left out of the body keep their current value.",
    params(("id" = String, Path, description = "Doctor ID")),
    request_body = DoctorUpdate,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorMutationResponse),
        (status = 400, description = "Invalid request", body = FieldErrors),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Doctor not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<DoctorId>,
    _: CurrentUser,
    Payload(update): Payload<DoctorUpdate>,
) -> Result<Json<DoctorMutationResponse>> {
    let request = DoctorUpdateDBRequest::try_from(update).map_err(Error::Validation)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let doctor;
    {
        let mut repo = Doctors::new(&mut tx);
        if repo.get_by_id(id).await?.is_none() {
            return Err(Error::not_found("Doctor", id));
        }
        if let Some(email) = &request.email {
            if repo.email_taken(email, Some(id)).await? {
                return Err(Error::Validation(FieldErrors::single("email", DUPLICATE_EMAIL)));
            }
        }
        doctor = repo.update(id, &request).await?;
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(DoctorMutationResponse {
        message: "Doctor updated successfully".to_string(),
        doctor: doctor.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/doctors/{id}/",
    tag = "doctors",
    summary = "Delete doctor",
    description = "Also removes every assignment of this doctor.",
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Doctor not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_doctor(State(state): State<AppState>, Path(id): Path<DoctorId>, _: CurrentUser) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !Doctors::new(&mut conn).delete(id).await? {
        return Err(Error::not_found("Doctor", id));
    }

    Ok(Json(MessageResponse::new("Doctor deleted successfully")))
}
