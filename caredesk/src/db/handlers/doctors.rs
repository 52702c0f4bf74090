//! Database repository for the doctor directory.
//!
//! Doctors are not owned by anyone: every authenticated user sees and may modify every
//! entry, so lookups are keyed by the bare [`DoctorId`].

use crate::api::models::doctors::Specialization;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::doctors::{DoctorCreateDBRequest, DoctorDBResponse, DoctorUpdateDBRequest},
};
use crate::types::{abbrev_uuid, DoctorId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Doctor {
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

impl From<Doctor> for DoctorDBResponse {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            specialization: doctor.specialization,
            phone: doctor.phone,
            email: doctor.email,
            experience_years: doctor.experience_years,
            qualification: doctor.qualification,
            address: doctor.address,
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        }
    }
}

pub struct Doctors<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Doctors<'c> {
    type CreateRequest = DoctorCreateDBRequest;
    type UpdateRequest = DoctorUpdateDBRequest;
    type Response = DoctorDBResponse;
    type Id = DoctorId;
    type Filter = ();

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let doctor = sqlx::query_as::<_, Doctor>(
            r#"
            INSERT INTO doctors (id, name, specialization, phone, email, experience_years, qualification, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(request.specialization)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(request.experience_years)
        .bind(&request.qualification)
        .bind(&request.address)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(doctor.into())
    }

    #[instrument(skip(self), fields(doctor_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let doctor = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(doctor.map(Into::into))
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let doctors = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors ORDER BY created_at DESC, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(doctors.into_iter().map(Into::into).collect())
    }

    /// Mappings referencing the doctor go with it (ON DELETE CASCADE).
    #[instrument(skip(self), fields(doctor_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(doctor_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let doctor = sqlx::query_as::<_, Doctor>(
            r#"
            UPDATE doctors SET
                name = COALESCE($2, name),
                specialization = COALESCE($3, specialization),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                experience_years = COALESCE($6, experience_years),
                qualification = COALESCE($7, qualification),
                address = COALESCE($8, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.specialization)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(request.experience_years)
        .bind(&request.qualification)
        .bind(&request.address)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(doctor.into())
    }
}

impl<'c> Doctors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Whether another doctor already uses `email`, ignoring the doctor being updated
    #[instrument(skip(self, email), err)]
    pub async fn email_taken(&mut self, email: &str, exclude: Option<DoctorId>) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM doctors WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(taken)
    }
}
