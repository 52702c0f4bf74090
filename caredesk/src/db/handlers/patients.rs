//! Database repository for patient records.
//!
//! Every query is scoped to the owning user. A patient that exists but belongs to
//! someone else is treated exactly like a patient that does not exist.

use crate::api::models::patients::Gender;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::patients::{PatientCreateDBRequest, PatientDBResponse, PatientUpdateDBRequest},
};
use crate::types::{abbrev_uuid, Owned, PatientId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing patients
#[derive(Debug, Clone)]
pub struct PatientFilter {
    pub owner: UserId,
}

impl PatientFilter {
    pub fn new(owner: UserId) -> Self {
        Self { owner }
    }
}

// Database entity model, joined with the owner's name and email
#[derive(Debug, Clone, FromRow)]
struct Patient {
    pub id: PatientId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub phone: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Patient> for PatientDBResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            owner: patient.user_id,
            owner_name: patient.user_name,
            owner_email: patient.user_email,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            phone: patient.phone,
            address: patient.address,
            medical_history: patient.medical_history,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// Columns selected for a patient row aliased `p`, with its owner aliased `u`
const PATIENT_COLUMNS: &str = "p.id, p.user_id, u.name AS user_name, u.email AS user_email, p.name, p.age, \
     p.gender, p.phone, p.address, p.medical_history, p.created_at, p.updated_at";

pub struct Patients<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Patients<'c> {
    type CreateRequest = PatientCreateDBRequest;
    type UpdateRequest = PatientUpdateDBRequest;
    type Response = PatientDBResponse;
    type Id = Owned<PatientId>;
    type Filter = PatientFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&request.owner)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let query = format!(
            r#"
            WITH p AS (
                INSERT INTO patients (id, user_id, name, age, gender, phone, address, medical_history)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {PATIENT_COLUMNS} FROM p JOIN users u ON u.id = p.user_id
            "#
        );
        let patient = sqlx::query_as::<_, Patient>(&query)
            .bind(Uuid::new_v4())
            .bind(request.owner)
            .bind(&request.name)
            .bind(request.age)
            .bind(request.gender)
            .bind(&request.phone)
            .bind(&request.address)
            .bind(&request.medical_history)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(patient.into())
    }

    #[instrument(skip(self), fields(patient = %id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let query = format!("SELECT {PATIENT_COLUMNS} FROM patients p JOIN users u ON u.id = p.user_id WHERE p.id = $1 AND p.user_id = $2");
        let patient = sqlx::query_as::<_, Patient>(&query)
            .bind(id.id)
            .bind(id.owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(patient.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&filter.owner)), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let query = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients p JOIN users u ON u.id = p.user_id WHERE p.user_id = $1 ORDER BY p.created_at DESC, p.id"
        );
        let patients = sqlx::query_as::<_, Patient>(&query)
            .bind(filter.owner)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(patients.into_iter().map(Into::into).collect())
    }

    /// Mappings for the patient go with it (ON DELETE CASCADE).
    #[instrument(skip(self), fields(patient = %id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1 AND user_id = $2")
            .bind(id.id)
            .bind(id.owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(patient = %id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let query = format!(
            r#"
            WITH p AS (
                UPDATE patients SET
                    name = COALESCE($3, name),
                    age = COALESCE($4, age),
                    gender = COALESCE($5, gender),
                    phone = COALESCE($6, phone),
                    address = COALESCE($7, address),
                    medical_history = CASE
                        WHEN $8 THEN $9
                        ELSE medical_history
                    END,
                    updated_at = NOW()
                WHERE id = $1 AND user_id = $2
                RETURNING *
            )
            SELECT {PATIENT_COLUMNS} FROM p JOIN users u ON u.id = p.user_id
            "#
        );
        let patient = sqlx::query_as::<_, Patient>(&query)
            .bind(id.id)
            .bind(id.owner)
            .bind(&request.name)
            .bind(request.age)
            .bind(request.gender)
            .bind(&request.phone)
            .bind(&request.address)
            .bind(request.medical_history.is_some())
            .bind(request.medical_history.as_ref().and_then(|inner| inner.as_ref()))
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(patient.into())
    }
}

impl<'c> Patients<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// The owner of a patient, regardless of who is asking.
    ///
    /// Only used to tell "no such patient" apart from "someone else's patient" when
    /// assigning doctors; never to return patient data.
    #[instrument(skip(self), fields(patient_id = %abbrev_uuid(&id)), err)]
    pub async fn owner_of(&mut self, id: PatientId) -> Result<Option<UserId>> {
        let owner = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_user, patient_request};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_patient_joins_owner(pool: PgPool) {
        let owner = create_test_user(&pool, "owner@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Patients::new(&mut conn);

        let patient = repo.create(&patient_request(owner.id, "9123456780")).await.unwrap();
        assert_eq!(patient.owner, owner.id);
        assert_eq!(patient.owner_email, "owner@example.com");
        assert_eq!(patient.owner_name, owner.name);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_other_owner_sees_nothing(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let bob = create_test_user(&pool, "bob@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Patients::new(&mut conn);

        let patient = repo.create(&patient_request(alice.id, "9123456780")).await.unwrap();

        assert!(repo.get_by_id(Owned::new(patient.id, alice.id)).await.unwrap().is_some());
        assert!(repo.get_by_id(Owned::new(patient.id, bob.id)).await.unwrap().is_none());
        assert!(repo.list(&PatientFilter::new(bob.id)).await.unwrap().is_empty());

        let err = repo
            .update(
                Owned::new(patient.id, bob.id),
                &PatientUpdateDBRequest {
                    age: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));

        assert!(!repo.delete(Owned::new(patient.id, bob.id)).await.unwrap());
        assert!(repo.get_by_id(Owned::new(patient.id, alice.id)).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_only_own_patients_newest_first(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let bob = create_test_user(&pool, "bob@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Patients::new(&mut conn);

        let first = repo.create(&patient_request(alice.id, "9123456780")).await.unwrap();
        repo.create(&patient_request(bob.id, "9123456781")).await.unwrap();
        let second = repo.create(&patient_request(alice.id, "9123456782")).await.unwrap();

        let ids: Vec<_> = repo
            .list(&PatientFilter::new(alice.id))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_keeps_owner(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Patients::new(&mut conn);

        let patient = repo.create(&patient_request(alice.id, "9123456780")).await.unwrap();
        let updated = repo
            .update(
                Owned::new(patient.id, alice.id),
                &PatientUpdateDBRequest {
                    age: Some(150),
                    medical_history: Some(Some("Asthma".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.age, 150);
        assert_eq!(updated.medical_history.as_deref(), Some("Asthma"));
        assert_eq!(updated.owner, alice.id);
        assert_eq!(updated.name, patient.name);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_of(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Patients::new(&mut conn);

        let patient = repo.create(&patient_request(alice.id, "9123456780")).await.unwrap();
        assert_eq!(repo.owner_of(patient.id).await.unwrap(), Some(alice.id));
        assert_eq!(repo.owner_of(Uuid::new_v4()).await.unwrap(), None);
    }
}
