//! Database repository for patient-doctor assignments.
//!
//! Mappings carry no owner column of their own. Every query joins `patients` and checks
//! `patients.user_id` against the requester, so ownership is always the patient's
//! ownership at the moment the query runs.
//!
//! Mappings cannot be edited, so [`Mappings`] does not implement
//! [`Repository`](super::Repository) and only exposes the operations it supports.

use crate::api::models::doctors::Specialization;
use crate::db::{
    errors::{DbError, Result},
    handlers::{repository::Repository, Doctors, Patients},
    models::mappings::{MappingCreateDBRequest, MappingDBResponse, MappingDetailDBResponse},
};
use crate::types::{abbrev_uuid, DoctorId, MappingId, Owned, PatientId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model, joined with patient and doctor names
#[derive(Debug, Clone, FromRow)]
struct Mapping {
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

impl From<Mapping> for MappingDBResponse {
    fn from(mapping: Mapping) -> Self {
        Self {
            id: mapping.id,
            patient_id: mapping.patient_id,
            doctor_id: mapping.doctor_id,
            patient_name: mapping.patient_name,
            doctor_name: mapping.doctor_name,
            doctor_specialization: mapping.doctor_specialization,
            assigned_date: mapping.assigned_date,
            notes: mapping.notes,
            created_at: mapping.created_at,
            updated_at: mapping.updated_at,
        }
    }
}

/// Columns selected for a mapping aliased `m` joined to its patient `p` and doctor `d`
const MAPPING_COLUMNS: &str = "m.id, m.patient_id, m.doctor_id, p.name AS patient_name, d.name AS doctor_name, \
     d.specialization AS doctor_specialization, m.assigned_date, m.notes, m.created_at, m.updated_at";

const MAPPING_JOINS: &str = "JOIN patients p ON p.id = m.patient_id JOIN doctors d ON d.id = m.doctor_id";

pub struct Mappings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Mappings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Assign a doctor to a patient.
    ///
    /// The insert is conditional on `request.owner` owning the patient; if they do not,
    /// nothing is written and `DbError::NotFound` is returned. A second mapping for the
    /// same pair fails with a unique violation. `assigned_date` defaults to today.
    #[instrument(skip(self, request), fields(
        owner = %abbrev_uuid(&request.owner),
        patient_id = %abbrev_uuid(&request.patient_id),
        doctor_id = %abbrev_uuid(&request.doctor_id),
    ), err)]
    pub async fn create(&mut self, request: &MappingCreateDBRequest) -> Result<MappingDBResponse> {
        let query = format!(
            r#"
            WITH m AS (
                INSERT INTO patient_doctor_mappings (id, patient_id, doctor_id, notes)
                SELECT $1, $2, $3, $4
                WHERE EXISTS (SELECT 1 FROM patients WHERE id = $2 AND user_id = $5)
                RETURNING *
            )
            SELECT {MAPPING_COLUMNS} FROM m {MAPPING_JOINS}
            "#
        );
        let mapping = sqlx::query_as::<_, Mapping>(&query)
            .bind(Uuid::new_v4())
            .bind(request.patient_id)
            .bind(request.doctor_id)
            .bind(&request.notes)
            .bind(request.owner)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(mapping.into())
    }

    /// All mappings whose patient belongs to `owner`, newest first
    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner)), err)]
    pub async fn list_for_owner(&mut self, owner: UserId) -> Result<Vec<MappingDBResponse>> {
        let query = format!("SELECT {MAPPING_COLUMNS} FROM patient_doctor_mappings m {MAPPING_JOINS} WHERE p.user_id = $1 ORDER BY m.created_at DESC, m.id");
        let mappings = sqlx::query_as::<_, Mapping>(&query)
            .bind(owner)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(mappings.into_iter().map(Into::into).collect())
    }

    /// All mappings of one patient, empty if the patient is not owned by `patient.owner`
    #[instrument(skip(self), fields(patient = %patient), err)]
    pub async fn list_for_patient(&mut self, patient: Owned<PatientId>) -> Result<Vec<MappingDBResponse>> {
        let query = format!(
            "SELECT {MAPPING_COLUMNS} FROM patient_doctor_mappings m {MAPPING_JOINS} WHERE m.patient_id = $1 AND p.user_id = $2 ORDER BY m.created_at DESC, m.id"
        );
        let mappings = sqlx::query_as::<_, Mapping>(&query)
            .bind(patient.id)
            .bind(patient.owner)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(mappings.into_iter().map(Into::into).collect())
    }

    /// Whether the (patient, doctor) pair is already mapped
    #[instrument(skip(self), err)]
    pub async fn pair_exists(&mut self, patient_id: PatientId, doctor_id: DoctorId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM patient_doctor_mappings WHERE patient_id = $1 AND doctor_id = $2)",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(exists)
    }

    /// A mapping with the full patient and doctor records, if `id.owner` owns its patient
    #[instrument(skip(self), fields(mapping = %id), err)]
    pub async fn get_detail(&mut self, id: Owned<MappingId>) -> Result<Option<MappingDetailDBResponse>> {
        let query = format!("SELECT {MAPPING_COLUMNS} FROM patient_doctor_mappings m {MAPPING_JOINS} WHERE m.id = $1 AND p.user_id = $2");
        let Some(mapping) = sqlx::query_as::<_, Mapping>(&query)
            .bind(id.id)
            .bind(id.owner)
            .fetch_optional(&mut *self.db)
            .await?
        else {
            return Ok(None);
        };

        let patient = Patients::new(&mut *self.db)
            .get_by_id(Owned::new(mapping.patient_id, id.owner))
            .await?;
        let doctor = Doctors::new(&mut *self.db).get_by_id(mapping.doctor_id).await?;

        Ok(match (patient, doctor) {
            (Some(patient), Some(doctor)) => Some(MappingDetailDBResponse {
                mapping: mapping.into(),
                patient,
                doctor,
            }),
            // Deleted between the two reads
            _ => None,
        })
    }

    /// Delete a mapping if `id.owner` owns its patient
    #[instrument(skip(self), fields(mapping = %id), err)]
    pub async fn delete(&mut self, id: Owned<MappingId>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM patient_doctor_mappings m
            USING patients p
            WHERE m.id = $1 AND p.id = m.patient_id AND p.user_id = $2
            "#,
        )
        .bind(id.id)
        .bind(id.owner)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_doctor, create_test_patient, create_test_user};
    use sqlx::PgPool;

    fn assign(owner: UserId, patient_id: PatientId, doctor_id: DoctorId) -> MappingCreateDBRequest {
        MappingCreateDBRequest {
            owner,
            patient_id,
            doctor_id,
            notes: Some("Regular checkup".to_string()),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_mapping(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let patient = create_test_patient(&pool, alice.id, "9123456780").await;
        let doctor = create_test_doctor(&pool, "dr@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Mappings::new(&mut conn);

        let mapping = repo.create(&assign(alice.id, patient.id, doctor.id)).await.unwrap();
        assert_eq!(mapping.patient_id, patient.id);
        assert_eq!(mapping.doctor_id, doctor.id);
        assert_eq!(mapping.patient_name, patient.name);
        assert_eq!(mapping.doctor_name, doctor.name);
        assert_eq!(mapping.doctor_specialization, doctor.specialization);
        // CURRENT_DATE follows the database session time zone
        assert!((Utc::now().date_naive() - mapping.assigned_date).num_days().abs() <= 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_pair_is_rejected(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let patient = create_test_patient(&pool, alice.id, "9123456780").await;
        let doctor = create_test_doctor(&pool, "dr@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Mappings::new(&mut conn);

        assert!(!repo.pair_exists(patient.id, doctor.id).await.unwrap());
        repo.create(&assign(alice.id, patient.id, doctor.id)).await.unwrap();
        assert!(repo.pair_exists(patient.id, doctor.id).await.unwrap());

        let err = repo.create(&assign(alice.id, patient.id, doctor.id)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(err.constraint(), Some("patient_doctor_mappings_patient_doctor_key"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_for_foreign_patient_writes_nothing(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let bob = create_test_user(&pool, "bob@example.com").await;
        let patient = create_test_patient(&pool, alice.id, "9123456780").await;
        let doctor = create_test_doctor(&pool, "dr@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Mappings::new(&mut conn);

        let err = repo.create(&assign(bob.id, patient.id, doctor.id)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
        assert!(!repo.pair_exists(patient.id, doctor.id).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_scoped_reads_and_delete(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let bob = create_test_user(&pool, "bob@example.com").await;
        let patient = create_test_patient(&pool, alice.id, "9123456780").await;
        let doctor = create_test_doctor(&pool, "dr@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Mappings::new(&mut conn);

        let mapping = repo.create(&assign(alice.id, patient.id, doctor.id)).await.unwrap();

        assert_eq!(repo.list_for_owner(alice.id).await.unwrap().len(), 1);
        assert!(repo.list_for_owner(bob.id).await.unwrap().is_empty());
        assert_eq!(repo.list_for_patient(Owned::new(patient.id, alice.id)).await.unwrap().len(), 1);
        assert!(repo.list_for_patient(Owned::new(patient.id, bob.id)).await.unwrap().is_empty());

        let detail = repo.get_detail(Owned::new(mapping.id, alice.id)).await.unwrap().unwrap();
        assert_eq!(detail.patient.id, patient.id);
        assert_eq!(detail.doctor.id, doctor.id);
        assert!(repo.get_detail(Owned::new(mapping.id, bob.id)).await.unwrap().is_none());

        assert!(!repo.delete(Owned::new(mapping.id, bob.id)).await.unwrap());
        assert!(repo.delete(Owned::new(mapping.id, alice.id)).await.unwrap());
        assert!(repo.get_detail(Owned::new(mapping.id, alice.id)).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_doctor_cascades(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let first = create_test_patient(&pool, alice.id, "9123456780").await;
        let second = create_test_patient(&pool, alice.id, "9123456781").await;
        let doctor = create_test_doctor(&pool, "dr@example.com").await;
        let mut conn = pool.acquire().await.unwrap();

        Mappings::new(&mut conn).create(&assign(alice.id, first.id, doctor.id)).await.unwrap();
        Mappings::new(&mut conn).create(&assign(alice.id, second.id, doctor.id)).await.unwrap();

        assert!(Doctors::new(&mut conn).delete(doctor.id).await.unwrap());

        let mut repo = Mappings::new(&mut conn);
        assert!(repo.list_for_owner(alice.id).await.unwrap().is_empty());
        assert!(repo.list_for_patient(Owned::new(first.id, alice.id)).await.unwrap().is_empty());
        assert!(repo.list_for_patient(Owned::new(second.id, alice.id)).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_patient_cascades(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let patient = create_test_patient(&pool, alice.id, "9123456780").await;
        let doctor = create_test_doctor(&pool, "dr@example.com").await;
        let mut conn = pool.acquire().await.unwrap();

        Mappings::new(&mut conn).create(&assign(alice.id, patient.id, doctor.id)).await.unwrap();
        assert!(Patients::new(&mut conn).delete(Owned::new(patient.id, alice.id)).await.unwrap());

        assert!(!Mappings::new(&mut conn).pair_exists(patient.id, doctor.id).await.unwrap());
    }
}
