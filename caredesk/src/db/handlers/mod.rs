//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed operations for one table
//! - Returns domain models from [`crate::db::models`]
//! - Takes the requesting user explicitly wherever records are owner-scoped
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts and credentials
//! - [`Doctors`]: The global doctor directory ([`Repository`] keyed by `DoctorId`)
//! - [`Patients`]: Patient records ([`Repository`] keyed by `Owned<PatientId>`)
//! - [`Mappings`]: Patient-doctor assignments (create, list, detail and delete only)
//!
//! # Common Pattern
//!
//! ```ignore
//! use caredesk::db::handlers::{Patients, Repository};
//! use caredesk::types::Owned;
//!
//! async fn example(pool: &sqlx::PgPool, owner: UserId, id: PatientId) -> anyhow::Result<()> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Patients::new(&mut tx);
//!
//!     if let Some(patient) = repo.get_by_id(Owned::new(id, owner)).await? {
//!         println!("{}", patient.name);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod doctors;
pub mod mappings;
pub mod patients;
pub mod repository;
pub mod users;

pub use doctors::Doctors;
pub use mappings::Mappings;
pub use patients::Patients;
pub use repository::Repository;
pub use users::Users;
