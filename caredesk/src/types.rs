//! Common type definitions shared across layers.
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`DoctorId`]: Doctor directory entry identifier
//! - [`PatientId`]: Patient record identifier
//! - [`MappingId`]: Patient-doctor assignment identifier
//!
//! # Owner-scoped keys
//!
//! Patients, and through them mappings, belong to exactly one user. Lookups on those
//! entities take an [`Owned`] key so the requesting identity always travels with the id
//! down to the query that enforces it.
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type DoctorId = Uuid;
pub type PatientId = Uuid;
pub type MappingId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// An entity id paired with the user requesting access to it.
///
/// Repositories only return or touch the entity when `owner` owns it; a record that
/// exists under a different owner is indistinguishable from one that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owned<I> {
    pub id: I,
    pub owner: UserId,
}

impl<I> Owned<I> {
    pub fn new(id: I, owner: UserId) -> Self {
        Self { id, owner }
    }
}

impl fmt::Display for Owned<Uuid> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (owner {})", abbrev_uuid(&self.id), abbrev_uuid(&self.owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }

    #[test]
    fn test_owned_display() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let owner = Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
        assert_eq!(Owned::new(id, owner).to_string(), "550e8400 (owner 123e4567)");
    }
}
