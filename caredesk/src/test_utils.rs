//! Test utilities shared by the unit and integration tests.

use crate::{
    api::models::{doctors::Specialization, patients::Gender, users::CurrentUser},
    auth::{
        password::{self, Argon2Params},
        session::{self, TokenType},
    },
    config::{Config, DatabaseConfig, PasswordConfig, PoolSettings},
    db::{
        handlers::{Doctors, Patients, Repository, Users},
        models::{
            doctors::{DoctorCreateDBRequest, DoctorDBResponse},
            patients::{PatientCreateDBRequest, PatientDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    types::UserId,
};
use sqlx::PgPool;

/// Password given to every user made by [`create_test_user`]
pub const TEST_PASSWORD: &str = "Test@123";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            // Tests hand the pool over directly; this is never dialled
            url: Some("postgresql://localhost/caredesk_test".to_string()),
            pool: PoolSettings {
                max_connections: 1,
                min_connections: 1,
                ..Default::default()
            },
        },
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            password: PasswordConfig {
                // Cheap hashing keeps the suite fast
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

fn test_hash(password: &str) -> String {
    let params = Argon2Params::from(&create_test_config().auth.password);
    password::hash_string_with_params(password, Some(params)).expect("Failed to hash test password")
}

pub async fn create_test_user(pool: &PgPool, email: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let local_part = email.split('@').next().unwrap_or("test");

    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: email.to_lowercase(),
            name: format!("Test User {local_part}"),
            password_hash: test_hash(TEST_PASSWORD),
            is_staff: false,
        })
        .await
        .expect("Failed to create test user")
}

pub fn doctor_request(email: &str) -> DoctorCreateDBRequest {
    DoctorCreateDBRequest {
        name: "Dr. Gregory House".to_string(),
        specialization: Specialization::Cardiology,
        phone: "9876500000".to_string(),
        email: email.to_lowercase(),
        experience_years: 20,
        qualification: "MBBS, MD".to_string(),
        address: "221B Baker Street".to_string(),
    }
}

pub async fn create_test_doctor(pool: &PgPool, email: &str) -> DoctorDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Doctors::new(&mut conn)
        .create(&doctor_request(email))
        .await
        .expect("Failed to create test doctor")
}

pub fn patient_request(owner: UserId, phone: &str) -> PatientCreateDBRequest {
    PatientCreateDBRequest {
        owner,
        name: "Priya Sharma".to_string(),
        age: 34,
        gender: Gender::Female,
        phone: phone.to_string(),
        address: "7 MG Road, Bengaluru".to_string(),
        medical_history: None,
    }
}

pub async fn create_test_patient(pool: &PgPool, owner: UserId, phone: &str) -> PatientDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Patients::new(&mut conn)
        .create(&patient_request(owner, phone))
        .await
        .expect("Failed to create test patient")
}

/// `Authorization` header carrying a fresh access token for `user`
pub fn bearer(user: &UserDBResponse, config: &Config) -> (String, String) {
    let token = session::create_token(&CurrentUser::from(user.clone()), TokenType::Access, config).expect("Failed to create test token");
    ("Authorization".to_string(), format!("Bearer {token}"))
}
