//! End-to-end tests: the full application stack driven over HTTP.

use crate::{
    Application, create_initial_admin_user,
    api::{
        handlers::mappings::{DUPLICATE_ASSIGNMENT, NOT_YOUR_PATIENT},
        models::{
            auth::AuthResponse,
            doctors::DoctorMutationResponse,
            mappings::{MappingCreatedResponse, MappingDetailResponse, MappingListResponse, PatientMappingsResponse},
            patients::{PatientMutationResponse, PatientResponse},
        },
    },
    auth::password,
    db::handlers::Users,
    test_utils::create_test_config,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use sqlx::PgPool;

fn server(pool: PgPool) -> TestServer {
    Application::new_with_pool(create_test_config(), pool)
        .expect("Failed to create application")
        .into_test_server()
}

/// Register an account and return its `Authorization` header
async fn register(server: &TestServer, email: &str) -> (String, String) {
    let response = server
        .post("/api/auth/register/")
        .json(&json!({
            "email": email,
            "name": "Nurse Joy",
            "password": "Clinic@2024",
            "password_confirm": "Clinic@2024",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: AuthResponse = response.json();
    ("Authorization".to_string(), format!("Bearer {}", body.tokens.access))
}

fn doctor_body(email: &str) -> Value {
    json!({
        "name": "Dr. Arjun Mehta",
        "specialization": "NEUROLOGY",
        "phone": "9876543214",
        "email": email,
        "experience_years": 20,
        "qualification": "MBBS, DM (Neurology)",
        "address": "Saket, New Delhi",
    })
}

fn patient_body(name: &str, phone: &str) -> Value {
    json!({
        "name": name,
        "age": 52,
        "gender": "M",
        "phone": phone,
        "address": "Rohini Sector 15, New Delhi",
        "medical_history": "Migraine",
    })
}

async fn create_doctor(server: &TestServer, auth: &(String, String), email: &str) -> DoctorMutationResponse {
    let response = server.post("/api/doctors/").add_header(&auth.0, &auth.1).json(&doctor_body(email)).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn create_patient(server: &TestServer, auth: &(String, String), name: &str, phone: &str) -> PatientResponse {
    let response = server
        .post("/api/patients/")
        .add_header(&auth.0, &auth.1)
        .json(&patient_body(name, phone))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<PatientMutationResponse>().patient
}

async fn assign(server: &TestServer, auth: &(String, String), patient: &PatientResponse, doctor: &DoctorMutationResponse) -> MappingListResponse {
    let response = server
        .post("/api/mappings/")
        .add_header(&auth.0, &auth.1)
        .json(&json!({"patient": patient.id, "doctor": doctor.doctor.id, "notes": "Follow-up in two weeks"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<MappingCreatedResponse>().mapping
}

/// A user's whole journey: register, add a patient and a doctor, assign, inspect, unassign.
#[sqlx::test]
#[test_log::test]
async fn test_full_clinic_journey(pool: PgPool) {
    let server = server(pool);
    let auth = register(&server, "joy@clinic.example").await;

    let doctor = create_doctor(&server, &auth, "arjun@max.example").await;
    let patient = create_patient(&server, &auth, "Vijay Kumar", "9123456784").await;
    assert_eq!(patient.user_email, "joy@clinic.example");

    let mapping = assign(&server, &auth, &patient, &doctor).await;
    assert_eq!(mapping.patient_name, "Vijay Kumar");
    assert_eq!(mapping.doctor_name, "Dr. Arjun Mehta");

    let by_patient: PatientMappingsResponse = server
        .get(&format!("/api/mappings/{}/", patient.id))
        .add_header(&auth.0, &auth.1)
        .await
        .json();
    assert_eq!(by_patient.patient_id, patient.id);
    assert_eq!(by_patient.patient_name, "Vijay Kumar");
    assert_eq!(by_patient.doctors.len(), 1);

    let detail: MappingDetailResponse = server
        .get(&format!("/api/mappings/detail/{}/", mapping.id))
        .add_header(&auth.0, &auth.1)
        .await
        .json();
    assert_eq!(detail.patient_details.medical_history.as_deref(), Some("Migraine"));
    assert_eq!(detail.doctor_details.email, "arjun@max.example");
    assert_eq!(detail.notes.as_deref(), Some("Follow-up in two weeks"));

    let response = server
        .delete(&format!("/api/mappings/detail/{}/", mapping.id))
        .add_header(&auth.0, &auth.1)
        .await;
    response.assert_status_ok();

    let listed: Vec<MappingListResponse> = server.get("/api/mappings/").add_header(&auth.0, &auth.1).await.json();
    assert!(listed.is_empty());
}

#[sqlx::test]
#[test_log::test]
async fn test_owners_never_see_each_others_records(pool: PgPool) {
    let server = server(pool);
    let alice = register(&server, "alice@clinic.example").await;
    let bob = register(&server, "bob@clinic.example").await;

    let doctor = create_doctor(&server, &alice, "shared@clinic.example").await;
    let alices_patient = create_patient(&server, &alice, "Anita Verma", "9123456781").await;
    let bobs_patient = create_patient(&server, &bob, "Arun Singh", "9123456786").await;
    let alices_mapping = assign(&server, &alice, &alices_patient, &doctor).await;
    assign(&server, &bob, &bobs_patient, &doctor).await;

    // The doctor directory is shared
    let doctors: Vec<Value> = server.get("/api/doctors/").add_header(&bob.0, &bob.1).await.json();
    assert_eq!(doctors.len(), 1);

    // Patients and mappings are not
    let patients: Vec<PatientResponse> = server.get("/api/patients/").add_header(&bob.0, &bob.1).await.json();
    assert_eq!(patients.iter().map(|p| p.id).collect::<Vec<_>>(), vec![bobs_patient.id]);

    let mappings: Vec<MappingListResponse> = server.get("/api/mappings/").add_header(&bob.0, &bob.1).await.json();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].patient, bobs_patient.id);

    for path in [
        format!("/api/patients/{}/", alices_patient.id),
        format!("/api/mappings/{}/", alices_patient.id),
        format!("/api/mappings/detail/{}/", alices_mapping.id),
    ] {
        server.get(&path).add_header(&bob.0, &bob.1).await.assert_status_not_found();
    }
    server
        .delete(&format!("/api/mappings/detail/{}/", alices_mapping.id))
        .add_header(&bob.0, &bob.1)
        .await
        .assert_status_not_found();

    // Alice's mapping survived Bob's attempt
    server
        .get(&format!("/api/mappings/detail/{}/", alices_mapping.id))
        .add_header(&alice.0, &alice.1)
        .await
        .assert_status_ok();
}

#[sqlx::test]
#[test_log::test]
async fn test_cross_owner_assignment_is_rejected_and_not_persisted(pool: PgPool) {
    let server = server(pool.clone());
    let alice = register(&server, "alice@clinic.example").await;
    let bob = register(&server, "bob@clinic.example").await;

    let doctor = create_doctor(&server, &alice, "dr@clinic.example").await;
    let alices_patient = create_patient(&server, &alice, "Lakshmi Nair", "9123456783").await;

    let response = server
        .post("/api/mappings/")
        .add_header(&bob.0, &bob.1)
        .json(&json!({"patient": alices_patient.id, "doctor": doctor.doctor.id}))
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({"patient": [NOT_YOUR_PATIENT]}));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patient_doctor_mappings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[sqlx::test]
#[test_log::test]
async fn test_same_doctor_assigned_once_per_patient(pool: PgPool) {
    let server = server(pool);
    let auth = register(&server, "joy@clinic.example").await;

    let doctor = create_doctor(&server, &auth, "dr@clinic.example").await;
    let first_patient = create_patient(&server, &auth, "Suresh Sharma", "9123456780").await;
    let second_patient = create_patient(&server, &auth, "Deepa Reddy", "9123456785").await;

    assign(&server, &auth, &first_patient, &doctor).await;

    let response = server
        .post("/api/mappings/")
        .add_header(&auth.0, &auth.1)
        .json(&json!({"patient": first_patient.id, "doctor": doctor.doctor.id}))
        .await;
    response.assert_status_bad_request();
    response.assert_json(&json!({"non_field_errors": [DUPLICATE_ASSIGNMENT]}));

    // The same doctor on a different patient is fine
    assign(&server, &auth, &second_patient, &doctor).await;
}

#[sqlx::test]
#[test_log::test]
async fn test_deleting_a_doctor_removes_its_assignments(pool: PgPool) {
    let server = server(pool);
    let auth = register(&server, "joy@clinic.example").await;

    let leaving = create_doctor(&server, &auth, "leaving@clinic.example").await;
    let staying = create_doctor(&server, &auth, "staying@clinic.example").await;
    let first = create_patient(&server, &auth, "Ramesh Patil", "9123456782").await;
    let second = create_patient(&server, &auth, "Pooja Kapoor", "9123456787").await;

    assign(&server, &auth, &first, &leaving).await;
    assign(&server, &auth, &second, &leaving).await;
    assign(&server, &auth, &first, &staying).await;

    server
        .delete(&format!("/api/doctors/{}/", leaving.doctor.id))
        .add_header(&auth.0, &auth.1)
        .await
        .assert_status_ok();

    let mappings: Vec<MappingListResponse> = server.get("/api/mappings/").add_header(&auth.0, &auth.1).await.json();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].doctor, staying.doctor.id);

    let by_patient: PatientMappingsResponse = server
        .get(&format!("/api/mappings/{}/", second.id))
        .add_header(&auth.0, &auth.1)
        .await
        .json();
    assert!(by_patient.doctors.is_empty());
}

#[sqlx::test]
#[test_log::test]
async fn test_deleting_a_patient_removes_its_assignments(pool: PgPool) {
    let server = server(pool);
    let auth = register(&server, "joy@clinic.example").await;

    let doctor = create_doctor(&server, &auth, "dr@clinic.example").await;
    let patient = create_patient(&server, &auth, "Suresh Sharma", "9123456780").await;
    let mapping = assign(&server, &auth, &patient, &doctor).await;

    server
        .delete(&format!("/api/patients/{}/", patient.id))
        .add_header(&auth.0, &auth.1)
        .await
        .assert_status_ok();

    server
        .get(&format!("/api/mappings/detail/{}/", mapping.id))
        .add_header(&auth.0, &auth.1)
        .await
        .assert_status_not_found();
    server
        .get(&format!("/api/mappings/{}/", patient.id))
        .add_header(&auth.0, &auth.1)
        .await
        .assert_status_not_found();

    // The doctor itself is untouched
    server
        .get(&format!("/api/doctors/{}/", doctor.doctor.id))
        .add_header(&auth.0, &auth.1)
        .await
        .assert_status_ok();
}

#[sqlx::test]
#[test_log::test]
async fn test_data_routes_require_a_token(pool: PgPool) {
    let server = server(pool);
    let id = uuid::Uuid::new_v4();

    for path in [
        "/api/doctors/".to_string(),
        format!("/api/doctors/{id}/"),
        "/api/patients/".to_string(),
        format!("/api/patients/{id}/"),
        "/api/mappings/".to_string(),
        format!("/api/mappings/{id}/"),
        format!("/api/mappings/detail/{id}/"),
    ] {
        let response = server.get(&path).await;
        response.assert_status_unauthorized();
    }

    let response = server
        .get("/api/patients/")
        .add_header("Authorization", "Bearer not-a-token")
        .await;
    response.assert_status_unauthorized();
}

#[sqlx::test]
#[test_log::test]
async fn test_field_errors_are_reported_together(pool: PgPool) {
    let server = server(pool);
    let auth = register(&server, "joy@clinic.example").await;

    let response = server
        .post("/api/patients/")
        .add_header(&auth.0, &auth.1)
        .json(&json!({
            "name": "",
            "age": 200,
            "gender": "F",
            "phone": "123",
            "address": "Somewhere",
        }))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["name"], json!(["This field may not be blank."]));
    assert_eq!(body["age"], json!(["Age must be between 0 and 150."]));
    assert_eq!(body["phone"], json!(["Phone number must be at least 10 characters."]));
}

#[sqlx::test]
#[test_log::test]
async fn test_public_endpoints(pool: PgPool) {
    let server = server(pool);

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let response = server.get("/api/").await;
    response.assert_status_ok();
    let index: Value = response.json();
    assert_eq!(index["endpoints"]["mappings"]["by_patient"], "/api/mappings/<patient_id>/ [GET]");
    server.get("/api").await.assert_status_ok();

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/patients/{id}/"].is_object());

    server.get("/docs").await.assert_status_ok();
}

#[sqlx::test]
async fn test_create_initial_admin_user_new_user(pool: PgPool) {
    let config = create_test_config();

    let user_id = create_initial_admin_user("Admin@Clinic.example", "admin@123", &pool, &config.auth.password)
        .await
        .expect("Should create admin user successfully");

    let mut conn = pool.acquire().await.unwrap();
    let user = Users::new(&mut conn)
        .get_user_by_email("admin@clinic.example")
        .await
        .unwrap()
        .expect("Admin should exist");

    assert_eq!(user.id, user_id);
    assert!(user.is_staff);
    assert!(password::verify_string("admin@123", &user.password_hash).unwrap());
}

#[sqlx::test]
async fn test_create_initial_admin_user_existing_user(pool: PgPool) {
    let config = create_test_config();
    let server = server(pool.clone());
    register(&server, "admin@clinic.example").await;

    let mut conn = pool.acquire().await.unwrap();
    let existing = Users::new(&mut conn)
        .get_user_by_email("admin@clinic.example")
        .await
        .unwrap()
        .unwrap();
    assert!(!existing.is_staff);

    let returned = create_initial_admin_user("admin@clinic.example", "rotated@456", &pool, &config.auth.password)
        .await
        .expect("Should handle existing user successfully");
    assert_eq!(returned, existing.id);

    let user = Users::new(&mut conn).get_by_id(existing.id).await.unwrap().unwrap();
    assert!(user.is_staff);
    assert!(password::verify_string("rotated@456", &user.password_hash).unwrap());
    assert!(!password::verify_string("Clinic@2024", &user.password_hash).unwrap());

    // Login goes through with the rotated password
    server
        .post("/api/auth/login/")
        .json(&json!({"email": "admin@clinic.example", "password": "rotated@456"}))
        .await
        .assert_status_ok();
}
