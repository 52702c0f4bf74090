//! Fixture data for development databases.
//!
//! [`seed_database`] inserts a small, fixed set of users, doctors, patients and assignments.
//! Every record has a natural key (email for users and doctors, phone for patients, the
//! patient/doctor pair for assignments), and records whose key already exists are left
//! alone, so running it repeatedly converges on the same data.

use std::fmt;

use crate::{
    api::models::{doctors::Specialization, patients::Gender},
    auth::password::{self, Argon2Params},
    config::PasswordConfig,
    db::{
        handlers::{Doctors, Mappings, Patients, Repository, Users},
        models::{
            doctors::DoctorCreateDBRequest, mappings::MappingCreateDBRequest, patients::PatientCreateDBRequest,
            users::UserCreateDBRequest,
        },
    },
    types::{DoctorId, PatientId, UserId},
};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};

pub const USER_PASSWORD: &str = "Test@123";
pub const ADMIN_EMAIL: &str = "admin@healthcare.com";
pub const ADMIN_PASSWORD: &str = "admin@123";

struct UserFixture {
    email: &'static str,
    name: &'static str,
}

const USERS: [UserFixture; 3] = [
    UserFixture {
        email: "rajesh.kumar@email.com",
        name: "Rajesh Kumar",
    },
    UserFixture {
        email: "priya.sharma@email.com",
        name: "Priya Sharma",
    },
    UserFixture {
        email: "amit.patel@email.com",
        name: "Amit Patel",
    },
];

struct DoctorFixture {
    name: &'static str,
    specialization: Specialization,
    phone: &'static str,
    email: &'static str,
    experience_years: i32,
    qualification: &'static str,
    address: &'static str,
}

const DOCTORS: [DoctorFixture; 6] = [
    DoctorFixture {
        name: "Dr. Ramesh Gupta",
        specialization: Specialization::Cardiology,
        phone: "9876543210",
        email: "dr.ramesh@aiims.org",
        experience_years: 15,
        qualification: "MBBS, MD (Cardiology), AIIMS Delhi",
        address: "AIIMS, Ansari Nagar, New Delhi - 110029",
    },
    DoctorFixture {
        name: "Dr. Sunita Reddy",
        specialization: Specialization::Pediatrics,
        phone: "9876543211",
        email: "dr.sunita@apollo.org",
        experience_years: 12,
        qualification: "MBBS, MD (Pediatrics), Apollo Hospitals",
        address: "Apollo Hospitals, Jubilee Hills, Hyderabad - 500033",
    },
    DoctorFixture {
        name: "Dr. Vikram Singh",
        specialization: Specialization::Orthopedics,
        phone: "9876543212",
        email: "dr.vikram@fortis.org",
        experience_years: 18,
        qualification: "MBBS, MS (Orthopedics), Fortis Hospital",
        address: "Fortis Hospital, Sector 62, Noida - 201301",
    },
    DoctorFixture {
        name: "Dr. Meera Iyer",
        specialization: Specialization::Gynecology,
        phone: "9876543213",
        email: "dr.meera@manipal.org",
        experience_years: 10,
        qualification: "MBBS, MD (Gynecology), Manipal Hospital",
        address: "Manipal Hospital, HAL Airport Road, Bangalore - 560017",
    },
    DoctorFixture {
        name: "Dr. Arjun Mehta",
        specialization: Specialization::Neurology,
        phone: "9876543214",
        email: "dr.arjun@max.org",
        experience_years: 20,
        qualification: "MBBS, DM (Neurology), Max Hospital",
        address: "Max Super Specialty Hospital, Saket, New Delhi - 110017",
    },
    DoctorFixture {
        name: "Dr. Kavita Desai",
        specialization: Specialization::Dermatology,
        phone: "9876543215",
        email: "dr.kavita@medanta.org",
        experience_years: 8,
        qualification: "MBBS, MD (Dermatology), Medanta Hospital",
        address: "Medanta The Medicity, Sector 38, Gurgaon - 122001",
    },
];

struct PatientFixture {
    name: &'static str,
    age: i32,
    gender: Gender,
    phone: &'static str,
    address: &'static str,
    medical_history: &'static str,
}

const PATIENTS: [PatientFixture; 8] = [
    PatientFixture {
        name: "Suresh Sharma",
        age: 45,
        gender: Gender::Male,
        phone: "9123456780",
        address: "123, Green Park, New Delhi - 110016",
        medical_history: "Hypertension, Diabetes Type 2. Regular medication for BP control.",
    },
    PatientFixture {
        name: "Anita Verma",
        age: 35,
        gender: Gender::Female,
        phone: "9123456781",
        address: "456, Banjara Hills, Hyderabad - 500034",
        medical_history: "Asthma. Uses inhaler daily. No known allergies.",
    },
    PatientFixture {
        name: "Ramesh Patil",
        age: 60,
        gender: Gender::Male,
        phone: "9123456782",
        address: "789, MG Road, Pune - 411001",
        medical_history: "Arthritis. Previous knee surgery in 2020. Regular physiotherapy.",
    },
    PatientFixture {
        name: "Lakshmi Nair",
        age: 28,
        gender: Gender::Female,
        phone: "9123456783",
        address: "321, Koramangala, Bangalore - 560034",
        medical_history: "Pregnant - 6 months. No complications. First pregnancy.",
    },
    PatientFixture {
        name: "Vijay Kumar",
        age: 52,
        gender: Gender::Male,
        phone: "9123456784",
        address: "654, Rohini Sector 15, New Delhi - 110085",
        medical_history: "Migraine. Family history of neurological conditions.",
    },
    PatientFixture {
        name: "Deepa Reddy",
        age: 40,
        gender: Gender::Female,
        phone: "9123456785",
        address: "987, Jubilee Hills, Hyderabad - 500033",
        medical_history: "Skin allergies. Sensitive to certain cosmetics and foods.",
    },
    PatientFixture {
        name: "Arun Singh",
        age: 32,
        gender: Gender::Male,
        phone: "9123456786",
        address: "147, Sector 62, Noida - 201301",
        medical_history: "Sports injury - ankle. Regular follow-ups required.",
    },
    PatientFixture {
        name: "Pooja Kapoor",
        age: 55,
        gender: Gender::Female,
        phone: "9123456787",
        address: "258, South Extension, New Delhi - 110049",
        medical_history: "Thyroid disorder. Regular medication. Annual checkups.",
    },
];

/// (patient index, doctor index, notes)
const MAPPINGS: [(usize, usize, &str); 10] = [
    (0, 0, "Regular cardiac checkup scheduled. Monitor BP levels."),
    (1, 1, "Asthma management plan review. Adjust inhaler dosage if needed."),
    (2, 2, "Post-surgery follow-up. Physiotherapy progress evaluation."),
    (3, 3, "Prenatal care. Monthly checkups scheduled."),
    (4, 4, "Migraine treatment plan. MRI scheduled for next month."),
    (5, 5, "Allergy testing completed. Prescribed topical ointments."),
    (6, 2, "Sports injury rehabilitation. Weekly physiotherapy sessions."),
    (7, 0, "Thyroid and cardiac health monitoring. Regular blood tests."),
    (0, 5, "Referred for skin examination related to medication side effects."),
    (3, 1, "Pediatric consultation for post-delivery care planning."),
];

/// Counts of records inserted by one run; zero everywhere on a re-run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub doctors: usize,
    pub patients: usize,
    pub mappings: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Database seeded ===")?;
        writeln!(f, "Users created:    {} (of {} including admin)", self.users, USERS.len() + 1)?;
        writeln!(f, "Doctors created:  {} (of {})", self.doctors, DOCTORS.len())?;
        writeln!(f, "Patients created: {} (of {})", self.patients, PATIENTS.len())?;
        writeln!(f, "Mappings created: {} (of {})", self.mappings, MAPPINGS.len())?;
        writeln!(f)?;
        writeln!(f, "=== Login credentials ===")?;
        writeln!(f, "Admin: {ADMIN_EMAIL} / {ADMIN_PASSWORD}")?;
        for (i, user) in USERS.iter().enumerate() {
            writeln!(f, "User {}: {} / {USER_PASSWORD}", i + 1, user.email)?;
        }
        Ok(())
    }
}

/// Insert the fixture data set in a single transaction.
#[instrument(skip_all)]
pub async fn seed_database(pool: &PgPool, password_config: &PasswordConfig) -> anyhow::Result<SeedSummary> {
    let params = Argon2Params::from(password_config);
    let mut summary = SeedSummary::default();
    let mut tx = pool.begin().await?;

    let mut owners = Vec::with_capacity(USERS.len());
    for user in &USERS {
        let (id, created) = ensure_user(&mut tx, user.email, user.name, USER_PASSWORD, false, params).await?;
        summary.users += usize::from(created);
        owners.push(id);
    }
    let (_, created) = ensure_user(&mut tx, ADMIN_EMAIL, "Admin User", ADMIN_PASSWORD, true, params).await?;
    summary.users += usize::from(created);

    let mut doctors = Vec::with_capacity(DOCTORS.len());
    for doctor in &DOCTORS {
        let (id, created) = ensure_doctor(&mut tx, doctor).await?;
        summary.doctors += usize::from(created);
        doctors.push(id);
    }

    // Round-robin across the regular users
    let mut patients = Vec::with_capacity(PATIENTS.len());
    for (i, patient) in PATIENTS.iter().enumerate() {
        let owner = owners[i % owners.len()];
        let (id, owner, created) = ensure_patient(&mut tx, owner, patient).await?;
        summary.patients += usize::from(created);
        patients.push((id, owner));
    }

    for (patient_idx, doctor_idx, notes) in MAPPINGS {
        let (patient_id, owner) = patients[patient_idx];
        let doctor_id = doctors[doctor_idx];

        let mut repo = Mappings::new(&mut tx);
        if repo.pair_exists(patient_id, doctor_id).await? {
            continue;
        }
        repo.create(&MappingCreateDBRequest {
            owner,
            patient_id,
            doctor_id,
            notes: Some(notes.to_string()),
        })
        .await?;
        summary.mappings += 1;
    }

    tx.commit().await?;
    info!(
        "Seeded {} users, {} doctors, {} patients, {} mappings",
        summary.users, summary.doctors, summary.patients, summary.mappings
    );
    Ok(summary)
}

async fn ensure_user(
    conn: &mut PgConnection,
    email: &str,
    name: &str,
    password: &str,
    is_staff: bool,
    params: Argon2Params,
) -> anyhow::Result<(UserId, bool)> {
    let mut repo = Users::new(conn);
    if let Some(existing) = repo.get_user_by_email(email).await? {
        debug!("User {} already present", email);
        return Ok((existing.id, false));
    }

    let password_hash = password::hash_password(password.to_string(), params).await?;
    let user = repo
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            is_staff,
        })
        .await?;
    Ok((user.id, true))
}

async fn ensure_doctor(conn: &mut PgConnection, doctor: &DoctorFixture) -> anyhow::Result<(DoctorId, bool)> {
    let existing = sqlx::query_scalar::<_, DoctorId>("SELECT id FROM doctors WHERE email = $1")
        .bind(doctor.email)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(id) = existing {
        return Ok((id, false));
    }

    let created = Doctors::new(conn)
        .create(&DoctorCreateDBRequest {
            name: doctor.name.to_string(),
            specialization: doctor.specialization,
            phone: doctor.phone.to_string(),
            email: doctor.email.to_string(),
            experience_years: doctor.experience_years,
            qualification: doctor.qualification.to_string(),
            address: doctor.address.to_string(),
        })
        .await?;
    Ok((created.id, true))
}

/// Returns the patient's id and actual owner, which differs from `owner` when the record
/// was already present under someone else.
async fn ensure_patient(
    conn: &mut PgConnection,
    owner: UserId,
    patient: &PatientFixture,
) -> anyhow::Result<(PatientId, UserId, bool)> {
    let existing = sqlx::query_as::<_, (PatientId, UserId)>("SELECT id, user_id FROM patients WHERE phone = $1 ORDER BY created_at LIMIT 1")
        .bind(patient.phone)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some((id, owner)) = existing {
        return Ok((id, owner, false));
    }

    let created = Patients::new(conn)
        .create(&PatientCreateDBRequest {
            owner,
            name: patient.name.to_string(),
            age: patient.age,
            gender: patient.gender,
            phone: patient.phone.to_string(),
            address: patient.address.to_string(),
            medical_history: Some(patient.medical_history.to_string()),
        })
        .await?;
    Ok((created.id, owner, true))
}
