//! Postgres repository backend.
//!
//! Uniqueness and relationship integrity are enforced at the database level:
//! unique indexes on usernames/emails and on the `(patient_id, doctor_id)`
//! pair, and `ON DELETE CASCADE` foreign keys from mappings to both
//! endpoints. Unique violations (`23505`) are mapped back to
//! [`RepoError::Duplicate`] by constraint name.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use caremap_auth::User;
use caremap_core::{DoctorId, MappingId, PatientId, UserId};
use caremap_records::{Doctor, Mapping, MappingView, Patient};

use super::{
    DoctorRepository, MappingRepository, PatientRepository, RepoError, RepoResult, UserRepository,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            UUID PRIMARY KEY,
    username      TEXT NOT NULL,
    email         TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL,
    CONSTRAINT users_username_key UNIQUE (username),
    CONSTRAINT users_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS patients (
    id            UUID PRIMARY KEY,
    owner_user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    age           INTEGER NOT NULL CHECK (age >= 0),
    email         TEXT NOT NULL,
    phone         TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL,
    CONSTRAINT patients_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS doctors (
    id               UUID PRIMARY KEY,
    owner_user_id    UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name             TEXT NOT NULL,
    email            TEXT NOT NULL,
    phone            TEXT NOT NULL,
    specialization   TEXT NOT NULL,
    experience_years INTEGER NOT NULL CHECK (experience_years >= 0),
    clinic_address   TEXT NOT NULL,
    CONSTRAINT doctors_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS mappings (
    id            UUID PRIMARY KEY,
    patient_id    UUID NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    doctor_id     UUID NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    assigned_date DATE NOT NULL,
    CONSTRAINT mappings_pair_key UNIQUE (patient_id, doctor_id)
);
"#;

/// Postgres-backed store implementing every repository trait.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist yet (idempotent).
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> RepoError {
    RepoError::Storage(e.to_string())
}

/// Map a unique violation to `Duplicate` by constraint name; everything else
/// stays a storage error.
fn insert_error(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return match db.constraint() {
                Some("users_username_key") => RepoError::duplicate(
                    "username",
                    "A user with that username already exists.",
                ),
                Some("users_email_key") => {
                    RepoError::duplicate("email", "A user with that email already exists.")
                }
                Some("patients_email_key") => {
                    RepoError::duplicate("email", "patient with this email already exists.")
                }
                Some("doctors_email_key") => {
                    RepoError::duplicate("email", "doctor with this email already exists.")
                }
                Some("mappings_pair_key") => {
                    RepoError::duplicate("mapping", "This mapping already exists")
                }
                _ => RepoError::duplicate("unknown", "duplicate record"),
            };
        }
    }
    storage(e)
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn patient_from_row(row: &PgRow) -> Result<Patient, sqlx::Error> {
    Ok(Patient {
        id: PatientId::from_uuid(row.try_get("id")?),
        owner: UserId::from_uuid(row.try_get("owner_user_id")?),
        name: row.try_get("name")?,
        age: row.try_get::<i32, _>("age")? as u32,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
    })
}

fn doctor_from_row(row: &PgRow) -> Result<Doctor, sqlx::Error> {
    Ok(Doctor {
        id: DoctorId::from_uuid(row.try_get("id")?),
        owner: UserId::from_uuid(row.try_get("owner_user_id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        specialization: row.try_get("specialization")?,
        experience_years: row.try_get::<i32, _>("experience_years")? as u32,
        clinic_address: row.try_get("clinic_address")?,
    })
}

fn mapping_from_row(row: &PgRow) -> Result<Mapping, sqlx::Error> {
    Ok(Mapping {
        id: MappingId::from_uuid(row.try_get("id")?),
        patient_id: PatientId::from_uuid(row.try_get("patient_id")?),
        doctor_id: DoctorId::from_uuid(row.try_get("doctor_id")?),
        assigned_date: row.try_get("assigned_date")?,
    })
}

fn mapping_view_from_row(row: &PgRow) -> Result<MappingView, sqlx::Error> {
    Ok(MappingView {
        id: MappingId::from_uuid(row.try_get("id")?),
        patient_id: PatientId::from_uuid(row.try_get("patient_id")?),
        patient_name: row.try_get("patient_name")?,
        doctor_id: DoctorId::from_uuid(row.try_get("doctor_id")?),
        doctor_name: row.try_get("doctor_name")?,
        assigned_date: row.try_get("assigned_date")?,
    })
}

const MAPPING_VIEW_SELECT: &str = r#"
SELECT m.id, m.patient_id, p.name AS patient_name,
       m.doctor_id, d.name AS doctor_name, m.assigned_date
FROM mappings m
JOIN patients p ON p.id = m.patient_id
JOIN doctors d ON d.id = m.doctor_id
"#;

#[async_trait]
impl UserRepository for PgStore {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: User) -> RepoResult<User> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(|r| user_from_row(&r)).transpose().map_err(storage)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(|r| user_from_row(&r)).transpose().map_err(storage)
    }
}

#[async_trait]
impl PatientRepository for PgStore {
    #[instrument(skip(self, patient), fields(patient_id = %patient.id))]
    async fn insert_patient(&self, patient: Patient) -> RepoResult<Patient> {
        sqlx::query(
            "INSERT INTO patients (id, owner_user_id, name, age, email, phone, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*patient.id.as_uuid())
        .bind(*patient.owner.as_uuid())
        .bind(&patient.name)
        .bind(patient.age as i32)
        .bind(&patient.email)
        .bind(&patient.phone)
        .bind(patient.created_at)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;
        Ok(patient)
    }

    async fn list_patients(&self, owner: UserId) -> RepoResult<Vec<Patient>> {
        let rows = sqlx::query("SELECT * FROM patients WHERE owner_user_id = $1 ORDER BY id")
            .bind(*owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.iter().map(patient_from_row).collect::<Result<_, _>>().map_err(storage)
    }

    async fn find_patient(&self, owner: UserId, id: PatientId) -> RepoResult<Option<Patient>> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = $1 AND owner_user_id = $2")
            .bind(*id.as_uuid())
            .bind(*owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(|r| patient_from_row(&r)).transpose().map_err(storage)
    }

    #[instrument(skip(self, patient), fields(patient_id = %patient.id))]
    async fn update_patient(&self, patient: Patient) -> RepoResult<Patient> {
        let result = sqlx::query(
            "UPDATE patients SET name = $2, age = $3, email = $4, phone = $5 \
             WHERE id = $1 AND owner_user_id = $6",
        )
        .bind(*patient.id.as_uuid())
        .bind(&patient.name)
        .bind(patient.age as i32)
        .bind(&patient.email)
        .bind(&patient.phone)
        .bind(*patient.owner.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(patient)
    }

    #[instrument(skip(self))]
    async fn delete_patient(&self, owner: UserId, id: PatientId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1 AND owner_user_id = $2")
            .bind(*id.as_uuid())
            .bind(*owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl DoctorRepository for PgStore {
    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn insert_doctor(&self, doctor: Doctor) -> RepoResult<Doctor> {
        sqlx::query(
            "INSERT INTO doctors \
             (id, owner_user_id, name, email, phone, specialization, experience_years, clinic_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*doctor.id.as_uuid())
        .bind(*doctor.owner.as_uuid())
        .bind(&doctor.name)
        .bind(&doctor.email)
        .bind(&doctor.phone)
        .bind(&doctor.specialization)
        .bind(doctor.experience_years as i32)
        .bind(&doctor.clinic_address)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;
        Ok(doctor)
    }

    async fn list_doctors(&self) -> RepoResult<Vec<Doctor>> {
        let rows = sqlx::query("SELECT * FROM doctors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.iter().map(doctor_from_row).collect::<Result<_, _>>().map_err(storage)
    }

    async fn find_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>> {
        let row = sqlx::query("SELECT * FROM doctors WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(|r| doctor_from_row(&r)).transpose().map_err(storage)
    }

    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn update_doctor(&self, doctor: Doctor) -> RepoResult<Doctor> {
        let result = sqlx::query(
            "UPDATE doctors SET name = $2, email = $3, phone = $4, specialization = $5, \
             experience_years = $6, clinic_address = $7 WHERE id = $1",
        )
        .bind(*doctor.id.as_uuid())
        .bind(&doctor.name)
        .bind(&doctor.email)
        .bind(&doctor.phone)
        .bind(&doctor.specialization)
        .bind(doctor.experience_years as i32)
        .bind(&doctor.clinic_address)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(doctor)
    }

    #[instrument(skip(self))]
    async fn delete_doctor(&self, id: DoctorId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl MappingRepository for PgStore {
    #[instrument(skip(self, mapping), fields(mapping_id = %mapping.id))]
    async fn insert_mapping(&self, mapping: Mapping) -> RepoResult<MappingView> {
        // The unique pair index makes the duplicate check atomic with the
        // insert; a concurrent create of the same pair loses with 23505.
        sqlx::query(
            "INSERT INTO mappings (id, patient_id, doctor_id, assigned_date) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(*mapping.id.as_uuid())
        .bind(*mapping.patient_id.as_uuid())
        .bind(*mapping.doctor_id.as_uuid())
        .bind(mapping.assigned_date)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        let row = sqlx::query(&format!("{MAPPING_VIEW_SELECT} WHERE m.id = $1"))
            .bind(*mapping.id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        mapping_view_from_row(&row).map_err(storage)
    }

    async fn list_mappings(&self) -> RepoResult<Vec<MappingView>> {
        let rows = sqlx::query(&format!("{MAPPING_VIEW_SELECT} ORDER BY m.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.iter().map(mapping_view_from_row).collect::<Result<_, _>>().map_err(storage)
    }

    async fn list_mappings_for_patient(&self, patient_id: PatientId) -> RepoResult<Vec<MappingView>> {
        let rows = sqlx::query(&format!(
            "{MAPPING_VIEW_SELECT} WHERE m.patient_id = $1 ORDER BY m.id"
        ))
        .bind(*patient_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.iter().map(mapping_view_from_row).collect::<Result<_, _>>().map_err(storage)
    }

    async fn find_mapping(&self, id: MappingId) -> RepoResult<Option<Mapping>> {
        let row = sqlx::query("SELECT * FROM mappings WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(|r| mapping_from_row(&r)).transpose().map_err(storage)
    }

    #[instrument(skip(self))]
    async fn delete_mapping(&self, id: MappingId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM mappings WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
