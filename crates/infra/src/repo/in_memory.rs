//! In-memory repository backend.
//!
//! Intended for tests/dev. One `RwLock` guards all four tables, so
//! check-then-insert sequences (duplicate mapping pairs, email uniqueness)
//! and cascade deletes are atomic without further coordination.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use caremap_auth::User;
use caremap_core::{DoctorId, MappingId, PatientId, UserId};
use caremap_records::{Doctor, Mapping, MappingView, Patient};

use super::{
    DoctorRepository, MappingRepository, PatientRepository, RepoError, RepoResult, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    patients: HashMap<PatientId, Patient>,
    doctors: HashMap<DoctorId, Doctor>,
    mappings: HashMap<MappingId, Mapping>,
}

impl Tables {
    fn view(&self, mapping: &Mapping) -> RepoResult<MappingView> {
        let patient = self
            .patients
            .get(&mapping.patient_id)
            .ok_or_else(|| RepoError::Storage("mapping references missing patient".to_string()))?;
        let doctor = self
            .doctors
            .get(&mapping.doctor_id)
            .ok_or_else(|| RepoError::Storage("mapping references missing doctor".to_string()))?;
        Ok(MappingView::new(mapping, &patient.name, &doctor.name))
    }
}

/// In-memory store implementing every repository trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: User) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::duplicate(
                "username",
                "A user with that username already exists.",
            ));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::duplicate(
                "email",
                "A user with that email already exists.",
            ));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn insert_patient(&self, patient: Patient) -> RepoResult<Patient> {
        let mut tables = self.tables.write().await;
        if tables.patients.values().any(|p| p.email == patient.email) {
            return Err(RepoError::duplicate(
                "email",
                "patient with this email already exists.",
            ));
        }
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn list_patients(&self, owner: UserId) -> RepoResult<Vec<Patient>> {
        let tables = self.tables.read().await;
        let mut patients: Vec<Patient> = tables
            .patients
            .values()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect();
        patients.sort_by_key(|p| p.id);
        Ok(patients)
    }

    async fn find_patient(&self, owner: UserId, id: PatientId) -> RepoResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .get(&id)
            .filter(|p| p.owner == owner)
            .cloned())
    }

    async fn update_patient(&self, patient: Patient) -> RepoResult<Patient> {
        let mut tables = self.tables.write().await;
        if !tables.patients.contains_key(&patient.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .patients
            .values()
            .any(|p| p.id != patient.id && p.email == patient.email)
        {
            return Err(RepoError::duplicate(
                "email",
                "patient with this email already exists.",
            ));
        }
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn delete_patient(&self, owner: UserId, id: PatientId) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        match tables.patients.get(&id) {
            Some(p) if p.owner == owner => {}
            _ => return Err(RepoError::NotFound),
        }
        tables.patients.remove(&id);
        tables.mappings.retain(|_, m| m.patient_id != id);
        Ok(())
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn insert_doctor(&self, doctor: Doctor) -> RepoResult<Doctor> {
        let mut tables = self.tables.write().await;
        if tables.doctors.values().any(|d| d.email == doctor.email) {
            return Err(RepoError::duplicate(
                "email",
                "doctor with this email already exists.",
            ));
        }
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn list_doctors(&self) -> RepoResult<Vec<Doctor>> {
        let tables = self.tables.read().await;
        let mut doctors: Vec<Doctor> = tables.doctors.values().cloned().collect();
        doctors.sort_by_key(|d| d.id);
        Ok(doctors)
    }

    async fn find_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>> {
        Ok(self.tables.read().await.doctors.get(&id).cloned())
    }

    async fn update_doctor(&self, doctor: Doctor) -> RepoResult<Doctor> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&doctor.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .doctors
            .values()
            .any(|d| d.id != doctor.id && d.email == doctor.email)
        {
            return Err(RepoError::duplicate(
                "email",
                "doctor with this email already exists.",
            ));
        }
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn delete_doctor(&self, id: DoctorId) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if tables.doctors.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.mappings.retain(|_, m| m.doctor_id != id);
        Ok(())
    }
}

#[async_trait]
impl MappingRepository for InMemoryStore {
    async fn insert_mapping(&self, mapping: Mapping) -> RepoResult<MappingView> {
        let mut tables = self.tables.write().await;
        if tables
            .mappings
            .values()
            .any(|m| m.links(mapping.patient_id, mapping.doctor_id))
        {
            return Err(RepoError::duplicate(
                "mapping",
                "This mapping already exists",
            ));
        }
        let view = tables.view(&mapping)?;
        tables.mappings.insert(mapping.id, mapping);
        Ok(view)
    }

    async fn list_mappings(&self) -> RepoResult<Vec<MappingView>> {
        let tables = self.tables.read().await;
        let mut mappings: Vec<&Mapping> = tables.mappings.values().collect();
        mappings.sort_by_key(|m| m.id);
        mappings.into_iter().map(|m| tables.view(m)).collect()
    }

    async fn list_mappings_for_patient(&self, patient_id: PatientId) -> RepoResult<Vec<MappingView>> {
        let tables = self.tables.read().await;
        let mut mappings: Vec<&Mapping> = tables
            .mappings
            .values()
            .filter(|m| m.patient_id == patient_id)
            .collect();
        mappings.sort_by_key(|m| m.id);
        mappings.into_iter().map(|m| tables.view(m)).collect()
    }

    async fn find_mapping(&self, id: MappingId) -> RepoResult<Option<Mapping>> {
        Ok(self.tables.read().await.mappings.get(&id).copied())
    }

    async fn delete_mapping(&self, id: MappingId) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if tables.mappings.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caremap_auth::RegisterDraft;
    use caremap_records::{DoctorDraft, PatientDraft};
    use chrono::{NaiveDate, Utc};

    fn user(name: &str) -> User {
        RegisterDraft {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: "long-enough-pw".to_string(),
        }
        .into_user(Utc::now())
        .unwrap()
    }

    fn patient(owner: UserId, name: &str, email: &str) -> Patient {
        PatientDraft {
            name: name.to_string(),
            age: 30,
            email: email.to_string(),
            phone: "1234567890".to_string(),
        }
        .into_patient(owner, Utc::now())
        .unwrap()
    }

    fn doctor(owner: UserId, name: &str, email: &str) -> Doctor {
        DoctorDraft {
            name: name.to_string(),
            email: email.to_string(),
            phone: "0987654321".to_string(),
            specialization: "Cardiology".to_string(),
            experience_years: 10,
            clinic_address: "1 Harley Street".to_string(),
        }
        .into_doctor(owner)
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let store = InMemoryStore::new();
        store.insert_user(user("alice")).await.unwrap();

        let mut dup = user("alice");
        dup.email = "other@example.com".to_string();
        let err = store.insert_user(dup).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { field: "username", .. }));
    }

    #[tokio::test]
    async fn patient_lookups_are_owner_scoped() {
        let store = InMemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let p = store
            .insert_patient(patient(alice, "Bob", "bob@x.com"))
            .await
            .unwrap();

        assert!(store.find_patient(alice, p.id).await.unwrap().is_some());
        assert!(store.find_patient(bob, p.id).await.unwrap().is_none());
        assert_eq!(store.list_patients(bob).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn patient_email_unique_across_owners() {
        let store = InMemoryStore::new();
        let p = patient(UserId::new(), "Bob", "bob@x.com");
        store.insert_patient(p).await.unwrap();

        let err = store
            .insert_patient(patient(UserId::new(), "Other", "bob@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { field: "email", .. }));
    }

    #[tokio::test]
    async fn duplicate_mapping_pair_rejected_until_deleted() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let p = store
            .insert_patient(patient(owner, "Bob", "bob@x.com"))
            .await
            .unwrap();
        let d = store
            .insert_doctor(doctor(owner, "Smith", "smith@clinic.com"))
            .await
            .unwrap();

        let first = store
            .insert_mapping(Mapping::assign(p.id, d.id, date()))
            .await
            .unwrap();
        assert_eq!(first.patient_name, "Bob");
        assert_eq!(first.doctor_name, "Smith");

        let err = store
            .insert_mapping(Mapping::assign(p.id, d.id, date()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { field: "mapping", .. }));

        // Uniqueness is "currently exists": delete then recreate is allowed.
        store.delete_mapping(first.id).await.unwrap();
        store
            .insert_mapping(Mapping::assign(p.id, d.id, date()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_patient_cascades_to_mappings() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let p = store
            .insert_patient(patient(owner, "Bob", "bob@x.com"))
            .await
            .unwrap();
        let d = store
            .insert_doctor(doctor(owner, "Smith", "smith@clinic.com"))
            .await
            .unwrap();
        let m = store
            .insert_mapping(Mapping::assign(p.id, d.id, date()))
            .await
            .unwrap();

        store.delete_patient(owner, p.id).await.unwrap();
        assert!(store.find_mapping(m.id).await.unwrap().is_none());
        assert_eq!(store.list_mappings().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn deleting_doctor_cascades_to_mappings() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let p = store
            .insert_patient(patient(owner, "Bob", "bob@x.com"))
            .await
            .unwrap();
        let d = store
            .insert_doctor(doctor(owner, "Smith", "smith@clinic.com"))
            .await
            .unwrap();
        let m = store
            .insert_mapping(Mapping::assign(p.id, d.id, date()))
            .await
            .unwrap();

        store.delete_doctor(d.id).await.unwrap();
        assert!(store.find_mapping(m.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_patient_by_non_owner_is_not_found() {
        let store = InMemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let p = store
            .insert_patient(patient(alice, "Bob", "bob@x.com"))
            .await
            .unwrap();

        let err = store.delete_patient(bob, p.id).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
        assert!(store.find_patient(alice, p.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_patient_enforces_email_uniqueness_excluding_self() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let a = store
            .insert_patient(patient(owner, "A", "a@x.com"))
            .await
            .unwrap();
        store
            .insert_patient(patient(owner, "B", "b@x.com"))
            .await
            .unwrap();

        // Re-saving with its own email is fine.
        store.update_patient(a.clone()).await.unwrap();

        let mut stolen = a;
        stolen.email = "b@x.com".to_string();
        let err = store.update_patient(stolen).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { field: "email", .. }));
    }
}
