//! Infrastructure wiring: repositories + token service behind trait objects.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use caremap_auth::Hs256TokenService;
use caremap_infra::{
    DoctorRepository, InMemoryStore, MappingRepository, PatientRepository, PgStore, UserRepository,
};

/// Everything the handlers need, behind backend-agnostic interfaces.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub mappings: Arc<dyn MappingRepository>,
    pub tokens: Arc<Hs256TokenService>,
}

impl AppServices {
    /// In-memory backend (tests/dev).
    pub fn in_memory(jwt_secret: &str) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            patients: store.clone(),
            doctors: store.clone(),
            mappings: store,
            tokens: Arc::new(Hs256TokenService::new(jwt_secret.as_bytes())),
        }
    }

    /// Postgres backend; connects and creates the schema if missing.
    pub async fn postgres(database_url: &str, jwt_secret: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("failed to connect to postgres")?;

        let store = PgStore::new(pool);
        store
            .ensure_schema()
            .await
            .context("failed to create schema")?;

        let store = Arc::new(store);
        Ok(Self {
            users: store.clone(),
            patients: store.clone(),
            doctors: store.clone(),
            mappings: store,
            tokens: Arc::new(Hs256TokenService::new(jwt_secret.as_bytes())),
        })
    }

    /// Pick the backend from the environment: Postgres when `DATABASE_URL`
    /// is set, in-memory otherwise.
    pub async fn from_env(jwt_secret: &str) -> anyhow::Result<Self> {
        match std::env::var("DATABASE_URL") {
            Ok(url) => Self::postgres(&url, jwt_secret).await,
            Err(_) => {
                tracing::warn!("DATABASE_URL not set; using non-persistent in-memory store");
                Ok(Self::in_memory(jwt_secret))
            }
        }
    }
}
