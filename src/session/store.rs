use crate::database::connection::DbPool;
use crate::models::donation::{CreateDonation, Donation, DonationError};
use crate::models::poster::{Poster, PosterColumns, PosterError, PosterSummary};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Poster with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl From<PosterError> for StoreError {
    fn from(err: PosterError) -> Self {
        match err {
            PosterError::NotFound { id } => StoreError::NotFound { id },
            PosterError::Database(e) => StoreError::Database(e),
        }
    }
}

impl From<DonationError> for StoreError {
    fn from(err: DonationError) -> Self {
        match err {
            DonationError::Database(e) => StoreError::Database(e),
        }
    }
}

/// Remote record store as seen by the poster session. The session treats the
/// store as a black box; the durable owner of record identity is behind this
/// trait.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_poster(&self, id: Uuid) -> Result<Option<Poster>, StoreError>;
    async fn insert_poster(&self, columns: PosterColumns) -> Result<Poster, StoreError>;
    async fn update_poster(&self, id: Uuid, columns: PosterColumns) -> Result<Poster, StoreError>;
    async fn search_posters(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<PosterSummary>, StoreError>;
    async fn donations_for(&self, poster_id: Uuid) -> Result<Vec<Donation>, StoreError>;
    async fn insert_donation(&self, donation: CreateDonation) -> Result<Donation, StoreError>;
}

/// Postgres-backed record store, delegating to the model layer.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_poster(&self, id: Uuid) -> Result<Option<Poster>, StoreError> {
        Ok(Poster::find_by_id(&self.pool, id).await?)
    }

    async fn insert_poster(&self, columns: PosterColumns) -> Result<Poster, StoreError> {
        Ok(Poster::create(&self.pool, columns).await?)
    }

    async fn update_poster(&self, id: Uuid, columns: PosterColumns) -> Result<Poster, StoreError> {
        Ok(Poster::update(&self.pool, id, columns).await?)
    }

    async fn search_posters(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<PosterSummary>, StoreError> {
        Ok(Poster::search(&self.pool, term, limit).await?)
    }

    async fn donations_for(&self, poster_id: Uuid) -> Result<Vec<Donation>, StoreError> {
        Ok(Donation::find_by_poster(&self.pool, poster_id).await?)
    }

    async fn insert_donation(&self, donation: CreateDonation) -> Result<Donation, StoreError> {
        Ok(Donation::create(&self.pool, donation).await?)
    }
}
