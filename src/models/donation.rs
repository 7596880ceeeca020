use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Donor name recorded when the form leaves the field blank.
pub const ANONYMOUS_DONOR: &str = "Anónimo";

#[derive(Error, Debug)]
pub enum DonationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A recorded contribution against a poster. Donations are immutable once
/// created: there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub poster_id: Uuid,
    pub donor_name: String,
    pub amount: Decimal,
    pub message: Option<String>,
    pub payment_method: Option<String>,
    pub proof_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonation {
    pub poster_id: Uuid,
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub message: Option<String>,
    pub payment_method: Option<String>,
    pub proof_url: Option<String>,
}

impl Donation {
    pub async fn create(pool: &DbPool, donation: CreateDonation) -> Result<Self, DonationError> {
        let donor_name = donation
            .donor_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_DONOR.to_string());

        let donation = sqlx::query_as::<_, Donation>(
            "INSERT INTO donations (id, poster_id, donor_name, amount, message, payment_method, proof_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(donation.poster_id)
        .bind(donor_name)
        .bind(donation.amount)
        .bind(donation.message)
        .bind(donation.payment_method)
        .bind(donation.proof_url)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(donation)
    }

    pub async fn find_by_poster(
        pool: &DbPool,
        poster_id: Uuid,
    ) -> Result<Vec<Self>, DonationError> {
        let donations = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE poster_id = $1 ORDER BY created_at DESC",
        )
        .bind(poster_id)
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }
}
