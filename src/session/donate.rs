//! Donor-side submission flow. Runs against the same [`RecordStore`] seam as
//! the poster session, plus the blob store for proof captures.

use crate::models::donation::{CreateDonation, Donation};
use crate::services::storage::{BlobStore, PROOFS_BUCKET, StorageError};
use crate::session::store::{RecordStore, StoreError};
use crate::utils::data_url::DataUrl;
use crate::utils::helpers::random_token;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DonateError {
    #[error("No se encontró ninguna campaña con ese ID.")]
    CampaignNotFound,
    #[error("Invalid proof image attachment")]
    InvalidProof,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What the donation form carries. The proof capture arrives as an inline
/// data URL, as the file picker produces it.
#[derive(Debug, Clone, Default)]
pub struct DonationForm {
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub message: Option<String>,
    pub payment_method: Option<String>,
    pub proof_image: Option<String>,
}

/// Records a donation against a poster. The poster must exist before anything
/// else happens, and when a proof capture is attached it is uploaded first;
/// a failed upload aborts the whole submission so no donation row is ever
/// recorded without its proof.
pub async fn submit_donation<S, B>(
    store: S,
    blobs: &B,
    poster_id: Uuid,
    form: DonationForm,
) -> Result<Donation, DonateError>
where
    S: RecordStore,
    B: BlobStore + ?Sized,
{
    if store.fetch_poster(poster_id).await?.is_none() {
        return Err(DonateError::CampaignNotFound);
    }

    let mut proof_url = None;
    if let Some(image) = form.proof_image.as_deref().filter(|s| !s.is_empty()) {
        let proof = DataUrl::parse(image).ok_or(DonateError::InvalidProof)?;
        let name = format!("{}/{}.{}", poster_id, random_token(12), proof.extension());
        let url = blobs
            .upload(PROOFS_BUCKET, &name, proof.bytes, &proof.content_type)
            .await?;
        proof_url = Some(url);
    }

    let donation = store
        .insert_donation(CreateDonation {
            poster_id,
            donor_name: form.donor_name,
            amount: form.amount,
            message: form.message,
            payment_method: form.payment_method,
            proof_url,
        })
        .await?;

    info!("Recorded donation {} for poster {}", donation.id, poster_id);
    Ok(donation)
}
