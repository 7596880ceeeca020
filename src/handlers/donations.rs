use crate::{
    database::connection::DbPool,
    models::donation::{Donation, DonationError},
    requests::donation::DonationRequest,
    services::storage::StorageClient,
    session::donate::{DonateError, submit_donation},
    session::store::PgRecordStore,
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};
use uuid::Uuid;

pub async fn submit(
    pool: web::Data<DbPool>,
    storage: web::Data<StorageClient>,
    path: web::Path<Uuid>,
    request: web::Json<DonationRequest>,
) -> Result<HttpResponse> {
    let poster_id = path.into_inner();
    info!("Recording donation for poster {}", poster_id);

    let store = PgRecordStore::new(pool.get_ref().clone());
    match submit_donation(store, storage.get_ref(), poster_id, request.into_inner().into_form())
        .await
    {
        Ok(donation) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            donation,
            "¡Aporte Registrado!".to_string(),
        ))),
        Err(e @ DonateError::CampaignNotFound) => {
            Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(e.to_string())))
        }
        Err(e @ DonateError::InvalidProof) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
        Err(DonateError::Storage(e)) => {
            error!("Error uploading donation proof: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to upload proof image".to_string(),
            )))
        }
        Err(DonateError::Store(e)) => {
            error!("Database error recording donation: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to record donation".to_string(),
            )))
        }
    }
}

pub async fn list(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let poster_id = path.into_inner();
    info!("Getting donations for poster {}", poster_id);

    match Donation::find_by_poster(&pool, poster_id).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(DonationError::Database(e)) => {
            error!("Database error getting donations: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to retrieve donations".to_string(),
            )))
        }
    }
}
