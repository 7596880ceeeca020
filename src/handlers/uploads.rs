use crate::{
    services::storage::{ReportError, StorageClient, store_report},
    utils::helpers::ApiResponse,
};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Serialize;
use tracing::{error, info};

#[derive(Serialize)]
struct ReportUpload {
    url: String,
}

/// Accepts a raw PDF body and stores it in the reports bucket. Medical
/// reports are the one attachment that goes through the blob store; photos
/// and proof previews stay embedded on their records.
pub async fn report(
    storage: web::Data<StorageClient>,
    request: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    info!("Uploading medical report ({} bytes)", body.len());
    match store_report(storage.get_ref(), content_type, body.to_vec()).await {
        Ok(url) => Ok(HttpResponse::Created().json(ApiResponse::success(ReportUpload { url }))),
        Err(e @ ReportError::NotPdf) => {
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
        Err(ReportError::Storage(e)) => {
            error!("Error uploading medical report: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to upload report".to_string(),
            )))
        }
    }
}
