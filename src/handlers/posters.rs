use crate::{
    database::connection::DbPool,
    models::donation::{Donation, DonationError},
    models::poster::{Poster, PosterError},
    requests::poster::{HistoryQuery, RefineStoryRequest, SavePosterRequest},
    services::generation::{GeminiClient, TextGenerator},
    session::{self, layout},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Serialize)]
struct ProgressView {
    total_raised: Decimal,
    goal: Decimal,
    percent: f64,
}

#[derive(Serialize)]
struct LayoutView {
    name_font_size: &'static str,
    description_font_size: &'static str,
}

/// Everything the poster page needs in one payload, so a load never renders
/// from a half-replaced record.
#[derive(Serialize)]
struct PosterView {
    poster: Poster,
    donations: Vec<Donation>,
    progress: ProgressView,
    layout: LayoutView,
}

#[derive(Serialize)]
struct RefinedStory {
    description: String,
}

pub async fn create(
    pool: web::Data<DbPool>,
    request: web::Json<SavePosterRequest>,
) -> Result<HttpResponse> {
    let (draft, theme) = request.into_inner().into_draft();
    if draft.patient_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Por favor, ingresa al menos el nombre del paciente.".to_string(),
        )));
    }

    info!("Creating poster for patient: {}", draft.patient_name);
    match Poster::create(&pool, draft.to_columns(theme)).await {
        Ok(poster) => {
            info!("Successfully created poster with ID: {}", poster.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(poster)))
        }
        Err(PosterError::NotFound { id }) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error(format!("Poster {} not found", id)))),
        Err(PosterError::Database(e)) => {
            error!("Database error creating poster: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to create poster".to_string(),
            )))
        }
    }
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<SavePosterRequest>,
) -> Result<HttpResponse> {
    let poster_id = path.into_inner();
    let (draft, theme) = request.into_inner().into_draft();
    if draft.patient_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Por favor, ingresa al menos el nombre del paciente.".to_string(),
        )));
    }

    info!("Updating poster {}", poster_id);
    match Poster::update(&pool, poster_id, draft.to_columns(theme)).await {
        Ok(poster) => {
            info!("Successfully updated poster: {}", poster_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(poster)))
        }
        Err(PosterError::NotFound { id }) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::<()>::error(format!("Poster {} not found", id)))),
        Err(PosterError::Database(e)) => {
            error!("Database error updating poster: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to update poster".to_string(),
            )))
        }
    }
}

pub async fn get_poster(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let poster_id = path.into_inner();
    info!("Getting poster {}", poster_id);

    let poster = match Poster::find_by_id(&pool, poster_id).await {
        Ok(Some(poster)) => poster,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
                "No se encontró ninguna campaña con ese ID.".to_string(),
            )));
        }
        Err(e) => {
            error!("Database error getting poster: {}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to retrieve poster".to_string(),
            )));
        }
    };

    let donations = match Donation::find_by_poster(&pool, poster_id).await {
        Ok(donations) => donations,
        Err(DonationError::Database(e)) => {
            error!("Database error getting donations for poster {}: {}", poster_id, e);
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to retrieve donations".to_string(),
            )));
        }
    };

    let total_raised = layout::total_raised(&donations);
    let goal = layout::goal_amount(poster.total_amount.as_deref().unwrap_or(""));
    let view = PosterView {
        progress: ProgressView {
            total_raised,
            goal,
            percent: layout::progress_percent(total_raised, goal),
        },
        layout: LayoutView {
            name_font_size: layout::name_scale(&poster.patient_name).css(),
            description_font_size: layout::story_scale(
                poster.description.as_deref().unwrap_or(""),
            )
            .css(),
        },
        donations,
        poster,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

pub async fn search(
    pool: web::Data<DbPool>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    info!("Searching campaign history for: {:?}", query.search);

    match Poster::search(&pool, &query.search, session::HISTORY_LIMIT).await {
        Ok(summaries) => Ok(HttpResponse::Ok().json(ApiResponse::success(summaries))),
        Err(e) => {
            error!("Database error searching posters: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to search campaigns".to_string(),
            )))
        }
    }
}

pub async fn refine(
    generator: web::Data<GeminiClient>,
    request: web::Json<RefineStoryRequest>,
) -> Result<HttpResponse> {
    if request.patient_name.trim().is_empty() || request.condition.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Ingresa nombre y diagnóstico para generar la historia.".to_string(),
        )));
    }

    info!("Generating story for patient: {}", request.patient_name);
    let prompt = session::story_prompt(&request.patient_name, &request.condition);
    match generator.generate(&prompt).await {
        Ok(text) => {
            let description = session::strip_outer_quotes(text.trim()).to_string();
            Ok(HttpResponse::Ok().json(ApiResponse::success(RefinedStory { description })))
        }
        Err(e) => {
            error!("Error generating story: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                "Failed to generate story".to_string(),
            )))
        }
    }
}
