use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    ErrorResponse, HealthResponse, ListRestaurantsRequest, RestaurantDetailsResponse, SearchPage,
    SearchRequest,
};
use crate::services::{SearchError, SearchService};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
}

/// Configure all restaurant routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search/restaurants", web::post().to(search_restaurants))
        .route("/restaurants", web::get().to(list_restaurants))
        .route("/restaurants/{place_id}", web::get().to(restaurant_details));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache: state.search.cache().stats(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: {}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn search_failed(err: &SearchError) -> HttpResponse {
    match err {
        SearchError::InvalidQuery(message) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid query".to_string(),
            message: message.clone(),
            status_code: 400,
        }),
        SearchError::Upstream { .. } => HttpResponse::BadGateway().json(ErrorResponse {
            error: "Upstream provider failed".to_string(),
            message: err.to_string(),
            status_code: 502,
        }),
    }
}

/// Search restaurants endpoint
///
/// POST /api/search/restaurants
///
/// Request body:
/// ```json
/// {
///   "location": "Austin, TX",
///   "budget": "budget|mid|upscale",
///   "dietary": ["vegan"],
///   "minRating": 4.0,
///   "radius": 5000
/// }
/// ```
async fn search_restaurants(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let query = req.into_inner().into_query();
    tracing::info!("Searching restaurants near {}", query.location);

    match state.search.search(&query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => search_failed(&e),
    }
}

/// Paginated search endpoint
///
/// GET /api/restaurants?location=&budget=&dietary=vegan,gluten&rating=&radius=&page=&limit=
async fn list_restaurants(
    state: web::Data<AppState>,
    req: web::Query<ListRestaurantsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let query = req.to_query();
    match state.search.search(&query).await {
        Ok(response) => HttpResponse::Ok().json(SearchPage::paginate(response, req.page, req.limit)),
        Err(e) => search_failed(&e),
    }
}

/// Venue details endpoint
///
/// GET /api/restaurants/{place_id}
async fn restaurant_details(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let place_id = path.into_inner();

    match state.search.details(&place_id).await {
        Ok(details) => HttpResponse::Ok().json(RestaurantDetailsResponse {
            place_id,
            details,
            timestamp: chrono::Utc::now(),
        }),
        Err(e) if e.is_not_found() => HttpResponse::NotFound().json(ErrorResponse {
            error: "Restaurant not found".to_string(),
            message: e.to_string(),
            status_code: 404,
        }),
        Err(e) => search_failed(&e),
    }
}
