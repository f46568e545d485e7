pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    extract::State,
    http::{HeaderValue, Method, Request},
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware, tracing::REQUEST_ID_HEADER,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::{self, server::ServerBuilder},
    OpenApi,
};

use crate::config::AnalyzerConfig;
use crate::dtos::HealthResponse;
use crate::services::providers::ProviderSlot;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MLB Analyzer API",
        description = "Hot and cold hitter/pitcher streaks and slate matchups"
    ),
    paths(
        health_check,
        handlers::provider_raw::provider_raw,
        handlers::slate::slate_scan,
        handlers::streaks::hot_streak_hitters,
        handlers::streaks::cold_streak_hitters,
        handlers::streaks::pitcher_streaks,
        handlers::streaks::cold_pitchers,
        handlers::players::league_hot_hitters,
        handlers::players::league_cold_hitters,
        handlers::players::verify_hitless_streak,
        handlers::players::cold_candidates,
        handlers::schedule::schedule,
        handlers::self_test::self_test,
    ),
    components(
        schemas(
            dtos::HealthResponse,
            dtos::HitterStreakResult,
            dtos::PitcherStreakResult,
            dtos::SlateScanResponse,
            dtos::ProviderRawResponse,
            dtos::RawCounts,
            dtos::SelfTestResponse,
            dtos::SelfTestProvider,
            dtos::CheckResult,
            dtos::LeagueHittersResponse,
            dtos::HitlessStreakResponse,
            dtos::ColdCandidatesResponse,
            dtos::ColdCandidate,
            dtos::CandidateNote,
            services::matchups::Matchups,
            services::matchups::HitterVsPitcher,
            services::matchups::PitcherVsHitter,
            models::Hitter,
            models::Pitcher,
            models::HitterLookup,
            models::Schedule,
            models::Game,
            models::GameSide,
            models::GameStatus,
            models::ProbablePitcher,
        )
    ),
    tags(
        (name = "Slate", description = "Full-slate scan with matchups"),
        (name = "Streaks", description = "Single-bucket hot and cold filters"),
        (name = "Provider", description = "Raw provider data"),
        (name = "Schedule", description = "Daily schedule"),
        (name = "Observability", description = "Service health and self test"),
    )
)]
pub struct ApiDoc;

/// The OpenAPI document, listing `public_base_url` as its server when set.
pub fn openapi_document(public_base_url: Option<&str>) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if let Some(url) = public_base_url {
        doc.servers = Some(vec![ServerBuilder::new().url(url).build()]);
    }
    doc
}

#[derive(Clone)]
pub struct AppState {
    pub config: AnalyzerConfig,
    pub provider: ProviderSlot,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    layer
        .allow_origin(
            origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                        None
                    }
                })
                .collect::<Vec<HeaderValue>>(),
        )
        .allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let public_base_url = state.config.public_base_url.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/openapi.json",
            get(move || {
                let doc = openapi_document(public_base_url.as_deref());
                async move { Json(doc) }
            }),
        )
        .route("/provider_raw", get(handlers::provider_raw))
        .route("/slate_scan", get(handlers::slate_scan))
        .route("/hot_streak_hitters", get(handlers::hot_streak_hitters))
        .route("/cold_streak_hitters", get(handlers::cold_streak_hitters))
        .route("/pitcher_streaks", get(handlers::pitcher_streaks))
        .route("/cold_pitchers", get(handlers::cold_pitchers))
        .route("/cold_candidates", get(handlers::cold_candidates))
        .route("/mlb/schedule", get(handlers::schedule::schedule))
        .route("/mlb/hot_hitters", get(handlers::league_hot_hitters))
        .route("/mlb/cold_hitters", get(handlers::league_cold_hitters))
        .route(
            "/mlb/verify_hitless_streak",
            get(handlers::verify_hitless_streak),
        )
        .route("/self_test", get(handlers::self_test::self_test))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up; provider_loaded reports the data provider", body = HealthResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let slot = &state.provider;

    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
        provider_loaded: slot.is_loaded(),
        provider: slot
            .provider
            .as_ref()
            .map(|p| p.name().to_string())
            .or_else(|| slot.selector.clone()),
        last_provider_error: slot.last_error.clone(),
    })
}
