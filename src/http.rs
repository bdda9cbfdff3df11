use crate::errors::AppError;
use crate::generation::{GenerationJob, GenerationRequest};
use crate::models::{BooleanResponse, CreatePolicyPayload, ListPoliciesFilters, Policy, UpdatePolicyPayload};
use crate::records::Selection;
use crate::service::PracticeService;
use crate::validation::FieldError;
use crate::views::{ViewPage, ViewSummary};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PracticeService>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Capacity(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        let fields = match &self {
            Self::Validation(errors) => Some(errors.fields().to_vec()),
            _ => None,
        };
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, AppError>;

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::invalid("body", rejection.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::invalid("query", rejection.body_text()))
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/policies", get(list_policies).post(create_policy))
        .route(
            "/policies/:id",
            get(get_policy).patch(update_policy).delete(delete_policy),
        )
        .route("/views", get(view_summaries))
        .route("/views/:kind", get(list_view).post(create_record))
        .route("/views/:kind/:id", get(view_detail))
        .route("/generation", get(list_generation_jobs).post(enqueue_generation))
        .route("/generation/:id", get(generation_job))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> &'static str {
    "ok"
}

async fn create_policy(
    State(state): State<AppState>,
    body: Result<Json<CreatePolicyPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Policy>)> {
    let policy = state.service.create_policy(json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(policy)))
}

async fn list_policies(
    State(state): State<AppState>,
    query: Result<Query<ListPoliciesFilters>, QueryRejection>,
) -> ApiResult<Json<Vec<Policy>>> {
    Ok(Json(state.service.list_policies(query_params(query)?)?))
}

async fn get_policy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Policy>> {
    Ok(Json(state.service.get_policy(&id)?))
}

async fn update_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePolicyPayload>, JsonRejection>,
) -> ApiResult<Json<Policy>> {
    Ok(Json(state.service.update_policy(&id, json_body(body)?)?))
}

async fn delete_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BooleanResponse>> {
    Ok(Json(state.service.delete_policy(&id)?))
}

async fn view_summaries(State(state): State<AppState>) -> ApiResult<Json<Vec<ViewSummary>>> {
    Ok(Json(state.service.view_summaries()?))
}

async fn list_view(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ViewPage>> {
    Ok(Json(state.service.list_view(&kind, &params)?))
}

async fn create_record(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let record = state.service.create_record(&kind, &json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn view_detail(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<Selection<Value>>> {
    Ok(Json(state.service.view_detail(&kind, &id)?))
}

async fn enqueue_generation(
    State(state): State<AppState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GenerationJob>)> {
    let job = state.service.enqueue_generation(json_body(body)?).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

async fn list_generation_jobs(State(state): State<AppState>) -> Json<Vec<GenerationJob>> {
    Json(state.service.generation_jobs().await)
}

async fn generation_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GenerationJob>> {
    Ok(Json(state.service.generation_job(&id).await?))
}
