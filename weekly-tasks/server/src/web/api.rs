use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::task::ValidationError;
use crate::task::api::{TaskState, create_task_router};

/// JSON envelope for every failed API request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    success: bool,
    /// Human readable explanation
    message: String,
    /// Empty list, only present when a day filter matched nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<serde_json::Value>>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            success: false,
            message,
            data: None,
        }
    }

    fn with_empty_data(mut self) -> Self {
        self.data = Some(Vec::new());
        self
    }
}

/// JSON body returned for requests that match no route.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteNotFoundResponse {
    success: bool,
    message: String,
    path: String,
    method: String,
}

impl RouteNotFoundResponse {
    pub fn new(path: String, method: String) -> Self {
        Self {
            success: false,
            message: "Маршрут не найден".to_string(),
            path,
            method,
        }
    }
}

/// Error type for JSON API handlers. Each variant maps to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A task field is missing or outside its allowed values.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No task has the requested ID. Holds the ID as it appeared in the path.
    #[error("Задача с ID {0} не найдена")]
    TaskNotFound(String),
    /// The day filter matched no tasks.
    #[error("Задачи на день \"{0}\" не найдены")]
    NoTasksForDay(String),
    /// A request body was sent without a JSON content type.
    #[error("Content-Type должен быть application/json")]
    UnsupportedContentType,
    /// The request body could not be read as the expected JSON.
    #[error("Некорректное тело запроса: {0}")]
    MalformedBody(String),
    /// The path or query string could not be read.
    #[error("Некорректный запрос: {0}")]
    MalformedRequest(String),
    #[error("Тело запроса слишком большое")]
    PayloadTooLarge,
    /// Anything unexpected.
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::UnsupportedContentType
            | ApiError::MalformedBody(_)
            | ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TaskNotFound(_) | ApiError::NoTasksForDay(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        } else {
            tracing::info!("Request rejected with {}: {}", status_code, self);
        }

        let response = ErrorResponse::new(self.to_string());
        let response = match self {
            ApiError::NoTasksForDay(_) => response.with_empty_data(),
            _ => response,
        };
        (status_code, Json(response)).into_response()
    }
}

/// JSON request body extractor.
///
/// An empty body deserializes to `T::default()`. A non-empty body must be sent
/// as `application/json`.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
                _ => ApiError::MalformedBody(rejection.body_text()),
            })?;

        if bytes.is_empty() {
            return Ok(JsonBody(T::default()));
        }
        if !is_json {
            return Err(ApiError::UnsupportedContentType);
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| ApiError::MalformedBody(err.to_string()))
    }
}

/// Query string extractor that rejects with the JSON error envelope.
#[derive(Debug, Clone, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))?;
        Ok(ApiQuery(query))
    }
}

/// Path parameter extractor that rejects with the JSON error envelope.
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))?;
        Ok(ApiPath(path))
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Weekly Tasks API", description = "Tasks planned across the days of the week"),
    paths(
        crate::task::api::get_tasks_handler,
        crate::task::api::get_task_handler,
        crate::task::api::create_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
        crate::task::api::get_statistics_handler,
    ),
    components(schemas(ErrorResponse)),
    tags((name = "Tasks", description = "Task management"))
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints together with their Swagger UI.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    Router::new()
        .merge(create_task_router(task_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
