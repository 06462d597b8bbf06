use askama::Template;
use axum::Json;
use axum::extract::OriginalUri;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{Method, StatusCode, header};
use axum::middleware::from_fn;
use axum::response::{Html, IntoResponse, Response};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{self, Config};
use crate::task::api::TaskState;
use crate::task::{Day, Priority, Status, TaskStore};
use crate::web::api::{ApiError, RouteNotFoundResponse, create_api_router};
use crate::web::middleware::{RequestTimingLayer, log_request_middleware};

pub mod api;
pub mod middleware;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tasks: Arc<TaskState>,
}

impl AppState {
    /// Creates the application state, seeding the task store when configured to.
    pub fn from_config(config: Config) -> Self {
        let store = if config.seed_tasks {
            TaskStore::with_seed_tasks()
        } else {
            TaskStore::new()
        };
        Self {
            config: Arc::new(config),
            tasks: Arc::new(TaskState::new(store)),
        }
    }
}

/// Custom error type for web handler operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl axum::response::IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{}: {:?}", self, self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(
                "<h1>Внутренняя ошибка сервера</h1><p>Не удалось отобразить страницу. Попробуйте позже.</p>",
            ),
        )
            .into_response()
    }
}

/// Builds the complete application router: task API, UI page, static files and fallbacks.
pub fn create_app(state: AppState) -> axum::Router {
    use axum::Router;

    let static_files = ServeDir::new(&state.config.static_dir)
        .not_found_service(route_not_found_handler.into_service());
    let api_router = create_api_router(state.tasks.clone());

    Router::new()
        .merge(api_router)
        .route("/", axum::routing::get(index_handler))
        .route("/health", axum::routing::get(health_check_handler))
        .nest_service("/static", static_files)
        .fallback(route_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(AnyOrigin)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
                )
                .layer(RequestTimingLayer::new())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(from_fn(log_request_middleware)),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);
    tracing::info!(
        "API documentation: http://{}/swagger-ui (GET/POST http://{}/api/tasks)",
        server_address,
        server_address
    );

    let state = AppState::from_config(config);
    tracing::info!(
        "Task store ready with {} tasks",
        state.tasks.store.read().await.len()
    );

    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn index_handler() -> Result<Html<String>, WebError> {
    render_page(&IndexTemplate::new())
}

fn render_page(template: &impl Template) -> Result<Html<String>, WebError> {
    template.render().map(Html).map_err(WebError::from)
}

/// Answers every request that matched no route.
#[tracing::instrument]
pub async fn route_not_found_handler(
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFoundResponse::new(
            uri.path().to_string(),
            method.to_string(),
        )),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Внутренняя ошибка сервера".to_string()
    };
    ApiError::Internal(anyhow::anyhow!(message)).into_response()
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    days: &'static [Day],
    priorities: &'static [Priority],
    statuses: &'static [Status],
}

impl IndexTemplate {
    pub fn new() -> Self {
        Self {
            days: &Day::ALL,
            priorities: &Priority::ALL,
            statuses: &Status::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    async fn exploding_handler() -> &'static str {
        panic!("handler exploded")
    }

    async fn send(request: axum::http::Request<Body>) -> Response {
        create_app(AppState::from_config(Config::default()))
            .oneshot(request)
            .await
            .unwrap()
    }

    struct Unprintable;

    impl std::fmt::Display for Unprintable {
        fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Err(std::fmt::Error)
        }
    }

    #[derive(Template)]
    #[template(source = "<p>{{ value }}</p>", ext = "html")]
    struct BrokenTemplate {
        value: Unprintable,
    }

    #[tokio::test]
    async fn can_turn_failed_render_into_internal_server_error() {
        let web_error = render_page(&BrokenTemplate { value: Unprintable }).unwrap_err();
        assert!(matches!(web_error, WebError::Template(_)));

        let response = web_error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_text = std::str::from_utf8(&body).unwrap();
        assert!(body_text.contains("Внутренняя ошибка сервера"));
    }

    #[tokio::test]
    async fn can_render_index_through_handler() {
        let Html(body) = index_handler().await.unwrap();

        assert!(body.contains("<option value=\"Среда\">Среда</option>"));
    }

    #[test]
    fn can_render_index_with_every_day() {
        let body = IndexTemplate::new().render().unwrap();

        for day in Day::ALL {
            assert!(body.contains(day.as_str()));
        }
        assert!(body.contains("в процессе"));
        assert!(body.contains("/static/app.js"));
    }

    #[tokio::test]
    async fn can_answer_unknown_route_with_json() {
        let response = send(
            axum::http::Request::builder()
                .method("PATCH")
                .uri("/nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "message": "Маршрут не найден",
                "path": "/nowhere",
                "method": "PATCH",
            })
        );
    }

    #[tokio::test]
    async fn can_turn_panic_into_internal_error() {
        let app = axum::Router::new()
            .route("/panic", axum::routing::get(exploding_handler))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/panic")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "handler exploded");
    }

    #[tokio::test]
    async fn can_serve_browser_script() {
        let response = send(
            axum::http::Request::builder()
                .uri("/static/app.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
