use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, Response};
use axum::middleware::Next;
use axum::response::IntoResponse;
use http_body_util::LengthLimitError;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};

use crate::web::api::ApiError;

/// Largest request body the logging middleware will buffer.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Logs method, path and query of every request, plus the body of POST and PUT requests.
pub async fn log_request_middleware(request: Request, next: Next) -> axum::response::Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    tracing::info!("{:<6} {:<30} {}", method, path, query);

    let request = if method == Method::POST || method == Method::PUT {
        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => return body_error(err).into_response(),
        };
        if !bytes.is_empty() {
            tracing::info!("  Body: {}", String::from_utf8_lossy(&bytes));
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    next.run(request).await
}

fn body_error(err: axum::Error) -> ApiError {
    let err = err.into_inner();
    if err.is::<LengthLimitError>() {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedBody(err.to_string())
    }
}

/// Layer that logs how long each request took and the status it ended with.
#[derive(Clone, Default)]
pub struct RequestTimingLayer;

impl RequestTimingLayer {
    /// Creates a new RequestTimingLayer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestTimingLayer {
    type Service = RequestTimingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTimingService { inner }
    }
}

/// Service that times the wrapped service's responses.
#[derive(Clone)]
pub struct RequestTimingService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<axum::http::Request<ReqBody>> for RequestTimingService<S>
where
    S: Service<axum::http::Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = RequestTimingFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: axum::http::Request<ReqBody>) -> Self::Future {
        RequestTimingFuture {
            future: self.inner.call(request),
            started_at: Instant::now(),
        }
    }
}

pin_project! {
    /// Future that logs the elapsed time once the response is ready
    pub struct RequestTimingFuture<F> {
        #[pin]
        future: F,
        started_at: Instant,
    }
}

impl<F, ResBody, E> Future for RequestTimingFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match this.future.poll(cx) {
            Poll::Ready(Ok(response)) => {
                tracing::info!(
                    "  Время обработки: {}ms ({})",
                    this.started_at.elapsed().as_millis(),
                    response.status().as_u16()
                );
                Poll::Ready(Ok(response))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}
