// src/server/handler.rs
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::Instrument;
use uuid::Uuid;

use crate::health::{Actuator, Health};

/// Serves the aggregate health report on a single path.
///
/// The status code is 200 whatever the aggregate status is; callers read the
/// `status` field of the body.
#[derive(Clone)]
pub struct HealthHandler {
    actuator: Arc<Actuator>,
    path: Arc<str>,
}

impl HealthHandler {
    pub fn new(actuator: Arc<Actuator>, path: impl Into<Arc<str>>) -> Self {
        Self {
            actuator,
            path: path.into(),
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        if req.uri().path() != &*self.path {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        if req.method() != Method::GET && req.method() != Method::HEAD {
            return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }

        let with_details = wants_details(req.uri().query());
        let health = self.actuator.health(with_details).await;
        tracing::debug!(with_details, status = %health.status, "health evaluated");

        health_response(&health)
    }
}

/// Whether the query string asks for details: `detail` or `details` whose
/// first value is empty or `true`.
pub fn wants_details(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };

    ["detail", "details"].iter().any(|key| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == key)
            .map_or(false, |(_, value)| value.is_empty() || value == "true")
    })
}

fn health_response(health: &Health) -> Response<Body> {
    match serde_json::to_vec_pretty(health) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            tracing::error!(%e, "failed to serialize health status");
            text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to marshal health status: {}", e),
            )
        }
    }
}

fn text_response(status: StatusCode, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

impl Service<Request<Body>> for HealthHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        let span = tracing::info_span!(
            "health_request",
            request_id = %Uuid::new_v4(),
            method = %req.method(),
            path = %req.uri().path(),
        );
        Box::pin(async move { Ok(handler.handle(req).await) }.instrument(span))
    }
}
