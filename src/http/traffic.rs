//! Traffic capture middleware.
//!
//! Per request:
//! 1. before `next`: start the clock, capture the request, dispatch the
//!    request phase message
//! 2. `next.run` (the downstream handler chain)
//! 3. after `next`: stop the clock, wrap the response body in a
//!    [`CaptureBody`]; the response phase message is dispatched once the
//!    body has been fully delivered (or dropped)
//!
//! Both phases fire regardless of the handler's outcome.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Request},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use futures_util::FutureExt;
use std::time::Instant;

use crate::client::UbtClient;
use crate::http::capture::CaptureBody;
use crate::http::extract::{capture_request, header_value};
use crate::message::{ExtraMessage, LogLevel, Message, ResMessage};

pub const LOG_TYPE_REQUEST: &str = "request";
pub const LOG_TYPE_RESPONSE: &str = "response";

/// Install the traffic middleware on every route of `router`.
pub fn with_traffic_capture(router: Router, client: UbtClient) -> Router {
    router.layer(from_fn_with_state(client, traffic_middleware))
}

pub async fn traffic_middleware(
    State(client): State<UbtClient>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();

    let (request, req_message) = capture_request(request, client.config()).await;
    let request_id = req_message.id.clone();
    tracing::debug!(
        request_id = %request_id,
        method = %req_message.method,
        path = %req_message.path,
        "Capturing request"
    );
    client
        .dispatch(
            Message::new(LogLevel::Info, LOG_TYPE_REQUEST).with_request(req_message),
            Some(ExtraMessage::log_type(LOG_TYPE_REQUEST)),
        )
        .await;

    let response = next.run(request).await;

    let response_time = started.elapsed().as_millis().to_string();
    let status = response.status().as_u16();
    let content_type = header_value(response.headers(), header::CONTENT_TYPE.as_str());

    let (parts, body) = response.into_parts();
    let body = CaptureBody::new(body, move |captured: Bytes| {
        async move {
            let res_message = ResMessage {
                status: Some(status),
                content_type,
                response_time,
                data: String::from_utf8_lossy(&captured).into_owned(),
            };
            tracing::debug!(request_id = %request_id, status, "Capturing response");
            client
                .dispatch(
                    Message::new(LogLevel::Info, LOG_TYPE_RESPONSE).with_response(res_message),
                    Some(ExtraMessage::log_type(LOG_TYPE_RESPONSE)),
                )
                .await;
        }
        .boxed()
    });

    Response::from_parts(parts, Body::new(body))
}
