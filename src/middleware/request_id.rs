use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use crate::response::ErrorBody;

/// Plain-text error bodies larger than this are replaced by the status reason.
const MAX_PLAIN_ERROR_BYTES: usize = 4 * 1024;

pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| is_valid_request_id(s))
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", request_id = %request_id);
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = async move {
        let start = std::time::Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            method = %method,
            path = %path,
            status = %response.status().as_u16(),
            latency_ms = %start.elapsed().as_millis(),
            "request completed"
        );
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    let status = response.status();
    if (status.is_client_error() || status.is_server_error()) && !is_json_content_type(&response) {
        // Framework rejections (404, 405, 413) come back as plain text.
        wrap_plain_error_as_json(response).await
    } else {
        response
    }
}

fn is_json_content_type(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false)
}

async fn wrap_plain_error_as_json(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    let reason = parts.status.canonical_reason().unwrap_or("Error");

    let message = to_bytes(body, MAX_PLAIN_ERROR_BYTES)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| reason.to_string());

    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    let json = axum::Json(ErrorBody { message }).into_response();
    let (json_parts, json_body) = json.into_parts();
    parts.headers.extend(json_parts.headers);
    Response::from_parts(parts, json_body)
}

/// 校验客户端提供的 x-request-id：长度不超过 128 字符，仅允许字母数字、连字符和下划线
fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
