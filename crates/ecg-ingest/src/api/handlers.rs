//! API request handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderMap, Method, Uri, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use base64::prelude::*;

use crate::core::extractor::process_bytes;
use crate::storage::{StoredArtifacts, base_name, hinted_format};
use crate::types::FormatTag;

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse, InfoResponse, UPLOAD_SERVER_HEADER, UPLOAD_SUCCESS_BODY},
};

/// Upload handler for `POST` and `PUT` on any path.
///
/// The body is the raw file. Its name is taken from the request when the
/// device provides one; the extension always comes from the content.
pub async fn upload_handler(
    State(state): State<ApiState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }

    let suggested = suggested_name(&method, uri.path(), &headers);
    let hinted = suggested.as_deref().and_then(hinted_format);
    let store = state.store.clone();

    let (format, artifacts) = tokio::task::spawn_blocking(move || {
        let result = process_bytes(&body);
        let base = base_name(suggested.as_deref(), chrono::Local::now().naive_local());
        store
            .persist(&body, &result, &base)
            .map(|artifacts| (result.format, artifacts))
    })
    .await
    .map_err(|e| ApiError::Task(e.to_string()))??;

    log_upload(&method, format, hinted, &artifacts);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain"),
            (header::CONNECTION, "close"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::PRAGMA, "no-cache"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::SERVER, UPLOAD_SERVER_HEADER),
        ],
        UPLOAD_SUCCESS_BODY,
    )
        .into_response())
}

/// CORS preflight answer for recorders that probe before uploading.
pub async fn options_handler() -> impl IntoResponse {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, PUT, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Authorization, Content-Type"),
        (header::CONNECTION, "close"),
        (header::SERVER, UPLOAD_SERVER_HEADER),
    ]
}

/// Human readable status page.
pub async fn status_page_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let page = format!(
        "<html>\n<head><title>ECG Upload Server</title></head>\n<body>\n\
         <h1>ECG Upload Server</h1>\n\
         <p>Server is running and ready to receive uploads via HTTP POST/PUT</p>\n\
         <p>Upload directory: {}/</p>\n\
         </body>\n</html>\n",
        escape_html(&state.store.root().display().to_string())
    );

    (
        [(header::CONNECTION, "close"), (header::SERVER, UPLOAD_SERVER_HEADER)],
        Html(page),
    )
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Server info endpoint handler.
///
/// GET /info
pub async fn info_handler(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        upload_directory: state.store.root().display().to_string(),
        auth_enabled: state.config.auth.is_some(),
    })
}

/// Reject uploads without valid HTTP Basic credentials.
///
/// Passes everything through when no credentials are configured.
pub async fn require_basic_auth(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.auth.as_ref() else {
        return Ok(next.run(request).await);
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_credentials)
        .is_some_and(|(username, password)| username == expected.username && password == expected.password);

    if !authorized {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected upload without valid credentials"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Decode an `Authorization: Basic ...` value into `(username, password)`.
pub(crate) fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Name suggested by the request, if any.
///
/// `POST` prefers a `Content-Disposition` `filename=` parameter and falls back
/// to the last non-empty path segment. `PUT` uses the final path segment.
pub(crate) fn suggested_name(method: &Method, path: &str, headers: &HeaderMap) -> Option<String> {
    if *method == Method::POST {
        let from_header = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        if from_header.is_some() {
            return from_header;
        }

        return path
            .trim_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(String::from);
    }

    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(String::from)
}

fn content_disposition_filename(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let name = rest.split(';').next().unwrap_or(rest).trim().trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}

fn log_upload(method: &Method, format: FormatTag, hinted: Option<FormatTag>, artifacts: &StoredArtifacts) {
    tracing::info!(
        method = %method,
        file = %artifacts.primary.display(),
        format = format.label(),
        bytes = artifacts.primary_bytes,
        "received upload"
    );

    if let Some(hinted) = hinted.filter(|hinted| *hinted != format) {
        tracing::info!(named = %hinted, detected = %format, "upload name did not match its content");
    }

    if let (Some(path), Some(bytes)) = (&artifacts.extracted, artifacts.extracted_bytes) {
        tracing::info!(file = %path.display(), bytes, "also extracted PDF");
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_disposition(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_basic_credentials() {
        let value = format!("Basic {}", BASE64_STANDARD.encode("admin:admin123"));
        assert_eq!(
            parse_basic_credentials(&value),
            Some(("admin".to_string(), "admin123".to_string()))
        );

        let lower = format!("basic {}", BASE64_STANDARD.encode("a:b:c"));
        assert_eq!(parse_basic_credentials(&lower), Some(("a".to_string(), "b:c".to_string())));
    }

    #[test]
    fn test_parse_basic_credentials_rejects_malformed() {
        assert_eq!(parse_basic_credentials("Bearer token"), None);
        assert_eq!(parse_basic_credentials("Basic !!!"), None);
        assert_eq!(parse_basic_credentials("Basic"), None);
        let no_colon = format!("Basic {}", BASE64_STANDARD.encode("admin"));
        assert_eq!(parse_basic_credentials(&no_colon), None);
    }

    #[test]
    fn test_post_name_from_content_disposition() {
        let headers = headers_with_disposition("attachment; filename=\"study 7.xml\"");
        assert_eq!(
            suggested_name(&Method::POST, "/upload/ignored.bin", &headers),
            Some("study 7.xml".to_string())
        );

        let headers = headers_with_disposition("form-data; name=\"file\"; filename=report.pdf; size=12");
        assert_eq!(suggested_name(&Method::POST, "/", &headers), Some("report.pdf".to_string()));
    }

    #[test]
    fn test_post_name_from_path() {
        let empty = HeaderMap::new();
        assert_eq!(suggested_name(&Method::POST, "/ecg/upload/", &empty), Some("upload".to_string()));
        assert_eq!(suggested_name(&Method::POST, "/", &empty), None);
        assert_eq!(
            suggested_name(&Method::POST, "/x", &headers_with_disposition("inline")),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_put_name_ignores_disposition() {
        let headers = headers_with_disposition("attachment; filename=\"other.xml\"");
        assert_eq!(suggested_name(&Method::PUT, "/data/ecg.xml", &headers), Some("ecg.xml".to_string()));
        assert_eq!(suggested_name(&Method::PUT, "/data/", &headers), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<dir>&"), "&lt;dir&gt;&amp;");
    }
}
