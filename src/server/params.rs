//! Request parameters
//!
//! Write endpoints accept their parameters either in the URL or as an
//! `application/x-www-form-urlencoded` body. Both sources are merged into one
//! map: body values override URL values, and a key given several times keeps
//! its last value.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use std::collections::HashMap;

use crate::server::routes::{ApiError, ErrorResponse};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Default)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// A parameter the endpoint can't do without; absent means 400.
    pub fn required(&self, key: &str) -> Result<&str, ApiError> {
        self.get(key).ok_or_else(|| {
            tracing::warn!("Rejected request: missing parameter '{}'", key);
            bad_request(format!("missing parameter '{}'", key))
        })
    }

    fn merge(&mut self, encoded: &[u8]) {
        for (key, value) in url::form_urlencoded::parse(encoded) {
            self.0.insert(key.into_owned(), value.into_owned());
        }
    }
}

impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = Params::default();
        if let Some(query) = req.uri().query() {
            params.merge(query.as_bytes());
        }

        if is_form(req.headers()) {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| bad_request(rejection.body_text()))?;
            params.merge(&body);
        }

        Ok(params)
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn extract(uri: &str, content_type: Option<&str>, body: &'static str) -> Params {
        let mut builder = Request::builder().method("PUT").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();
        Params::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_query_and_form_body_are_merged() {
        let params = extract(
            "/advisories?type=info&message=from%20url",
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "message=from+body",
        )
        .await;

        assert_eq!(params.get("type"), Some("info"));
        assert_eq!(params.get("message"), Some("from body"));
    }

    #[tokio::test]
    async fn test_repeated_key_keeps_last_value() {
        let params = extract("/advisories?id=1&id=2", None, "").await;
        assert_eq!(params.get("id"), Some("2"));
    }

    #[tokio::test]
    async fn test_body_ignored_without_form_content_type() {
        let params = extract("/advisories", Some("application/json"), "type=alert").await;
        assert_eq!(params.get("type"), None);
    }

    #[tokio::test]
    async fn test_missing_required_is_bad_request() {
        let params = extract("/advisories?type=alert", None, "").await;

        let (status, Json(body)) = params.required("message").unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "missing parameter 'message'");
    }
}
