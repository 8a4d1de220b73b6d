//! rusty-forum/crates/rf-api/src/middleware.rs Middleware
//!
//! Request pre-processing that has to happen before routing: HTML forms can
//! only send GET and POST, so a POST may carry `_method` to reach the PUT,
//! PATCH or DELETE route, and every state-changing request must carry a valid
//! CSRF token.

use actix_web::body::{EitherBody, MessageBody};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::error::ErrorInternalServerError;
use actix_web::http::Method;
use actix_web::middleware::{Logger, Next};
use actix_web::web::{self, Bytes, Data};
use actix_web::{Error, HttpMessage};
use rf_core::AppError;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::CsrfToken;
use crate::handlers::AppState;

pub const CSRF_COOKIE: &str = "csrf";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

// Returns a standard access logger for the forum.
pub fn standard_middleware() -> Logger {
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

/// The hidden fields forms use to steer the middleware.
#[derive(Debug, Default, Deserialize)]
struct FormMeta {
    #[serde(rename = "_method")]
    method: Option<String>,
    #[serde(rename = "_csrf")]
    csrf: Option<String>,
}

impl FormMeta {
    fn parse(raw: &str) -> Self {
        web::Query::<FormMeta>::from_query(raw)
            .map(web::Query::into_inner)
            .unwrap_or_default()
    }

    /// Body fields win over query parameters.
    fn or(self, fallback: FormMeta) -> FormMeta {
        FormMeta {
            method: self.method.or(fallback.method),
            csrf: self.csrf.or(fallback.csrf),
        }
    }
}

fn override_method(raw: &str) -> Option<Method> {
    match raw.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

// Puts an already-read body back so the handler's extractor can read it again.
fn bytes_to_payload(buf: Bytes) -> Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(buf);
    Payload::from(payload)
}

/// Method override and CSRF verification.
///
/// Issues a random seed in the `csrf` cookie when the browser has none and
/// exposes the matching form token to handlers as [`CsrfToken`]. Unsafe
/// methods must present the token as `_csrf` (form field or query parameter)
/// or in the `X-CSRF-Token` header, otherwise the request ends with 400
/// before any handler runs.
pub async fn csrf_guard<B>(
    mut req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let Some(state) = req.app_data::<Data<AppState>>().cloned() else {
        return Err(ErrorInternalServerError("application state is not configured"));
    };

    let mut meta = FormMeta::parse(req.query_string());
    if req.method() == Method::POST && req.content_type() == "application/x-www-form-urlencoded" {
        let body = req.extract::<Bytes>().await?;
        if let Ok(raw) = std::str::from_utf8(&body) {
            meta = FormMeta::parse(raw).or(meta);
        }
        req.set_payload(bytes_to_payload(body));
    }

    if req.method() == Method::POST {
        if let Some(method) = meta.method.as_deref().and_then(override_method) {
            req.head_mut().method = method;
        }
    }

    let existing = req
        .request()
        .cookie(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|seed| !seed.is_empty());
    let fresh = existing.is_none();
    let seed = existing.unwrap_or_else(|| state.auth.issue_csrf_seed());

    if !is_safe(req.method()) {
        let token = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .or(meta.csrf);
        let valid = !fresh && token.is_some_and(|token| state.auth.verify_csrf(&seed, &token));
        if !valid {
            log::warn!("{} {} rejected: missing or invalid CSRF token", req.method(), req.path());
            let err = ApiError(AppError::BadRequest("missing or invalid CSRF token".into()));
            return Ok(req.error_response(err).map_into_right_body());
        }
    }

    req.extensions_mut()
        .insert(CsrfToken(state.auth.csrf_token(&seed)));

    let mut res = next.call(req).await?;
    if fresh {
        let cookie = Cookie::build(CSRF_COOKIE, seed)
            .path("/")
            .same_site(SameSite::Strict)
            .http_only(true)
            .finish();
        res.response_mut()
            .add_cookie(&cookie)
            .map_err(ErrorInternalServerError)?;
    }
    Ok(res.map_into_left_body())
}
