//! HTTP rendering of domain errors.

use actix_web::error::UrlencodedError;
use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use askama::Template;
use rf_core::AppError;
use rf_ui::{ErrorTemplate, Layout};

use crate::extract::removal_session_cookie;

/// Wraps `AppError` so it can be returned straight from handlers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(err.into())
    }
}

pub type ApiResult<T = HttpResponse> = Result<T, ApiError>;

/// `FormConfig` error handler: a missing or unparsable field is a validation
/// failure (422 with the error page) rather than actix's plain-text 400.
pub fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        UrlencodedError::Parse(parse) => ApiError(AppError::invalid(format!("Invalid form: {parse}"))).into(),
        other => other.into(),
    }
}

impl ApiError {
    /// Lines shown on the error page. Internal details stay in the log.
    fn messages(&self) -> Vec<String> {
        match &self.0 {
            AppError::Validation(messages) => messages.clone(),
            AppError::Internal(_) => vec!["Something went wrong on our side.".into()],
            AppError::Unauthenticated => vec!["Please log in first.".into()],
            AppError::NotFound(what, _) => vec![format!("{what} not found.")],
            other => vec![other.to_string()],
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Banned => StatusCode::SEE_OTHER,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Banned = self.0 {
            return HttpResponse::SeeOther()
                .insert_header((LOCATION, "/login?banned=1"))
                .cookie(removal_session_cookie())
                .finish();
        }
        if let AppError::Internal(detail) = &self.0 {
            log::error!("internal error: {detail}");
        }

        let status = self.status_code();
        let page = ErrorTemplate {
            layout: Layout::new(status.canonical_reason().unwrap_or("Error"), None, ""),
            status: status.as_u16(),
            messages: self.messages(),
        };
        match page.render() {
            Ok(html) => HttpResponse::build(status)
                .content_type(ContentType::html())
                .body(html),
            Err(err) => {
                log::error!("error page failed to render: {err}");
                HttpResponse::build(status).body(self.to_string())
            }
        }
    }
}
