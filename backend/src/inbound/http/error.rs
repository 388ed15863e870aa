//! HTTP rendering of domain errors.
//!
//! The domain error stays transport agnostic; this module picks the status
//! code, echoes the trace id header and redacts internal failures. Extractor
//! failures (malformed JSON, query strings or paths) are funnelled through the
//! same envelope.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::InvalidReference => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(message = self.message(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

fn rejected(what: &str, detail: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(format!("{what}: {detail}")).into()
}

/// Extractor configuration rendering body, query and path failures as
/// `invalid_request`.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
                rejected("invalid JSON body", err)
            }),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
                rejected("invalid query string", err)
            }),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err: PathError, _req: &HttpRequest| rejected("invalid path", err)),
    );
}

#[cfg(test)]
mod tests;
