mod commands;

pub use commands::*;

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

use crate::error::JudgeError;

#[derive(Serialize)]
struct ErrorResponse {
    reason: &'static str,
    code: u32,
}

#[derive(Serialize)]
struct ErrorResponseWithMessage {
    reason: &'static str,
    code: u32,
    message: String,
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        reason: "ERR_INVALID_ARGUMENT",
        code: 1,
    });
    InternalError::from_response(err, response).into()
}

/// Maps a command failure to the response the gateway relays to the user
pub fn error_response(err: &JudgeError) -> HttpResponse {
    let (mut builder, reason, code) = match err {
        JudgeError::BadArgument(_)
        | JudgeError::UnknownCommand(_)
        | JudgeError::MalformedFixtureBatch(_)
        | JudgeError::NoCodeSupplied => (HttpResponse::BadRequest(), "ERR_INVALID_ARGUMENT", 1),
        JudgeError::UnknownProblem(_)
        | JudgeError::UnknownTestCase(_)
        | JudgeError::NoFixtures(_) => (HttpResponse::NotFound(), "ERR_NOT_FOUND", 3),
        JudgeError::PermissionDenied => (HttpResponse::Forbidden(), "ERR_FORBIDDEN", 4),
        JudgeError::SandboxUnavailable(_) => (HttpResponse::BadGateway(), "ERR_EXTERNAL", 5),
        JudgeError::Database(e) => {
            log::error!("Database failure while handling command: {e}");
            (HttpResponse::InternalServerError(), "ERR_INTERNAL", 6)
        }
    };

    builder.json(ErrorResponseWithMessage {
        reason,
        code,
        message: err.to_string(),
    })
}
