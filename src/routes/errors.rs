use crate::render::{error_messages, Rendered};
use rocket::{
    http::Status,
    response::{self, Responder},
    Request,
};
use tracing::{error, warn};
use yatube_models::Error;

#[derive(Debug)]
pub struct ErrorPage(Error);

impl From<Error> for ErrorPage {
    fn from(err: Error) -> ErrorPage {
        ErrorPage(err)
    }
}

impl<'r> Responder<'r, 'static> for ErrorPage {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self.0 {
            Error::NotFound => Err(Status::NotFound),
            Error::Unauthorized => Err(Status::Forbidden),
            Error::Validation(errors) => {
                warn!("rejected input on {}: {}", req.uri(), errors);
                (
                    Status::UnprocessableEntity,
                    render!({ "errors": error_messages(&errors) }),
                )
                    .respond_to(req)
            }
            Error::DbPool => {
                error!("no database connection available for {}", req.uri());
                Err(Status::ServiceUnavailable)
            }
            err => {
                error!("error while answering {}: {}", req.uri(), err);
                Err(Status::InternalServerError)
            }
        }
    }
}

fn error_document(status: Status, message: &str) -> (Status, Rendered) {
    (
        status,
        render!({
            "status": status.code,
            "error": status.reason().unwrap_or("Error"),
            "message": message,
        }),
    )
}

#[catch(403)]
pub fn forbidden() -> (Status, Rendered) {
    error_document(Status::Forbidden, "You are not allowed to do that.")
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> (Status, Rendered) {
    warn!("nothing found at {}", req.uri());
    error_document(Status::NotFound, "The requested page was not found.")
}

#[catch(422)]
pub fn unprocessable_entity() -> (Status, Rendered) {
    error_document(
        Status::UnprocessableEntity,
        "The submitted data could not be understood.",
    )
}

#[catch(500)]
pub fn server_error() -> (Status, Rendered) {
    error_document(
        Status::InternalServerError,
        "Something went wrong on our side.",
    )
}

#[catch(503)]
pub fn service_unavailable() -> (Status, Rendered) {
    error_document(
        Status::ServiceUnavailable,
        "The server is too busy right now, try again later.",
    )
}
