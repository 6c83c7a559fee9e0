//! An actix-web service to implement [Dockerflow](https://github.com/mozilla-services/Dockerflow).

use actix_web::{
    get,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use serde_json::json;
use zeitgeist_trends::TrendsService;

use crate::errors::HandlerError;

/// Handles required Dockerflow Endpoints.
pub fn configure(config: &mut ServiceConfig) {
    config
        .service(lbheartbeat)
        .service(heartbeat)
        .service(version)
        .service(test_error);
}

/// Used by the load balancer to indicate that the server can respond to
/// requests. Should just return OK.
#[get("__lbheartbeat__")]
async fn lbheartbeat() -> HttpResponse {
    HttpResponse::Ok().body("")
}

/// Return the contents of the `version.json` file created by CI and stored
/// in the Docker root (or the TBD version stored in the Git repo).
#[get("__version__")]
async fn version() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(include_str!("../version.json"))
}

/// Returns a status message indicating the current state of the server.
#[get("__heartbeat__")]
async fn heartbeat(service: Data<TrendsService>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "provider": service.provider_name(),
    }))
}

/// Returning an API error to test error handling.
#[get("__error__")]
async fn test_error() -> Result<HttpResponse, HandlerError> {
    tracing::error!(
        r#type = "dockerflow.error_endpoint",
        "The __error__ endpoint was called"
    );
    Err(HandlerError::internal())
}
