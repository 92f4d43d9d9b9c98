use crate::server::AppState;
use actix_web::{HttpResponse, get, web::Data};
use utoipa_actix_web::service_config::ServiceConfig;

pub fn configure_routes(config: &mut ServiceConfig) {
    config.service(helloworld).service(shutdown);
}

#[utoipa::path(
    responses(
        (status = 200, description = "The node's advertised address", body = String, content_type = "text/plain")
    ),
    tags = ["health"]
)]
#[get("/helloworld")]
pub async fn helloworld(app_state: Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(app_state.node.local().address.clone())
}

#[utoipa::path(
    summary = "Stop the node",
    description = "Answers, then stops the HTTP server gracefully. The node does not leave the ring first.",
    responses(
        (status = 200, description = "Shutdown scheduled")
    ),
    tags = ["health"]
)]
#[get("/shutdown")]
pub async fn shutdown(app_state: Data<AppState>) -> HttpResponse {
    app_state.node.request_shutdown();
    HttpResponse::Ok().body("Shutting down")
}
