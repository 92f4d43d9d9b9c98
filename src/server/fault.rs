use crate::server::AppState;
use actix_web::{HttpResponse, post, web::Data};
use utoipa_actix_web::service_config::ServiceConfig;

pub fn configure_routes(config: &mut ServiceConfig) {
    config.service(sim_crash).service(sim_recover);
}

#[utoipa::path(
    summary = "Simulate a crash",
    description = "Until recovery every other request is held without an answer",
    responses(
        (status = 200, description = "Node is now unresponsive")
    ),
    tags = ["fault"],
    operation_id = "simCrash"
)]
#[post("/sim-crash")]
async fn sim_crash(app_state: Data<AppState>) -> HttpResponse {
    app_state.node.fault().crash();
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    summary = "Recover from a simulated crash",
    responses(
        (status = 200, description = "Node answers again")
    ),
    tags = ["fault"],
    operation_id = "simRecover"
)]
#[post("/sim-recover")]
async fn sim_recover(app_state: Data<AppState>) -> HttpResponse {
    app_state.node.fault().recover();
    HttpResponse::Ok().finish()
}
