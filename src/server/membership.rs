use crate::{error::ChordError, node::NodeInfo, server::AppState};
use actix_web::{
    HttpResponse, get, post,
    web::{Data, Json, Query},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_actix_web::service_config::ServiceConfig;

pub fn configure_routes(config: &mut ServiceConfig) {
    config
        .service(node_info)
        .service(network)
        .service(join)
        .service(leave);
}

#[derive(Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JoinQuery {
    /// `host:port` of any current ring member.
    pub nprime: String,
}

#[utoipa::path(
    summary = "Describe this node",
    responses(
        (status = 200, description = "Identity, neighbours and lifecycle state", body = NodeInfo)
    ),
    tags = ["membership"],
    operation_id = "nodeInfo"
)]
#[get("/node-info")]
async fn node_info(app_state: Data<AppState>) -> Json<NodeInfo> {
    Json(app_state.node.node_info().await)
}

#[utoipa::path(
    summary = "List neighbours",
    description = "Distinct addresses of the successor, predecessor and finger targets, excluding this node",
    responses(
        (status = 200, description = "Neighbour addresses", body = Vec<String>)
    ),
    tags = ["membership"],
    operation_id = "network"
)]
#[get("/network")]
async fn network(app_state: Data<AppState>) -> Json<Vec<String>> {
    Json(app_state.node.neighbours().await)
}

#[utoipa::path(
    summary = "Join a ring",
    params(JoinQuery),
    responses(
        (status = 200, description = "Joined; records this node now owns have been moved in"),
        (status = 400, description = "Malformed bootstrap address"),
        (status = 409, description = "Already a ring member"),
        (status = 502, description = "Bootstrap or successor unreachable"),
        (status = 500, description = "Ring identity already taken")
    ),
    tags = ["membership"],
    operation_id = "join"
)]
#[post("/join")]
async fn join(
    query: Query<JoinQuery>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, ChordError> {
    app_state.node.join(&query.nprime).await?;
    Ok(HttpResponse::Ok().finish())
}

#[utoipa::path(
    summary = "Leave the ring",
    description = "Hands every record to the successor and tells both neighbours. A standalone node has nothing to do.",
    responses(
        (status = 200, description = "Left"),
        (status = 502, description = "Left, but the records could not be handed off and stay here")
    ),
    tags = ["membership"],
    operation_id = "leave"
)]
#[post("/leave")]
async fn leave(app_state: Data<AppState>) -> Result<HttpResponse, ChordError> {
    app_state.node.leave().await?;
    Ok(HttpResponse::Ok().finish())
}
