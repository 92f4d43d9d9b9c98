use crate::{
    error::ChordError,
    ring::{
        identity::RingPosition,
        internode::messages::{ClaimResponse, Departure, LookupStep, Record},
        peer::Peer,
    },
    server::AppState,
};
use actix_web::{
    HttpResponse, get, post, put,
    web::{Bytes, Data, Json, Path},
};
use log::trace;
use utoipa_actix_web::{scope, service_config::ServiceConfig};

pub fn configure_routes(config: &mut ServiceConfig) {
    config.service(
        scope::scope("/ring")
            .service(lookup_step)
            .service(predecessor)
            .service(notify)
            .service(offer_successor)
            .service(claim)
            .service(release)
            .service(handoff)
            .service(departure)
            .service(store_record)
            .service(fetch_record),
    );
}

#[utoipa::path(
    summary = "One step of a successor lookup",
    params(("id" = u64, Path, description = "Ring identity to resolve")),
    responses(
        (status = 200, description = "Either the successor or the next node to ask", body = LookupStep)
    ),
    tags = ["ring"]
)]
#[get("/step/{id}")]
async fn lookup_step(id: Path<RingPosition>, app_state: Data<AppState>) -> Json<LookupStep> {
    let step = app_state.node.lookup_step(id.into_inner()).await;
    trace!("lookup step answered {step:?}");
    Json(step)
}

#[utoipa::path(
    responses(
        (status = 200, description = "Current predecessor, or null if unknown", body = Peer)
    ),
    tags = ["ring"]
)]
#[get("/predecessor")]
async fn predecessor(app_state: Data<AppState>) -> Json<Option<Peer>> {
    Json(app_state.node.predecessor().await)
}

#[utoipa::path(
    request_body = Peer,
    responses(
        (status = 200, description = "Candidate considered as predecessor")
    ),
    tags = ["ring"]
)]
#[post("/notify")]
async fn notify(body: Json<Peer>, app_state: Data<AppState>) -> HttpResponse {
    app_state.node.notify(body.into_inner()).await;
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    request_body = Peer,
    responses(
        (status = 200, description = "Candidate considered as successor")
    ),
    tags = ["ring"]
)]
#[post("/successor")]
async fn offer_successor(body: Json<Peer>, app_state: Data<AppState>) -> HttpResponse {
    app_state.node.offer_successor(body.into_inner()).await;
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    summary = "Claim ownership as the new predecessor",
    request_body = Peer,
    responses(
        (status = 200, description = "Previous predecessor and the records the claimant now owns", body = ClaimResponse)
    ),
    tags = ["ring"]
)]
#[post("/claim")]
async fn claim(body: Json<Peer>, app_state: Data<AppState>) -> Json<ClaimResponse> {
    Json(app_state.node.claim(body.into_inner()).await)
}

#[utoipa::path(
    summary = "Drop records a new predecessor has taken over",
    description = "Records whose value changed since they were claimed are kept",
    request_body = Vec<Record>,
    responses(
        (status = 200, description = "Claimed records dropped")
    ),
    tags = ["ring"]
)]
#[post("/release")]
async fn release(body: Json<Vec<Record>>, app_state: Data<AppState>) -> HttpResponse {
    let released = app_state.node.release(&body);
    trace!("released {released} of {} claimed records", body.len());
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    summary = "Receive the records of a departing predecessor",
    request_body = Vec<Record>,
    responses(
        (status = 200, description = "Records stored")
    ),
    tags = ["ring"]
)]
#[post("/handoff")]
async fn handoff(body: Json<Vec<Record>>, app_state: Data<AppState>) -> HttpResponse {
    app_state.node.accept_handoff(body.into_inner());
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    request_body = Departure,
    responses(
        (status = 200, description = "Departing neighbour spliced out")
    ),
    tags = ["ring"]
)]
#[post("/departure")]
async fn departure(body: Json<Departure>, app_state: Data<AppState>) -> HttpResponse {
    app_state.node.apply_departure(&body).await;
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    summary = "Store a record locally, without routing",
    params(("key" = String, Path, description = "Record key")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored")
    ),
    tags = ["ring"]
)]
#[put("/records/{key}")]
async fn store_record(key: Path<String>, body: Bytes, app_state: Data<AppState>) -> HttpResponse {
    app_state.node.store().put(&key, body);
    HttpResponse::Ok().finish()
}

#[utoipa::path(
    summary = "Fetch a local record, without routing",
    params(("key" = String, Path, description = "Record key")),
    responses(
        (status = 200, description = "Stored value", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No record under this key")
    ),
    tags = ["ring"]
)]
#[get("/records/{key}")]
async fn fetch_record(
    key: Path<String>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, ChordError> {
    let value = app_state
        .node
        .store()
        .get(&key)
        .ok_or_else(|| ChordError::NotFound(key.into_inner()))?;

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(value))
}
