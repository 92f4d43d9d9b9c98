use crate::{error::ChordError, server::AppState};
use actix_web::{
    HttpResponse, get, put,
    web::{Bytes, Data, Path},
};
use utoipa_actix_web::service_config::ServiceConfig;

pub fn configure_routes(config: &mut ServiceConfig) {
    config.service(put_value).service(get_value);
}

#[utoipa::path(
    summary = "Store a value",
    description = "Routes the value to the node owning the key and stores it there, replacing any previous value",
    params(("key" = String, Path, description = "Record key")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored on the owning node"),
        (status = 502, description = "A peer on the route failed"),
        (status = 503, description = "The owner could not be resolved or reached")
    ),
    tags = ["storage"],
    operation_id = "putValue"
)]
#[put("/storage/{key}")]
async fn put_value(
    key: Path<String>,
    body: Bytes,
    app_state: Data<AppState>,
) -> Result<HttpResponse, ChordError> {
    app_state.node.put(&key, body).await?;
    Ok(HttpResponse::Ok().finish())
}

#[utoipa::path(
    summary = "Fetch a value",
    description = "Routes the lookup to the node owning the key",
    params(("key" = String, Path, description = "Record key")),
    responses(
        (status = 200, description = "Stored value", body = String, content_type = "text/plain"),
        (status = 404, description = "The owner has no value under this key"),
        (status = 502, description = "A peer on the route failed"),
        (status = 503, description = "The owner could not be resolved or reached")
    ),
    tags = ["storage"],
    operation_id = "getValue"
)]
#[get("/storage/{key}")]
async fn get_value(
    key: Path<String>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, ChordError> {
    let value = app_state.node.get(&key).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(value))
}
