mod fault;
mod health;
mod internal;
mod membership;
pub mod openapi;
mod storage;


use crate::{node::ChordNode, server::openapi::ApiDoc};
use actix_cors::Cors;
use actix_web::{
    App, Error, HttpServer,
    body::{BoxBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::{Next, from_fn},
    web::{Data, JsonConfig, PayloadConfig},
};
use log::{debug, info};
use std::{net::TcpListener, sync::Arc};
use utoipa::OpenApi;
use utoipa_actix_web::AppExt;
use utoipa_swagger_ui::SwaggerUi;

/// Upper bound for stored values and migration batches.
const MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;

pub type AppState = Arc<AppStateInner>;

#[derive(Debug)]
pub struct AppStateInner {
    pub node: Arc<ChordNode>,
}

/// Holds every request of a crashed node until it recovers, then serves it
/// like a process that was frozen with its queue intact.
///
/// `/sim-recover` is the only way back, so it always passes.
async fn crash_gate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let node = req
        .app_data::<Data<AppState>>()
        .map(|state| state.node.clone());

    if let Some(node) = node
        && node.fault().is_crashed()
        && req.path() != "/sim-recover"
    {
        debug!("holding {} {} while crashed", req.method(), req.path());
        node.fault().wait_recovered().await;
        debug!("releasing {} {}", req.method(), req.path());
    }

    next.call(req).await.map(ServiceResponse::map_into_boxed_body)
}

pub async fn start_server(state: AppState, listener: TcpListener) -> std::io::Result<()> {
    let node = state.node.clone();
    let data = Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT"])
            .allowed_headers(vec!["Content-Type"])
            .max_age(60 * 60 * 12);

        App::new()
            .wrap(from_fn(crash_gate))
            .wrap(cors)
            .app_data(JsonConfig::default().limit(MAX_PAYLOAD_BYTES))
            .app_data(PayloadConfig::default().limit(MAX_PAYLOAD_BYTES))
            .into_utoipa_app()
            .openapi(ApiDoc::openapi())
            .configure(health::configure_routes)
            .configure(storage::configure_routes)
            .configure(membership::configure_routes)
            .configure(fault::configure_routes)
            .configure(internal::configure_routes)
            .app_data(data.clone())
            .openapi_service(|api| {
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api/openapi.json", api)
            })
            .into_app()
    })
    .listen(listener)?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        node.shutdown_requested().await;
        info!("shutdown requested, stopping server");
        handle.stop(true).await;
    });

    server.await
}

/// Starts a node on a random local port, with maintenance running.
#[cfg(test)]
pub async fn start_server_test(finger_count: u32) -> (u16, Arc<ChordNode>) {
    use crate::{config::NodeConfig, node::maintenance};
    use std::time::Duration;

    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("failed to get local addr")
        .port();

    let mut config = NodeConfig::new(format!("127.0.0.1:{port}"), finger_count);
    config.stabilize_interval = Duration::from_millis(50);
    config.fix_fingers_interval = Duration::from_millis(100);
    config.request_timeout = Duration::from_secs(2);

    let node = Arc::new(ChordNode::new(config).expect("invalid test config"));
    let state = AppStateInner { node: node.clone() };

    tokio::spawn(async {
        start_server(Arc::new(state), listener).await.unwrap();
    });

    // the maintenance tasks outlive the test body; the runtime drops them
    let _stop = maintenance::start(node.clone());

    (port, node)
}
