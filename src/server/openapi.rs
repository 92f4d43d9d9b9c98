use crate::ring::state::Lifecycle;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "chord-node", description = "A Chord ring member with a distributed key-value store."),
    tags(
        (name = "health", description = "Liveness and process control."),
        (name = "storage", description = "Key-value access, routed to the owning node."),
        (name = "membership", description = "Joining, leaving and inspecting the ring."),
        (name = "fault", description = "Crash simulation."),
        (name = "ring", description = "Node-to-node protocol endpoints."),
    ),
    components(schemas(Lifecycle)),
)]
pub struct ApiDoc;
