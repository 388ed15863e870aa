//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{ServiceState, build_service_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use food_backend::Trace;
#[cfg(debug_assertions)]
use food_backend::doc::ApiDoc;
use food_backend::inbound::http::health::HealthState;
use food_backend::inbound::http::{
    configure_file_routes, configure_health_routes, configure_menu_routes,
    configure_restaurant_routes, configure_user_routes,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    service_state: ServiceState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .wrap(Trace)
        .configure(configure_health_routes);

    let app = match service_state {
        ServiceState::Users(state) => app.app_data(state).configure(configure_user_routes),
        ServiceState::Restaurants(state) => {
            app.app_data(state).configure(configure_restaurant_routes)
        }
        ServiceState::Menu(state) => app.app_data(state).configure(configure_menu_routes),
        ServiceState::Files(state) => app.app_data(state).configure(configure_file_routes),
    };

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server for the service named in `config`.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `config`: resolved [`ServerConfig`] carrying the pool, bind address and
///   collaborator endpoints.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when state construction, binding the socket
/// or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let service_state = build_service_state(&config)?;
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), service_state.clone())
    })
    .bind(config.bind_addr())?
    .run();

    info!(
        service = config.kind().label(),
        addr = %config.bind_addr(),
        "listening"
    );
    health_state.mark_ready();
    Ok(server)
}
