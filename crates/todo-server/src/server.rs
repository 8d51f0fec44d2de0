use actix_web::{web, App, HttpServer};
use std::io;

use crate::config::ServerConfig;
use crate::handlers::{self, lists, todos};
use crate::middleware::{SessionMiddleware, TracingMiddleware};
use crate::state::AppState;

/// Registers every route. Session and tracing middleware are applied by the
/// caller, see [`run_server`].
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(lists::root))
        .route("/health", web::get().to(handlers::health::handler))
        .service(
            web::scope("/lists")
                .route("", web::get().to(lists::index))
                .route("", web::post().to(lists::create))
                .route("/new", web::get().to(lists::new_form))
                .route("/{list_id}", web::get().to(lists::show))
                .route("/{list_id}", web::post().to(lists::rename))
                .route("/{list_id}/edit", web::get().to(lists::edit_form))
                .route("/{list_id}/delete", web::post().to(lists::delete))
                .route(
                    "/{list_id}/complete_all",
                    web::post().to(lists::complete_all),
                )
                .route("/{list_id}/todos", web::post().to(todos::create))
                .route(
                    "/{list_id}/todos/{todo_id}",
                    web::post().to(todos::update_status),
                )
                .route(
                    "/{list_id}/todos/{todo_id}/delete",
                    web::post().to(todos::delete),
                ),
        );
}

pub async fn run_server(config: ServerConfig) -> io::Result<()> {
    let state = web::Data::new(AppState::new(&config));
    let address = config.bind_address();

    log::info!("Starting todo server on http://{}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionMiddleware::from_state(&state))
            .wrap(TracingMiddleware)
            .configure(app_config)
    })
    .bind(address)?
    .run()
    .await
}
