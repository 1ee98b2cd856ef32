//! ScholarLink JSON API Server

use std::{fmt::Display, process};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use scholarlink_app::context::AppContext;

use crate::{config::ServerConfig, observability::Observability, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod accounts;
mod auth;
mod config;
mod courses;
mod errors;
mod extensions;
mod healthcheck;
mod invites;
mod logs;
mod observability;
mod payments;
mod router;
mod scheduler;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

fn startup_failure(stage: &str, source: impl Display) -> ! {
    #[expect(
        clippy::print_stderr,
        reason = "logging may not be initialized yet, must use eprintln for startup errors"
    )]
    {
        eprintln!("{stage}: {source}");
    }

    #[expect(clippy::exit, reason = "startup failures end the process")]
    process::exit(1);
}

/// ScholarLink JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| startup_failure("Configuration error", e));

    let observability = Observability::init(&config)
        .unwrap_or_else(|e| startup_failure("Observability error", e));

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let app = match AppContext::from_database_url(
        &config.database.database_url,
        config.database.run_migrations,
        config.app_settings(),
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");
            observability.shutdown();

            startup_failure("Startup error", init_error);
        }
    };

    let sweeper = config.scheduler.expiry_sweep_enabled.then(|| {
        scheduler::spawn(app.subscriptions.clone(), config.scheduler.expiry_sweep_at)
    });

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(State::from_app_context(
            app,
            config.session.session_cookie_secure,
        )))
        .push(router::public_router())
        .push(router::app_router());

    let doc = OpenApi::new("ScholarLink API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(auth::SESSION_COOKIE))),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    info!("server stopped");

    observability.shutdown();
}
