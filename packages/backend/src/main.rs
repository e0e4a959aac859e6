use polypath_backend::config::Config;
use polypath_backend::logging::{self, LogSettings};
use polypath_backend::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    // Tracing goes first: config loading warns about unusable values.
    let _log_guard = logging::init_tracing(&LogSettings::from_env());
    let config = Config::from_env();

    let addr = config.bind_addr();
    tracing::info!(
        model = %config.llm.model,
        endpoint = %config.llm.api_endpoint,
        default_count = config.words.default_count,
        max_count = config.words.max_count,
        validation = config.words.policy.as_str(),
        "configuration loaded"
    );

    let app = polypath_backend::create_app_with_state(AppState::from_config(config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "polypath-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
