use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_token_service::config::Config;
use app_token_service::handlers::{self, CallerToken};
use app_token_service::services::TokenIssuer;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting app-token-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        app_id = %config.github_app.app_id,
        installation_id = %config.github_app.installation_id,
        secret_source = config.secret_source.kind(),
        timeout = ?config.outbound_timeout,
        "Configuration loaded"
    );

    let issuer = TokenIssuer::from_config(&config)
        .await
        .context("Failed to initialize token issuer")?;

    let issuer = web::Data::new(issuer);
    let caller_token = web::Data::new(CallerToken::new(config.caller_token.clone()));

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(issuer.clone())
            .app_data(caller_token.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
