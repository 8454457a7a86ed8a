//! Storefront session client
//!
//! Opens the application at an address (optionally carrying a login
//! callback fragment), establishes the session and loads the dashboard
//! profile through the authenticated gateway.
//!
//! ```text
//! storefront [--location <url>]
//! ```

use anyhow::Context;
use storefront_lib::utils::logging::init_tracing;
use storefront_lib::{get_app_health, get_profile, initialize_session, login, AppContext};
use tracing::{info, warn};

fn location_arg(mut args: impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--location=") {
            return Some(value.to_string());
        }
        if arg == "--location" {
            return args.next();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging first so .env loading is visible
    init_tracing();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => info!(error = %e, "no .env file loaded"),
    }

    let config = storefront_infra::config::load().context("loading configuration")?;
    let ctx = match location_arg(std::env::args().skip(1)) {
        Some(href) => AppContext::new_with_location(config, href),
        None => AppContext::new_with_config(config),
    }
    .context("building application context")?;

    match initialize_session(&ctx).await {
        Ok((outcome, view)) => info!(?outcome, status = %view.status, "session initialised"),
        Err(err) => warn!(error = %err, "login callback reported a failure"),
    }

    if ctx.session().check_auth_status() {
        match get_profile(&ctx).await {
            Ok(profile) => info!(
                fields = profile.as_object().map_or(0, serde_json::Map::len),
                "dashboard profile loaded"
            ),
            Err(err) => warn!(error = %err, "dashboard profile unavailable"),
        }
    } else {
        login(&ctx, None).await.context("starting login")?;
    }

    let health = get_app_health(&ctx).await;
    info!(healthy = health.is_healthy, score = health.score, "application health");

    ctx.shutdown().await;
    Ok(())
}
