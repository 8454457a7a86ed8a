//! Session commands exposed to the UI layer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_core::BootstrapOutcome;
use storefront_domain::constants::PROFILE_PATH;
use storefront_domain::{Result, SessionStatus, TokenDiagnostics};
use storefront_infra::VaultAuthStatus;
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// Snapshot of the session for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthStatusView {
    pub status: SessionStatus,
    pub is_authenticated: bool,
    pub time_until_expiry_secs: u64,
    /// Authorization endpoint the backend's login redirect lands on.
    pub identity_provider: String,
    /// Present only in debug mode.
    pub diagnostics: Option<TokenDiagnostics>,
}

impl AuthStatusView {
    fn capture(ctx: &AppContext) -> Self {
        let session = ctx.session();
        Self {
            status: session.status(),
            is_authenticated: session.check_auth_status(),
            time_until_expiry_secs: session.time_until_expiry(),
            identity_provider: ctx.config.identity.authorization_endpoint(),
            diagnostics: session.diagnostics(),
        }
    }
}

/// Run the start-up bootstrap.
///
/// # Errors
/// Returns the callback error when the login failed.
pub async fn initialize_session(ctx: &AppContext) -> Result<(BootstrapOutcome, AuthStatusView)> {
    execute_logged("auth::initialize_session", || async {
        let outcome = ctx.session().bootstrap().await?;
        Ok((outcome, AuthStatusView::capture(ctx)))
    })
    .await
}

/// Start the login redirect.
///
/// # Errors
/// Returns a configuration error if the login URL cannot be built.
pub async fn login(ctx: &AppContext, return_to: Option<&str>) -> Result<()> {
    execute_logged("auth::login", || async {
        info!(
            identity_provider = %ctx.config.identity.authorization_endpoint(),
            "starting login redirect"
        );
        ctx.session().login(return_to)
    })
    .await
}

pub async fn logout(ctx: &AppContext) -> AuthStatusView {
    ctx.session().logout().await;
    AuthStatusView::capture(ctx)
}

pub fn get_auth_status(ctx: &AppContext) -> AuthStatusView {
    AuthStatusView::capture(ctx)
}

pub async fn get_vault_status(ctx: &AppContext) -> VaultAuthStatus {
    ctx.vault.check_status(ctx.session().store()).await
}

/// Fetch the signed-in user's profile for the dashboard.
///
/// # Errors
/// Returns [`storefront_domain::SessionError::SessionExpired`] when the
/// session could not be renewed, or the HTTP error of the profile call.
pub async fn get_profile(ctx: &AppContext) -> Result<Value> {
    execute_logged("auth::get_profile", || async {
        ctx.session().gateway().get_json(PROFILE_PATH).await
    })
    .await
}
