//! Command execution helpers
//!
//! Times a command and logs its outcome in one place.

use std::future::Future;
use std::time::Instant;

use storefront_domain::Result as DomainResult;

use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command with timing and structured logging.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn get_profile(ctx: &AppContext) -> Result<Value> {
///     execute_logged("auth::get_profile", || async {
///         ctx.session().gateway().get_json(PROFILE_PATH).await
///     })
///     .await
/// }
/// ```
pub async fn execute_logged<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;

    let label = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), label.as_deref().map_or(Ok(()), Err));

    result
}
