//! Health check command for UI monitoring

use crate::context::AppContext;
use crate::utils::health::HealthStatus;

/// Get application health status
///
/// # Example Response
/// ```json
/// {
///   "is_healthy": true,
///   "score": 1.0,
///   "message": null,
///   "components": [
///     { "name": "backend", "is_healthy": true, "message": null },
///     { "name": "session", "is_healthy": true, "message": null },
///     { "name": "scheduler", "is_healthy": true, "message": null }
///   ],
///   "checked_at": "2026-10-18T09:30:00Z"
/// }
/// ```
pub async fn get_app_health(ctx: &AppContext) -> HealthStatus {
    ctx.health_check().await
}
