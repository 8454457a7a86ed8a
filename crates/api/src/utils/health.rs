//! Health reporting for [`crate::AppContext`] components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum share of healthy components for the application to be healthy.
pub const HEALTHY_SCORE_THRESHOLD: f64 = 0.8;

/// Overall health status of the application
///
/// # Example
/// ```
/// use storefront_lib::utils::health::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::new()
///     .add_component(ComponentHealth::healthy("backend"))
///     .add_component(ComponentHealth::unhealthy("session", "signed out"))
///     .scored();
///
/// assert!((status.score - 0.5).abs() < f64::EPSILON);
/// assert!(!status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,

    /// Healthy components divided by total components.
    pub score: f64,

    pub message: Option<String>,

    pub components: Vec<ComponentHealth>,

    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    /// Healthy, score 1.0, no components.
    pub fn new() -> Self {
        Self {
            is_healthy: true,
            score: 1.0,
            message: None,
            components: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Recompute `score` and `is_healthy` from the components.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy = self.components.iter().filter(|c| c.is_healthy).count();
        #[allow(clippy::cast_precision_loss)]
        let score = healthy as f64 / self.components.len() as f64;
        self.score = score;
        self.is_healthy = score >= HEALTHY_SCORE_THRESHOLD;
        if !self.is_healthy {
            let failing: Vec<_> = self
                .components
                .iter()
                .filter(|c| !c.is_healthy)
                .map(|c| c.name.as_str())
                .collect();
            self.message = Some(format!("unhealthy: {}", failing.join(", ")));
        }
    }

    /// [`Self::calculate_score`] in builder form.
    #[must_use]
    pub fn scored(mut self) -> Self {
        self.calculate_score();
        self
    }

    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health of a single component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}
