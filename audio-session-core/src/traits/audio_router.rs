use crate::models::error::BackendError;
use crate::models::output_route::{RoutePlan, RouteState};

/// Platform audio-routing primitives (mode, speakerphone, bluetooth SCO).
pub trait AudioRouter: Send + Sync {
    /// Which output hardware is currently attached.
    fn hardware_state(&self) -> RouteState;

    /// Apply a route plan. Failures are logged by the caller and ignored.
    fn apply(&self, plan: &RoutePlan) -> Result<(), BackendError>;
}
