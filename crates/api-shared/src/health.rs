use crate::dto::HealthRes;

/// Simple health service shared by API surfaces.
///
/// Provides a standardised way to report liveness of the suprident service.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "suprident is alive".into(),
        }
    }
}
