use crate::types::HealthRes;

/// Health check shared by every Dropshare HTTP surface.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Returns a healthy status. The process answering at all is the signal.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Dropshare is alive".into(),
        }
    }

    /// Instance form of [`HealthService::check_health`], for handlers holding a service.
    pub fn check(&self) -> HealthRes {
        Self::check_health()
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "Dropshare is alive");
    }

    #[test]
    fn test_default_service_matches_static_check() {
        assert_eq!(HealthService::default().check(), HealthService::check_health());
    }
}
