use std::time::Duration;

use async_trait::async_trait;

use super::geo::Coordinate;
use crate::error::{AttendanceError, AttendanceResult};

pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Host-supplied device position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> AttendanceResult<Coordinate>;
}

/// Position reported by the client alongside its request.
pub struct ReportedLocation(pub Option<Coordinate>);

#[async_trait]
impl LocationProvider for ReportedLocation {
    async fn current_position(&self) -> AttendanceResult<Coordinate> {
        self.0.ok_or_else(|| {
            AttendanceError::LocationUnavailable("device location was not provided".into())
        })
    }
}

/// Resolves the provider's position, failing once `limit` has elapsed.
pub async fn acquire(
    provider: &dyn LocationProvider,
    limit: Duration,
) -> AttendanceResult<Coordinate> {
    match tokio::time::timeout(limit, provider.current_position()).await {
        Ok(position) => position,
        Err(_) => Err(AttendanceError::LocationUnavailable(format!(
            "location lookup timed out after {}s",
            limit.as_secs()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverAnswers;

    #[async_trait]
    impl LocationProvider for NeverAnswers {
        async fn current_position(&self) -> AttendanceResult<Coordinate> {
            std::future::pending().await
        }
    }

    #[actix_web::test]
    async fn reported_location_passes_through() {
        let here = Coordinate::new(1.0, 2.0).unwrap();
        let got = acquire(&ReportedLocation(Some(here)), DEFAULT_LOCATION_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(got, here);
    }

    #[actix_web::test]
    async fn missing_location_is_unavailable() {
        let err = acquire(&ReportedLocation(None), DEFAULT_LOCATION_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::LocationUnavailable(_)));
    }

    #[actix_web::test]
    async fn slow_provider_times_out() {
        let err = acquire(&NeverAnswers, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::LocationUnavailable(_)));
    }
}
