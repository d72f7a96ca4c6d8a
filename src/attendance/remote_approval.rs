use std::sync::Arc;

use super::clock::Clock;
use super::geo::Coordinate;
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::remote_request::{Decision, NewRemoteRequest, RemoteClockInRequest};
use crate::store::RemoteRequestStore;

/// pending -> approved | rejected, each request disposed at most once.
#[derive(Clone)]
pub struct RemoteApprovalService {
    store: Arc<dyn RemoteRequestStore>,
    clock: Arc<dyn Clock>,
}

impl RemoteApprovalService {
    pub fn new(store: Arc<dyn RemoteRequestStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_request(
        &self,
        employee_id: u64,
        supervisor_id: u64,
        location: Coordinate,
        reason: Option<String>,
    ) -> AttendanceResult<RemoteClockInRequest> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let request = self
            .store
            .insert_remote_request(NewRemoteRequest {
                employee_id,
                supervisor_id,
                requested_at: self.clock.now(),
                location,
                reason,
            })
            .await?;

        tracing::info!(
            employee_id,
            supervisor_id,
            request_id = request.id,
            "Remote clock-in requested"
        );
        Ok(request)
    }

    /// Applies a supervisor's decision to a pending request.
    pub async fn respond(
        &self,
        request_id: u64,
        decision: Decision,
    ) -> AttendanceResult<RemoteClockInRequest> {
        let request = self
            .store
            .resolve_remote_request(request_id, decision.into(), self.clock.now())
            .await?
            .ok_or_else(|| {
                AttendanceError::not_found(format!(
                    "Remote request {request_id} not found or already processed"
                ))
            })?;

        tracing::info!(
            request_id,
            employee_id = request.employee_id,
            status = %request.status,
            "Remote clock-in request disposed"
        );
        Ok(request)
    }

    pub async fn get(&self, request_id: u64) -> AttendanceResult<Option<RemoteClockInRequest>> {
        self.store.find_remote_request(request_id).await
    }

    pub async fn get_pending(
        &self,
        employee_id: u64,
    ) -> AttendanceResult<Option<RemoteClockInRequest>> {
        self.store.find_pending_request(employee_id).await
    }

    pub async fn get_pending_for_supervisor(
        &self,
        supervisor_id: u64,
    ) -> AttendanceResult<Vec<RemoteClockInRequest>> {
        self.store.list_pending_for_supervisor(supervisor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::clock::FixedClock;
    use crate::model::remote_request::RemoteRequestStatus;
    use crate::store::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn service() -> (RemoteApprovalService, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        ));
        let store = Arc::new(InMemoryStore::new());
        (RemoteApprovalService::new(store, clock.clone()), clock)
    }

    fn somewhere() -> Coordinate {
        Coordinate::new(23.9, 90.5).unwrap()
    }

    #[actix_web::test]
    async fn new_request_is_pending() {
        let (svc, clock) = service();
        let req = svc
            .create_request(1000, 1001, somewhere(), Some("  client visit ".into()))
            .await
            .unwrap();

        assert_eq!(req.status, RemoteRequestStatus::Pending);
        assert_eq!(req.requested_at, clock.now());
        assert_eq!(req.reason.as_deref(), Some("client visit"));
        assert!(req.responded_at.is_none());
        assert_eq!(svc.get_pending(1000).await.unwrap(), Some(req));
    }

    #[actix_web::test]
    async fn blank_reason_is_dropped() {
        let (svc, _) = service();
        let req = svc
            .create_request(1000, 1001, somewhere(), Some("   ".into()))
            .await
            .unwrap();
        assert_eq!(req.reason, None);
    }

    #[actix_web::test]
    async fn approval_is_terminal() {
        let (svc, clock) = service();
        let req = svc.create_request(1000, 1001, somewhere(), None).await.unwrap();
        clock.advance(Duration::minutes(5));

        let approved = svc.respond(req.id, Decision::Approved).await.unwrap();
        assert_eq!(approved.status, RemoteRequestStatus::Approved);
        assert_eq!(approved.responded_at, Some(clock.now()));

        let err = svc.respond(req.id, Decision::Rejected).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NotFound(_)));
        let stored = svc.get(req.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RemoteRequestStatus::Approved);
        assert!(svc.get_pending(1000).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn rejection_is_terminal() {
        let (svc, _) = service();
        let req = svc.create_request(1000, 1001, somewhere(), None).await.unwrap();
        let rejected = svc.respond(req.id, Decision::Rejected).await.unwrap();
        assert_eq!(rejected.status, RemoteRequestStatus::Rejected);
        assert!(svc.respond(req.id, Decision::Approved).await.is_err());
    }

    #[actix_web::test]
    async fn unknown_request_is_not_found() {
        let (svc, _) = service();
        let err = svc.respond(42, Decision::Approved).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn supervisor_queue_is_newest_first() {
        let (svc, clock) = service();
        let first = svc.create_request(1000, 1001, somewhere(), None).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = svc.create_request(1002, 1001, somewhere(), None).await.unwrap();
        svc.create_request(1003, 2000, somewhere(), None).await.unwrap();

        let queue = svc.get_pending_for_supervisor(1001).await.unwrap();
        let ids: Vec<u64> = queue.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        svc.respond(second.id, Decision::Approved).await.unwrap();
        assert_eq!(svc.get_pending_for_supervisor(1001).await.unwrap().len(), 1);
    }
}
