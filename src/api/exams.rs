//! Typed client for the exams service (`/v1/exams/api`).
//!
//! Every exam resource follows the same DRF router conventions, so a single
//! [`Resource`] value generates the five CRUD calls per root path and the
//! domain verbs are thin wrappers over its `action` helper.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::http::{HttpClient, HttpError, Page, Query};

use super::types::ResourceId;

/// Uniform CRUD client for one REST resource root.
///
/// Paths follow the canonical pattern: `/<root>/` for the collection and
/// `/<root>/<id>/` for one record; domain verbs POST to
/// `/<root>/<id>/<action>/`.
#[derive(Clone)]
pub struct Resource {
    client: Arc<HttpClient>,
    root: &'static str,
}

impl Resource {
    pub fn new(client: Arc<HttpClient>, root: &'static str) -> Self {
        Self { client, root }
    }

    pub fn root(&self) -> &'static str {
        self.root
    }

    fn collection_path(&self) -> String {
        format!("/{}/", self.root)
    }

    fn record_path(&self, id: &ResourceId) -> String {
        format!("/{}/{}/", self.root, id)
    }

    pub async fn list<T: DeserializeOwned>(&self, params: &Query) -> Result<Page<T>, HttpError> {
        self.client.list(&self.collection_path(), params).await
    }

    pub async fn retrieve<T: DeserializeOwned>(&self, id: &ResourceId) -> Result<T, HttpError> {
        self.client.retrieve(&self.record_path(id), &Query::new()).await
    }

    pub async fn create(&self, data: &Value) -> Result<Value, HttpError> {
        self.client.post(&self.collection_path(), Some(data)).await
    }

    pub async fn update(&self, id: &ResourceId, data: &Value) -> Result<Value, HttpError> {
        self.client.put(&self.record_path(id), data).await
    }

    pub async fn patch(&self, id: &ResourceId, data: &Value) -> Result<Value, HttpError> {
        self.client.patch(&self.record_path(id), data).await
    }

    pub async fn remove(&self, id: &ResourceId) -> Result<(), HttpError> {
        self.client.delete(&self.record_path(id)).await?;
        Ok(())
    }

    /// POSTs a domain verb to `/<root>/<id>/<action>/`.
    pub async fn action(
        &self,
        id: &ResourceId,
        action: &str,
        body: Option<&Value>,
    ) -> Result<Value, HttpError> {
        let path = format!("/{}/{}/{}/", self.root, id, action);
        self.client.post(&path, body).await
    }

    /// GETs a non-CRUD sub-path of one record, e.g. `/<root>/<id>/<sub>/`.
    pub async fn record_get(
        &self,
        id: &ResourceId,
        sub: &str,
        params: &Query,
    ) -> Result<Value, HttpError> {
        let path = format!("/{}/{}/{}/", self.root, id, sub);
        self.client.get(&path, params).await
    }

    /// GETs a collection-level sub-path, e.g. `/<root>/<sub>/`.
    pub async fn collection_get(&self, sub: &str, params: &Query) -> Result<Value, HttpError> {
        let path = format!("/{}/{}/", self.root, sub);
        self.client.get(&path, params).await
    }
}

/// Client for the exams administration service.
pub struct ExamsClient {
    client: Arc<HttpClient>,
    pub exam_sessions: Resource,
    pub exam_schedules: Resource,
    pub exam_rooms: Resource,
    pub room_allocations: Resource,
    pub staff_assignments: Resource,
    pub student_dues: Resource,
    pub exam_registrations: Resource,
    pub hall_tickets: Resource,
    pub exam_attendance: Resource,
    pub exam_violations: Resource,
    pub exam_results: Resource,
}

impl ExamsClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        let res = |root| Resource::new(client.clone(), root);
        Self {
            exam_sessions: res("exam-sessions"),
            exam_schedules: res("exam-schedules"),
            exam_rooms: res("exam-rooms"),
            room_allocations: res("room-allocations"),
            staff_assignments: res("staff-assignments"),
            student_dues: res("student-dues"),
            exam_registrations: res("exam-registrations"),
            hall_tickets: res("hall-tickets"),
            exam_attendance: res("exam-attendance"),
            exam_violations: res("exam-violations"),
            exam_results: res("exam-results"),
            client,
        }
    }

    // Dashboard and reports.

    pub async fn dashboard_stats(&self) -> Result<Value, HttpError> {
        self.client.get("/dashboard/stats/", &Query::new()).await
    }

    pub async fn exam_summary_report(&self, params: &Query) -> Result<Value, HttpError> {
        self.client.get("/reports/exam-summary/", params).await
    }

    pub async fn student_performance_report(&self, params: &Query) -> Result<Value, HttpError> {
        self.client.get("/reports/student-performance/", params).await
    }

    // Bulk operations.

    pub async fn bulk_generate_hall_tickets(
        &self,
        exam_schedule_id: &ResourceId,
    ) -> Result<Value, HttpError> {
        self.client
            .post(
                "/bulk-operations/generate-hall-tickets/",
                Some(&json!({"exam_schedule_id": exam_schedule_id})),
            )
            .await
    }

    pub async fn bulk_assign_rooms(
        &self,
        exam_schedule_id: &ResourceId,
        room_assignments: &Value,
    ) -> Result<Value, HttpError> {
        self.client
            .post(
                "/bulk-operations/assign-rooms/",
                Some(&json!({
                    "exam_schedule_id": exam_schedule_id,
                    "room_assignments": room_assignments
                })),
            )
            .await
    }

    pub async fn bulk_assign_staff(
        &self,
        exam_schedule_id: &ResourceId,
        staff_assignments: &Value,
    ) -> Result<Value, HttpError> {
        self.client
            .post(
                "/bulk-operations/assign-staff/",
                Some(&json!({
                    "exam_schedule_id": exam_schedule_id,
                    "staff_assignments": staff_assignments
                })),
            )
            .await
    }

    // Session and schedule verbs.

    pub async fn session_statistics(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.exam_sessions.record_get(id, "statistics", &Query::new()).await
    }

    pub async fn active_sessions(&self) -> Result<Value, HttpError> {
        self.exam_sessions.collection_get("active_sessions", &Query::new()).await
    }

    pub async fn start_exam(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.exam_schedules.action(id, "start_exam", None).await
    }

    pub async fn end_exam(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.exam_schedules.action(id, "end_exam", None).await
    }

    pub async fn schedule_registrations(
        &self,
        id: &ResourceId,
        params: &Query,
    ) -> Result<Value, HttpError> {
        self.exam_schedules.record_get(id, "registrations", params).await
    }

    // Registration approval workflow.

    pub async fn approve_registration(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.exam_registrations.action(id, "approve_registration", None).await
    }

    pub async fn reject_registration(
        &self,
        id: &ResourceId,
        rejection_reason: &str,
    ) -> Result<Value, HttpError> {
        self.exam_registrations
            .action(id, "reject_registration", Some(&json!({"rejection_reason": rejection_reason})))
            .await
    }

    pub async fn pending_approvals(&self, params: &Query) -> Result<Value, HttpError> {
        self.exam_registrations.collection_get("pending_approvals", params).await
    }

    // Hall tickets.

    pub async fn issue_ticket(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.hall_tickets.action(id, "issue_ticket", None).await
    }

    pub async fn print_ticket(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.hall_tickets.action(id, "print_ticket", None).await
    }

    /// Downloads a hall ticket PDF as raw bytes; the response body is not
    /// JSON and must not be parsed as such.
    pub async fn download_hall_ticket_pdf(&self, id: &ResourceId) -> Result<Vec<u8>, HttpError> {
        self.client.get_bytes(&format!("/hall-tickets/{}/download_pdf/", id)).await
    }

    // Attendance, violations, results, dues, staffing.

    pub async fn mark_attendance(&self, id: &ResourceId, payload: &Value) -> Result<Value, HttpError> {
        self.exam_attendance.action(id, "mark_attendance", Some(payload)).await
    }

    pub async fn check_out(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.exam_attendance.action(id, "check_out", None).await
    }

    pub async fn resolve_violation(
        &self,
        id: &ResourceId,
        payload: &Value,
    ) -> Result<Value, HttpError> {
        self.exam_violations.action(id, "resolve_violation", Some(payload)).await
    }

    pub async fn publish_result(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.exam_results.action(id, "publish_result", None).await
    }

    pub async fn student_results(
        &self,
        student_id: &ResourceId,
        exam_session_id: Option<&ResourceId>,
    ) -> Result<Value, HttpError> {
        let params = Query::new()
            .set("student_id", student_id.to_string())
            .set_opt("exam_session_id", exam_session_id.map(|id| id.to_string()));
        self.exam_results.collection_get("student_results", &params).await
    }

    pub async fn update_payment(
        &self,
        id: &ResourceId,
        payment_amount: f64,
    ) -> Result<Value, HttpError> {
        self.student_dues
            .action(id, "update_payment", Some(&json!({"payment_amount": payment_amount})))
            .await
    }

    pub async fn toggle_availability(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.staff_assignments.action(id, "toggle_availability", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoToken;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ExamsClient {
        let http =
            HttpClient::new(Url::parse(&server.uri()).unwrap(), Arc::new(NoToken)).unwrap();
        ExamsClient::new(Arc::new(http))
    }

    #[tokio::test]
    async fn resource_factory_issues_canonical_paths_and_verbs() {
        let server = MockServer::start().await;
        let ok = || ResponseTemplate::new(200).set_body_json(json!({"id": 5}));
        let paged =
            ResponseTemplate::new(200).set_body_json(json!({"results": [], "count": 0}));

        Mock::given(method("GET")).and(path("/exam-rooms/")).respond_with(paged).expect(1).mount(&server).await;
        Mock::given(method("GET")).and(path("/exam-rooms/5/")).respond_with(ok()).expect(1).mount(&server).await;
        Mock::given(method("POST"))
            .and(path("/exam-rooms/"))
            .and(body_json(json!({"room_number": "A-101"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 6})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/exam-rooms/5/"))
            .and(body_json(json!({"capacity": 60})))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/exam-rooms/5/"))
            .and(body_json(json!({"is_active": false})))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE")).and(path("/exam-rooms/5/")).respond_with(ResponseTemplate::new(204)).expect(1).mount(&server).await;

        let exams = client_for(&server).await;
        let rooms = &exams.exam_rooms;
        let id = ResourceId::from(5);

        let page: Page<Value> = rooms.list(&Query::new()).await.unwrap();
        assert!(page.is_empty());
        rooms.retrieve::<Value>(&id).await.unwrap();
        rooms.create(&json!({"room_number": "A-101"})).await.unwrap();
        rooms.update(&id, &json!({"capacity": 60})).await.unwrap();
        rooms.patch(&id, &json!({"is_active": false})).await.unwrap();
        rooms.remove(&id).await.unwrap();
    }

    #[tokio::test]
    async fn actions_post_to_record_action_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/exam-registrations/7/approve_registration/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "APPROVED"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/exam-registrations/8/reject_registration/"))
            .and(body_json(json!({"rejection_reason": "dues pending"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "REJECTED"})))
            .expect(1)
            .mount(&server)
            .await;

        let exams = client_for(&server).await;
        exams.approve_registration(&ResourceId::from(7)).await.unwrap();
        exams
            .reject_registration(&ResourceId::from(8), "dues pending")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pdf_download_returns_raw_bytes() {
        let server = MockServer::start().await;
        let pdf = b"%PDF-1.7 fake".to_vec();
        Mock::given(method("GET"))
            .and(path("/hall-tickets/3/download_pdf/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(pdf.clone(), "application/pdf"),
            )
            .mount(&server)
            .await;

        let exams = client_for(&server).await;
        let bytes = exams.download_hall_ticket_pdf(&ResourceId::from(3)).await.unwrap();
        assert_eq!(bytes, pdf);
    }

    #[tokio::test]
    async fn student_results_builds_filter_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exam-results/student_results/"))
            .and(query_param("student_id", "11"))
            .and(query_param("exam_session_id", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let exams = client_for(&server).await;
        exams
            .student_results(&ResourceId::from(11), Some(&ResourceId::from(2)))
            .await
            .unwrap();
    }
}
