//! Typed client for the students service (`/v1/students`), including the
//! endpoint-probing resolver for student batches.
//!
//! The batch resource has moved between paths and namespaces across backend
//! deployments. Until a fixed contract lands, [`StudentsClient::student_batches`]
//! sweeps the known candidates in order and short-circuits on the first one
//! that yields records; only absence (404) is tolerated, any other failure
//! propagates immediately.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::Method;
use serde_json::{Value, json};

use crate::http::{HttpClient, HttpError, Page, Query};

use super::types::{BatchSource, CustomField, Document, EnrollmentHistoryEntry, ResourceId, Student, StudentBatch};

/// Alternate path spellings for the batch resource on the students service,
/// tried after the exact path and the divisions remap.
const STUDENT_BASE_CANDIDATES: [&str; 4] = [
    "/students/batches/",
    "/batches/",
    "/student_batches/",
    "/students/student-batches/",
];

/// Candidate batch paths on the academics service, tried last.
const ACADEMICS_BASE_CANDIDATES: [&str; 3] =
    ["/student-batches/", "/batches/", "/students/batches/"];

pub struct StudentsClient {
    client: Arc<HttpClient>,
    /// Academics-service client used as the final fallback namespace when
    /// probing for batches.
    academics: Arc<HttpClient>,
}

impl StudentsClient {
    pub fn new(client: Arc<HttpClient>, academics: Arc<HttpClient>) -> Self {
        Self { client, academics }
    }

    // Student records.

    pub async fn students(&self, params: &Query) -> Result<Page<Student>, HttpError> {
        self.client.list("/students/", params).await
    }

    pub async fn student(&self, id: &ResourceId) -> Result<Student, HttpError> {
        self.client.retrieve(&format!("/students/{}/", id), &Query::new()).await
    }

    pub async fn create_student(&self, data: &Value) -> Result<Value, HttpError> {
        self.client.post("/students/", Some(data)).await
    }

    pub async fn update_student(&self, id: &ResourceId, data: &Value) -> Result<Value, HttpError> {
        self.client.put(&format!("/students/{}/", id), data).await
    }

    pub async fn patch_student(&self, id: &ResourceId, data: &Value) -> Result<Value, HttpError> {
        self.client.patch(&format!("/students/{}/", id), data).await
    }

    pub async fn delete_student(&self, id: &ResourceId) -> Result<(), HttpError> {
        self.client.delete(&format!("/students/{}/", id)).await?;
        Ok(())
    }

    pub async fn search_students(&self, term: &str, filters: &Query) -> Result<Value, HttpError> {
        let params = Query::new().set("q", term).merge(filters.clone());
        self.client.get("/students/search/", &params).await
    }

    pub async fn student_stats(&self) -> Result<Value, HttpError> {
        self.client.get("/students/stats/", &Query::new()).await
    }

    // Per-student sub-resources.

    pub async fn student_documents(&self, id: &ResourceId) -> Result<Page<Document>, HttpError> {
        self.client.list(&format!("/students/{}/documents/", id), &Query::new()).await
    }

    pub async fn student_enrollment_history(
        &self,
        id: &ResourceId,
    ) -> Result<Page<EnrollmentHistoryEntry>, HttpError> {
        self.client
            .list(&format!("/students/{}/enrollment-history/", id), &Query::new())
            .await
    }

    pub async fn student_custom_fields(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.client.get(&format!("/students/{}/custom-fields/", id), &Query::new()).await
    }

    // Bulk import/update.

    pub async fn bulk_create_students(&self, students: &Value) -> Result<Value, HttpError> {
        self.client.post("/students/bulk-create/", Some(students)).await
    }

    pub async fn bulk_update_students(&self, students: &Value) -> Result<Value, HttpError> {
        self.client.post("/students/bulk-update/", Some(students)).await
    }

    /// Bulk delete sends the id list in a DELETE body, matching the
    /// backend's route contract.
    pub async fn bulk_delete_students(&self, student_ids: &[ResourceId]) -> Result<Value, HttpError> {
        self.client
            .send_request(
                Method::DELETE,
                "/students/bulk-delete/",
                &Query::new(),
                Some(&json!({"student_ids": student_ids})),
                &[],
            )
            .await
    }

    // Custom fields, documents, enrollment history, imports.

    pub async fn custom_fields(&self, params: &Query) -> Result<Page<CustomField>, HttpError> {
        self.client.list("/custom-fields/", params).await
    }

    pub async fn create_custom_field(&self, data: &Value) -> Result<Value, HttpError> {
        self.client.post("/custom-fields/", Some(data)).await
    }

    pub async fn documents(&self, params: &Query) -> Result<Page<Document>, HttpError> {
        self.client.list("/documents/", params).await
    }

    pub async fn enrollment_history(
        &self,
        params: &Query,
    ) -> Result<Page<EnrollmentHistoryEntry>, HttpError> {
        self.client.list("/enrollment-history/", params).await
    }

    pub async fn imports(&self, params: &Query) -> Result<Page<Value>, HttpError> {
        self.client.list("/imports/", params).await
    }

    pub async fn create_import(&self, data: &Value) -> Result<Value, HttpError> {
        self.client.post("/imports/", Some(data)).await
    }

    pub async fn import_stats(&self) -> Result<Value, HttpError> {
        self.client.get("/imports/stats/", &Query::new()).await
    }

    // Batch resolution.

    /// Resolves student batches despite the resource living under an
    /// unstable path. Candidates are tried in order, short-circuiting on the
    /// first non-empty result:
    ///
    /// 1. the exact `/student-batches/` path on the students service;
    /// 2. `/students/divisions/`, remapping division records into the
    ///    canonical batch shape;
    /// 3. alternate path spellings on the students service;
    /// 4. the same sweep against the academics service;
    /// 5. give up with an empty list and a warning.
    ///
    /// A 404 at any step moves to the next candidate; any other error is a
    /// real failure and propagates.
    pub async fn student_batches(&self, params: Query) -> Result<Vec<StudentBatch>, HttpError> {
        let query = Query::new()
            .set("is_active", true)
            .set("page_size", 100i64)
            .merge(params);

        if let Some(records) = self.probe(&self.client, "/student-batches/", &query).await? {
            let batches = parse_batches(records);
            if !batches.is_empty() {
                return Ok(batches);
            }
        }

        if let Some(records) = self.probe(&self.client, "/students/divisions/", &query).await? {
            let batches: Vec<StudentBatch> =
                records.iter().filter_map(StudentBatch::from_division).collect();
            if !batches.is_empty() {
                return Ok(batches);
            }
        }

        for path in STUDENT_BASE_CANDIDATES {
            if let Some(records) = self.probe(&self.client, path, &query).await? {
                let batches = parse_batches(records);
                if !batches.is_empty() {
                    return Ok(batches);
                }
            }
        }

        for path in ACADEMICS_BASE_CANDIDATES {
            if let Some(records) = self.probe(&self.academics, path, &query).await? {
                let batches = parse_batches(records);
                if !batches.is_empty() {
                    return Ok(batches);
                }
            }
        }

        warn!("Student batches endpoint not found on students or academics service, returning empty list");
        Ok(Vec::new())
    }

    /// One probing step: GET the candidate and coerce the payload into raw
    /// records. `None` means the candidate 404ed and the sweep continues.
    async fn probe(
        &self,
        client: &HttpClient,
        path: &str,
        query: &Query,
    ) -> Result<Option<Vec<Value>>, HttpError> {
        match client.get(path, query).await {
            Ok(value) => Ok(Some(coerce_records(value))),
            Err(err) if err.is_not_found() => {
                debug!(path = path; "Batch candidate absent, trying next");
                Ok(None)
            },
            Err(err) => Err(err),
        }
    }
}

/// Extracts the record array from any of the known list payload shapes:
/// `{results}`, `{items}`, or a bare array. Unrecognized shapes yield no
/// records, which reads as "empty" to the probing sweep.
fn coerce_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
        },
        _ => Vec::new(),
    }
}

fn parse_batches(records: Vec<Value>) -> Vec<StudentBatch> {
    records
        .into_iter()
        .filter_map(|record| serde_json::from_value::<StudentBatch>(record).ok())
        .map(|mut batch| {
            batch.source.get_or_insert(BatchSource::Batches);
            batch
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoToken;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http_for(server: &MockServer) -> Arc<HttpClient> {
        Arc::new(HttpClient::new(Url::parse(&server.uri()).unwrap(), Arc::new(NoToken)).unwrap())
    }

    async fn students_client(
        students: &MockServer,
        academics: &MockServer,
    ) -> StudentsClient {
        StudentsClient::new(http_for(students), http_for(academics))
    }

    #[tokio::test]
    async fn exact_path_short_circuits_the_sweep() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/student-batches/"))
            .and(query_param("is_active", "true"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": 1, "batch_name": "CS-2025"}]
            })))
            .expect(1)
            .mount(&students)
            .await;
        // No other mocks: any further candidate request would 404 the mock
        // server and fail the expect(..) accounting below.

        let client = students_client(&students, &academics).await;
        let batches = client.student_batches(Query::new()).await.unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_name.as_deref(), Some("CS-2025"));
        assert_eq!(batches[0].source, Some(BatchSource::Batches));

        let issued = students.received_requests().await.unwrap();
        assert_eq!(issued.len(), 1, "later candidates must not be probed");
        assert!(academics.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn divisions_are_remapped_when_exact_path_is_empty() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/student-batches/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&students)
            .await;
        Mock::given(method("GET"))
            .and(path("/students/divisions/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "division_name": "ME-A", "academic_year_display": "2025-26"}
            ])))
            .mount(&students)
            .await;

        let client = students_client(&students, &academics).await;
        let batches = client.student_batches(Query::new()).await.unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_name.as_deref(), Some("ME-A"));
        assert_eq!(batches[0].source, Some(BatchSource::Division));
    }

    #[tokio::test]
    async fn sweep_falls_through_to_academics_namespace() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        // Everything on the students service 404s (mock server default).
        Mock::given(method("GET"))
            .and(path("/student-batches/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": 9, "batch_name": "CIV-2024"}]
            })))
            .mount(&academics)
            .await;

        let client = students_client(&students, &academics).await;
        let batches = client.student_batches(Query::new()).await.unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_name.as_deref(), Some("CIV-2024"));
        // Students-base candidates were all tried first.
        let issued = students.received_requests().await.unwrap();
        assert_eq!(issued.len(), 2 + STUDENT_BASE_CANDIDATES.len());
    }

    #[tokio::test]
    async fn exhausted_sweep_resolves_empty_without_error() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        let client = students_client(&students, &academics).await;
        let batches = client.student_batches(Query::new()).await.unwrap();
        assert!(batches.is_empty());
    }

    #[tokio::test]
    async fn non_404_errors_fail_fast() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/student-batches/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
            .mount(&students)
            .await;

        let client = students_client(&students, &academics).await;
        let err = client.student_batches(Query::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        // The sweep stopped at the failing candidate.
        assert_eq!(students.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn items_shaped_payloads_are_coerced() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/student-batches/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": 2, "batch_name": "EC-2026"}]
            })))
            .mount(&students)
            .await;

        let client = students_client(&students, &academics).await;
        let batches = client.student_batches(Query::new()).await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_name.as_deref(), Some("EC-2026"));
    }

    #[tokio::test]
    async fn caller_params_override_probe_defaults() {
        let students = MockServer::start().await;
        let academics = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/student-batches/"))
            .and(query_param("page_size", "10"))
            .and(query_param("is_active", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": 5}]
            })))
            .expect(1)
            .mount(&students)
            .await;

        let client = students_client(&students, &academics).await;
        client
            .student_batches(Query::new().set("page_size", 10i64))
            .await
            .unwrap();
    }
}
