//! Typed client for the academics service (`/v1/academics/api`): courses,
//! syllabi, sections, enrollments, timetables, and the academic calendar.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::http::{HttpClient, HttpError, Page, Query};

use super::exams::Resource;
use super::types::{CalendarEvent, Course, Enrollment, ResourceId, Syllabus, Timetable};

pub struct AcademicsClient {
    client: Arc<HttpClient>,
    pub courses: Resource,
    pub syllabi: Resource,
    pub syllabus_topics: Resource,
    pub course_sections: Resource,
    pub enrollments: Resource,
    pub batch_enrollments: Resource,
    pub course_prerequisites: Resource,
    pub timetables: Resource,
    pub academic_calendar: Resource,
}

impl AcademicsClient {
    pub fn new(client: Arc<HttpClient>) -> Self {
        let res = |root| Resource::new(client.clone(), root);
        Self {
            courses: res("courses"),
            syllabi: res("syllabi"),
            syllabus_topics: res("syllabus-topics"),
            course_sections: res("course-sections"),
            enrollments: res("enrollments"),
            batch_enrollments: res("batch-enrollments"),
            course_prerequisites: res("course-prerequisites"),
            timetables: res("timetables"),
            academic_calendar: res("academic-calendar"),
            client,
        }
    }

    // Typed list helpers for the resources the CLI renders as tables.

    pub async fn list_courses(&self, params: &Query) -> Result<Page<Course>, HttpError> {
        self.courses.list(params).await
    }

    pub async fn list_syllabi(&self, params: &Query) -> Result<Page<Syllabus>, HttpError> {
        self.syllabi.list(params).await
    }

    pub async fn list_enrollments(&self, params: &Query) -> Result<Page<Enrollment>, HttpError> {
        self.enrollments.list(params).await
    }

    pub async fn list_timetables(&self, params: &Query) -> Result<Page<Timetable>, HttpError> {
        self.timetables.list(params).await
    }

    pub async fn list_calendar(&self, params: &Query) -> Result<Page<CalendarEvent>, HttpError> {
        self.academic_calendar.list(params).await
    }

    // Course verbs.

    pub async fn courses_by_faculty(&self, faculty_id: &ResourceId) -> Result<Value, HttpError> {
        let params = Query::new().set("faculty_id", faculty_id.to_string());
        self.courses.collection_get("by_faculty", &params).await
    }

    pub async fn course_statistics(&self) -> Result<Value, HttpError> {
        self.courses.collection_get("statistics", &Query::new()).await
    }

    // Syllabus workflow.

    pub async fn approve_syllabus(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.syllabi.action(id, "approve", None).await
    }

    pub async fn syllabi_by_academic_year(&self, year: &str) -> Result<Value, HttpError> {
        let params = Query::new().set("academic_year", year);
        self.syllabi.collection_get("by_academic_year", &params).await
    }

    // Enrollment verbs.

    pub async fn enrollments_by_student(&self, student_id: &ResourceId) -> Result<Value, HttpError> {
        let params = Query::new().set("student_id", student_id.to_string());
        self.enrollments.collection_get("by_student", &params).await
    }

    pub async fn enrollment_statistics(&self) -> Result<Value, HttpError> {
        self.enrollments.collection_get("statistics", &Query::new()).await
    }

    // Batch enrollment workflow.

    pub async fn enroll_students_to_batch(
        &self,
        id: &ResourceId,
        student_ids: &[ResourceId],
    ) -> Result<Value, HttpError> {
        self.batch_enrollments
            .action(id, "enroll_students", Some(&json!({"student_ids": student_ids})))
            .await
    }

    pub async fn activate_batch_enrollment(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.batch_enrollments.action(id, "activate", None).await
    }

    pub async fn deactivate_batch_enrollment(&self, id: &ResourceId) -> Result<Value, HttpError> {
        self.batch_enrollments.action(id, "deactivate", None).await
    }

    // Prerequisites.

    pub async fn check_prerequisites(
        &self,
        student_id: &ResourceId,
        batch_id: &ResourceId,
        course_id: &ResourceId,
    ) -> Result<Value, HttpError> {
        let params = Query::new()
            .set("student_id", student_id.to_string())
            .set("batch_id", batch_id.to_string())
            .set("course_id", course_id.to_string());
        self.course_prerequisites.collection_get("check_prerequisites", &params).await
    }

    // Timetable queries.

    pub async fn weekly_schedule(
        &self,
        faculty_id: &ResourceId,
        course_id: &ResourceId,
    ) -> Result<Value, HttpError> {
        let params = Query::new()
            .set("faculty_id", faculty_id.to_string())
            .set("course_id", course_id.to_string());
        self.timetables.collection_get("weekly_schedule", &params).await
    }

    pub async fn timetable_conflicts(
        &self,
        faculty_id: &ResourceId,
        room: &str,
    ) -> Result<Value, HttpError> {
        let params = Query::new()
            .set("faculty_id", faculty_id.to_string())
            .set("room", room);
        self.timetables.collection_get("conflicts", &params).await
    }

    // Calendar queries.

    pub async fn upcoming_events(&self) -> Result<Value, HttpError> {
        self.academic_calendar.collection_get("upcoming_events", &Query::new()).await
    }

    pub async fn events_by_month(&self, year: u32, month: u32) -> Result<Value, HttpError> {
        let params = Query::new().set("year", year).set("month", month);
        self.academic_calendar.collection_get("by_month", &params).await
    }

    pub async fn academic_days(&self, start_date: &str, end_date: &str) -> Result<Value, HttpError> {
        let params = Query::new()
            .set("start_date", start_date)
            .set("end_date", end_date);
        self.academic_calendar.collection_get("academic_days", &params).await
    }

    pub fn http(&self) -> &HttpClient {
        &self.client
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

    async fn client_for(server: &MockServer) -> AcademicsClient {
        let http =
            HttpClient::new(Url::parse(&server.uri()).unwrap(), Arc::new(NoToken)).unwrap();
        AcademicsClient::new(Arc::new(http))
    }

    #[tokio::test]
    async fn course_create_posts_exact_body() {
        let server = MockServer::start().await;
        let body = json!({
            "code": "CS101",
            "title": "Intro",
            "credits": 3,
            "department": "550e8400-e29b-41d4-a716-446655440000",
            "status": "ACTIVE"
        });
        Mock::given(method("POST"))
            .and(path("/courses/"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let academics = client_for(&server).await;
        academics.courses.create(&body).await.unwrap();
    }

    #[tokio::test]
    async fn course_list_parses_typed_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses/"))
            .and(query_param("search", "intro"))
            .and(query_param("ordering", "-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": 1, "code": "CS101", "title": "Intro", "credits": 3, "status": "ACTIVE"}
                ],
                "count": 1
            })))
            .mount(&server)
            .await;

        let academics = client_for(&server).await;
        let params = Query::new().set("search", "intro").set("ordering", "-code");
        let page = academics.list_courses(&params).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].code.as_deref(), Some("CS101"));
        assert_eq!(page.results[0].credits, Some(3));
    }

    #[tokio::test]
    async fn syllabus_approval_hits_action_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/syllabi/4/approve/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "APPROVED"})))
            .expect(1)
            .mount(&server)
            .await;

        let academics = client_for(&server).await;
        academics.approve_syllabus(&ResourceId::from(4)).await.unwrap();
    }

    #[tokio::test]
    async fn batch_enrollment_sends_student_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/batch-enrollments/2/enroll_students/"))
            .and(body_json(json!({"student_ids": [10, 11]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"enrolled": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let academics = client_for(&server).await;
        academics
            .enroll_students_to_batch(
                &ResourceId::from(2),
                &[ResourceId::from(10), ResourceId::from(11)],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn absent_calendar_endpoint_reads_as_empty() {
        let server = MockServer::start().await;
        // No mock mounted: the route 404s.
        let academics = client_for(&server).await;
        let page = academics.list_calendar(&Query::new()).await.unwrap();
        assert!(page.is_empty());
    }
}
