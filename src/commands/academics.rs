//! Academics command handlers.

use anyhow::Result;
use serde_json::{Value, json};

use crate::api::types::{Course, ResourceId};
use crate::cli::{AcademicsCommands, ListArgs};
use crate::http::{Page, Query};

use super::{
    App, confirm, ensure_date_range, parse_date, print_json, print_page_footer,
    report_api_error, require_non_blank,
};

pub async fn run(app: &App, command: AcademicsCommands) -> Result<()> {
    match command {
        AcademicsCommands::Courses { list } => {
            let page = list_courses(app, &app.query_from(&list)).await?;
            render_courses(&page);
        },
        AcademicsCommands::Course { id } => {
            let course: Value = app.api.academics.courses.retrieve(&ResourceId::from(id.as_str())).await?;
            print_json(&course)?;
        },
        AcademicsCommands::CreateCourse {
            code,
            title,
            credits,
            department,
            status,
        } => {
            let body = course_payload(&code, &title, credits, &department, &status)?;
            match create_course(app, &body).await {
                Ok(created) => {
                    println!("Created course {}", created["id"]);
                },
                Err(err) => report_api_error(&err),
            }
        },
        AcademicsCommands::UpdateCourse { id, data } => {
            let body: Value = serde_json::from_str(&data)?;
            app.api.academics.courses.update(&ResourceId::from(id.as_str()), &body).await?;
            app.cache.invalidate_resource("courses").await;
            println!("Updated course {id}");
        },
        AcademicsCommands::DeleteCourse { id, yes } => {
            if confirm(&format!("Delete course {id}?"), yes)? {
                app.api.academics.courses.remove(&ResourceId::from(id.as_str())).await?;
                app.cache.invalidate_resource("courses").await;
                println!("Deleted course {id}");
            }
        },
        AcademicsCommands::Syllabi { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page("syllabi", &query, || app.api.academics.list_syllabi(&query))
                .await?;
            for s in &page.results {
                println!(
                    "{:<8} {:<30} {:<10} {}",
                    display(&s.id),
                    s.course_title.as_deref().unwrap_or("-"),
                    s.academic_year.as_deref().unwrap_or("-"),
                    s.status.as_deref().unwrap_or("-"),
                );
            }
            print_page_footer(&page);
        },
        AcademicsCommands::ApproveSyllabus { id } => {
            app.api.academics.approve_syllabus(&ResourceId::from(id.as_str())).await?;
            app.cache.invalidate_resource("syllabi").await;
            println!("Approved syllabus {id}");
        },
        AcademicsCommands::Enrollments { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page("enrollments", &query, || app.api.academics.list_enrollments(&query))
                .await?;
            for e in &page.results {
                println!(
                    "{:<8} {:<24} {:<30} {}",
                    display(&e.id),
                    e.student_name.as_deref().unwrap_or("-"),
                    e.course_title.as_deref().unwrap_or("-"),
                    e.status.as_deref().unwrap_or("-"),
                );
            }
            print_page_footer(&page);
        },
        AcademicsCommands::Timetables { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page("timetables", &query, || app.api.academics.list_timetables(&query))
                .await?;
            for t in &page.results {
                println!(
                    "{:<10} {:<30} {:<8}-{:<8} {}",
                    t.day_of_week.as_deref().unwrap_or("-"),
                    t.course_title.as_deref().unwrap_or("-"),
                    t.start_time.as_deref().unwrap_or("-"),
                    t.end_time.as_deref().unwrap_or("-"),
                    t.room.as_deref().unwrap_or("-"),
                );
            }
            print_page_footer(&page);
        },
        AcademicsCommands::Calendar { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page("academic-calendar", &query, || app.api.academics.list_calendar(&query))
                .await?;
            for event in &page.results {
                println!(
                    "{:<12} {:<12} {:<30} {}",
                    event.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    event.event_type.as_deref().unwrap_or("-"),
                    event.title.as_deref().unwrap_or("-"),
                    if event.is_holiday.unwrap_or(false) { "holiday" } else { "" },
                );
            }
            print_page_footer(&page);
        },
        AcademicsCommands::CreateEvent {
            title,
            event_type,
            start_date,
            end_date,
            holiday,
        } => {
            require_non_blank("title", &title)?;
            let start = parse_date("start_date", &start_date)?;
            let end = parse_date("end_date", &end_date)?;
            ensure_date_range(start, end)?;
            let body = json!({
                "title": title,
                "event_type": event_type,
                "start_date": start_date,
                "end_date": end_date,
                "is_holiday": holiday,
            });
            match app.api.academics.academic_calendar.create(&body).await {
                Ok(_) => {
                    app.cache.invalidate_resource("academic-calendar").await;
                    println!("Created calendar event '{title}'");
                },
                Err(err) => report_api_error(&err),
            }
        },
        AcademicsCommands::EnrollStudents { id, students } => {
            let ids: Vec<ResourceId> =
                students.iter().map(|s| ResourceId::from(s.as_str())).collect();
            let result = app
                .api
                .academics
                .enroll_students_to_batch(&ResourceId::from(id.as_str()), &ids)
                .await?;
            app.cache.invalidate_resource("batch-enrollments").await;
            print_json(&result)?;
        },
    }
    Ok(())
}

/// Builds and validates the course creation payload.
pub fn course_payload(
    code: &str,
    title: &str,
    credits: u32,
    department: &str,
    status: &str,
) -> Result<Value> {
    require_non_blank("code", code)?;
    require_non_blank("title", title)?;
    require_non_blank("department", department)?;
    if credits == 0 {
        anyhow::bail!("credits must be at least 1");
    }
    Ok(json!({
        "code": code,
        "title": title,
        "credits": credits,
        "department": department,
        "status": status,
    }))
}

/// Lists courses through the query cache.
pub async fn list_courses(app: &App, query: &Query) -> Result<Page<Course>> {
    let page = app
        .cached_page("courses", query, || app.api.academics.list_courses(query))
        .await?;
    Ok(page)
}

/// Creates a course and invalidates cached course lists on success.
pub async fn create_course(app: &App, body: &Value) -> Result<Value, crate::http::HttpError> {
    let created = app.api.academics.courses.create(body).await?;
    app.cache.invalidate_resource("courses").await;
    Ok(created)
}

fn render_courses(page: &Page<Course>) {
    for course in &page.results {
        println!(
            "{:<8} {:<10} {:<40} {:>3}cr  {}",
            course.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            course.code.as_deref().unwrap_or("-"),
            course.title.as_deref().unwrap_or("-"),
            course.credits.unwrap_or(0),
            course.status.as_deref().unwrap_or("-"),
        );
    }
    print_page_footer(page);
}

fn display(id: &Option<ResourceId>) -> String {
    id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_payload_rejects_blank_required_fields() {
        assert!(course_payload("", "Intro", 3, "d1", "ACTIVE").is_err());
        assert!(course_payload("CS101", "  ", 3, "d1", "ACTIVE").is_err());
        assert!(course_payload("CS101", "Intro", 0, "d1", "ACTIVE").is_err());
    }

    #[test]
    fn course_payload_carries_exact_fields() {
        let body = course_payload("CS101", "Intro", 3, "dept-uuid", "ACTIVE").unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "code": "CS101",
                "title": "Intro",
                "credits": 3,
                "department": "dept-uuid",
                "status": "ACTIVE"
            })
        );
    }

    #[test]
    fn date_range_validation() {
        let start = parse_date("start", "2026-01-10").unwrap();
        let end = parse_date("end", "2026-01-09").unwrap();
        assert!(ensure_date_range(start, end).is_err());
        assert!(ensure_date_range(start, start).is_ok());
    }
}
