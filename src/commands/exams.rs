//! Exams command handlers.

use anyhow::{Context, Result};
use serde_json::json;

use crate::api::types::ResourceId;
use crate::cli::ExamsCommands;

use super::{App, ensure_date_range, parse_date, print_json, print_page_footer, report_api_error, require_non_blank};

pub async fn run(app: &App, command: ExamsCommands) -> Result<()> {
    match command {
        ExamsCommands::Dashboard => {
            let stats = app.api.exams.dashboard_stats().await?;
            print_json(&stats)?;
        },
        ExamsCommands::Sessions { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page::<crate::api::types::ExamSession, _, _>("exam-sessions", &query, || {
                    app.api.exams.exam_sessions.list(&query)
                })
                .await?;
            for s in &page.results {
                println!(
                    "{:<8} {:<30} {:<10} {:<12} {}",
                    s.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    s.name.as_deref().unwrap_or("-"),
                    s.academic_year.as_deref().unwrap_or("-"),
                    s.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    s.status.as_deref().unwrap_or("-"),
                );
            }
            print_page_footer(&page);
        },
        ExamsCommands::CreateSession {
            name,
            academic_year,
            start_date,
            end_date,
        } => {
            require_non_blank("name", &name)?;
            let start = parse_date("start_date", &start_date)?;
            let end = parse_date("end_date", &end_date)?;
            ensure_date_range(start, end)?;
            let body = json!({
                "name": name,
                "academic_year": academic_year,
                "start_date": start_date,
                "end_date": end_date,
            });
            match app.api.exams.exam_sessions.create(&body).await {
                Ok(created) => {
                    app.cache.invalidate_resource("exam-sessions").await;
                    println!("Created exam session {}", created["id"]);
                },
                Err(err) => report_api_error(&err),
            }
        },
        ExamsCommands::Schedules { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page::<crate::api::types::ExamSchedule, _, _>("exam-schedules", &query, || {
                    app.api.exams.exam_schedules.list(&query)
                })
                .await?;
            for s in &page.results {
                println!(
                    "{:<8} {:<30} {:<12} {:<8} {}",
                    s.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    s.course_title.as_deref().unwrap_or("-"),
                    s.exam_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    s.start_time.as_deref().unwrap_or("-"),
                    s.status.as_deref().unwrap_or("-"),
                );
            }
            print_page_footer(&page);
        },
        ExamsCommands::StartExam { id } => {
            app.api.exams.start_exam(&ResourceId::from(id.as_str())).await?;
            app.cache.invalidate_resource("exam-schedules").await;
            println!("Exam {id} started");
        },
        ExamsCommands::EndExam { id } => {
            app.api.exams.end_exam(&ResourceId::from(id.as_str())).await?;
            app.cache.invalidate_resource("exam-schedules").await;
            println!("Exam {id} ended");
        },
        ExamsCommands::Rooms { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page::<crate::api::types::ExamRoom, _, _>("exam-rooms", &query, || {
                    app.api.exams.exam_rooms.list(&query)
                })
                .await?;
            for room in &page.results {
                println!(
                    "{:<8} {:<10} {:<20} {:>4}/{:<4} {}",
                    room.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    room.room_number.as_deref().unwrap_or("-"),
                    room.building.as_deref().unwrap_or("-"),
                    room.current_allocation.unwrap_or(0),
                    room.capacity.unwrap_or(0),
                    if room.is_active.unwrap_or(true) { "" } else { "inactive" },
                );
            }
            print_page_footer(&page);
        },
        ExamsCommands::CreateRoom {
            room_number,
            building,
            capacity,
        } => {
            require_non_blank("room_number", &room_number)?;
            if capacity == 0 {
                anyhow::bail!("capacity must be at least 1");
            }
            let body = json!({
                "room_number": room_number,
                "building": building,
                "capacity": capacity,
            });
            match app.api.exams.exam_rooms.create(&body).await {
                Ok(_) => {
                    app.cache.invalidate_resource("exam-rooms").await;
                    println!("Created room {room_number}");
                },
                Err(err) => report_api_error(&err),
            }
        },
        ExamsCommands::PendingRegistrations { list } => {
            let query = app.query_from(&list);
            let pending = app.api.exams.pending_approvals(&query).await?;
            print_json(&pending)?;
        },
        ExamsCommands::Approve { id } => {
            app.api.exams.approve_registration(&ResourceId::from(id.as_str())).await?;
            app.cache.invalidate_resource("exam-registrations").await;
            println!("Approved registration {id}");
        },
        ExamsCommands::Reject { id, reason } => {
            require_non_blank("reason", &reason)?;
            app.api
                .exams
                .reject_registration(&ResourceId::from(id.as_str()), &reason)
                .await?;
            app.cache.invalidate_resource("exam-registrations").await;
            println!("Rejected registration {id}");
        },
        ExamsCommands::IssueTicket { id } => {
            app.api.exams.issue_ticket(&ResourceId::from(id.as_str())).await?;
            app.cache.invalidate_resource("hall-tickets").await;
            println!("Issued hall ticket {id}");
        },
        ExamsCommands::DownloadTicket { id, out } => {
            let bytes = app
                .api
                .exams
                .download_hall_ticket_pdf(&ResourceId::from(id.as_str()))
                .await?;
            std::fs::write(&out, &bytes).with_context(|| format!("Could not write {out}"))?;
            println!("Saved {} bytes to {out}", bytes.len());
        },
        ExamsCommands::PublishResult { id } => {
            app.api.exams.publish_result(&ResourceId::from(id.as_str())).await?;
            app.cache.invalidate_resource("exam-results").await;
            println!("Published result {id}");
        },
        ExamsCommands::UpdatePayment { id, amount } => {
            if amount <= 0.0 {
                anyhow::bail!("amount must be positive");
            }
            app.api
                .exams
                .update_payment(&ResourceId::from(id.as_str()), amount)
                .await?;
            app.cache.invalidate_resource("student-dues").await;
            println!("Recorded payment of {amount} against due {id}");
        },
    }
    Ok(())
}
