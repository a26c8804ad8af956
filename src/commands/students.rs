//! Students command handlers.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::api::types::ResourceId;
use crate::cli::StudentsCommands;

use super::{App, confirm, print_json, print_page_footer, report_api_error, require_non_blank};

pub async fn run(app: &App, command: StudentsCommands) -> Result<()> {
    match command {
        StudentsCommands::List { list } => {
            let query = app.query_from(&list);
            let page = app
                .cached_page("students", &query, || app.api.students.students(&query))
                .await?;
            for s in &page.results {
                println!(
                    "{:<38} {:<12} {:<30} {}",
                    s.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    s.roll_number.as_deref().unwrap_or("-"),
                    full_name(s.first_name.as_deref(), s.last_name.as_deref()),
                    s.status.as_deref().unwrap_or("-"),
                );
            }
            print_page_footer(&page);
        },
        StudentsCommands::Get { id } => {
            let student = app.api.students.student(&ResourceId::from(id.as_str())).await?;
            print_json(&serde_json::to_value(student)?)?;
        },
        StudentsCommands::Create {
            roll_number,
            first_name,
            last_name,
            email,
            department,
        } => {
            require_non_blank("roll_number", &roll_number)?;
            require_non_blank("first_name", &first_name)?;
            require_non_blank("email", &email)?;
            let body = json!({
                "roll_number": roll_number,
                "first_name": first_name,
                "last_name": last_name,
                "email": email,
                "department": department,
            });
            match app.api.students.create_student(&body).await {
                Ok(created) => {
                    app.cache.invalidate_resource("students").await;
                    println!("Created student {}", created["id"]);
                },
                Err(err) => report_api_error(&err),
            }
        },
        StudentsCommands::Delete { id, yes } => {
            if confirm(&format!("Delete student {id}?"), yes)? {
                app.api.students.delete_student(&ResourceId::from(id.as_str())).await?;
                app.cache.invalidate_resource("students").await;
                println!("Deleted student {id}");
            }
        },
        StudentsCommands::Batches { list } => {
            let batches = app.api.students.student_batches(app.query_from(&list)).await?;
            if batches.is_empty() {
                println!("No student batches found on any known endpoint.");
            }
            for batch in &batches {
                println!(
                    "{:<8} {:<24} {:<10} sem {:<3} {:>4} student(s){}",
                    batch.id,
                    batch.batch_name.as_deref().unwrap_or("-"),
                    batch.academic_year.as_deref().unwrap_or("-"),
                    batch.semester.as_deref().unwrap_or("-"),
                    batch.students_count,
                    match batch.source {
                        Some(crate::api::types::BatchSource::Division) => " [from divisions]",
                        _ => "",
                    },
                );
            }
        },
        StudentsCommands::Stats => {
            let stats = app.api.students.student_stats().await?;
            print_json(&stats)?;
        },
        StudentsCommands::Documents { student } => {
            let page = app
                .api
                .students
                .student_documents(&ResourceId::from(student.as_str()))
                .await?;
            for doc in &page.results {
                println!(
                    "{:<8} {:<16} {:<40} {}",
                    doc.id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    doc.document_type.as_deref().unwrap_or("-"),
                    doc.file_name.as_deref().unwrap_or("-"),
                    if doc.verified.unwrap_or(false) { "verified" } else { "unverified" },
                );
            }
            print_page_footer(&page);
        },
        StudentsCommands::BulkImport { file } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("Could not read {file}"))?;
            let records: Value = serde_json::from_str(&raw).context("Import file must be JSON")?;
            let count = records.as_array().map(Vec::len).unwrap_or(0);
            if count == 0 {
                anyhow::bail!("import file contains no records");
            }
            match app.api.students.bulk_create_students(&records).await {
                Ok(result) => {
                    app.cache.invalidate_resource("students").await;
                    println!("Imported {count} record(s)");
                    print_json(&result)?;
                },
                Err(err) => report_api_error(&err),
            }
        },
    }
    Ok(())
}

fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    match (first, last) {
        (Some(f), Some(l)) => format!("{f} {l}"),
        (Some(f), None) => f.to_string(),
        (None, Some(l)) => l.to_string(),
        (None, None) => "-".to_string(),
    }
}
