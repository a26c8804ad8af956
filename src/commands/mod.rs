//! CLI command handlers: thin consumers of the typed service clients.
//!
//! Handlers follow one shape: build a query from the list flags, read
//! through the query cache, render; mutations validate their input
//! client-side, call the service, then invalidate the resource's cached
//! queries so the next list refetches.

pub mod academics;
pub mod exams;
pub mod students;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde_json::Value;

use crate::api::ErpApi;
use crate::auth::TokenSource;
use crate::cache::{CacheKey, QueryCache};
use crate::cli::ListArgs;
use crate::config::Settings;
use crate::http::{HttpError, Page, Query};

/// Shared context for all command handlers.
pub struct App {
    pub api: ErpApi,
    pub cache: QueryCache,
    pub page_size: u32,
}

impl App {
    pub fn new(settings: &Settings, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let api = ErpApi::from_settings(settings, tokens)
            .context("Could not construct API clients from configuration")?;
        Ok(Self {
            api,
            cache: QueryCache::new(settings.cache_ttl()),
            page_size: settings.page_size,
        })
    }

    /// Maps the shared list flags onto DRF query parameters.
    pub fn query_from(&self, args: &ListArgs) -> Query {
        let mut query = Query::new()
            .set_opt("search", args.search.as_deref())
            .set_opt("ordering", args.ordering.as_deref())
            .set("page", args.page)
            .set("page_size", args.page_size.unwrap_or(self.page_size));
        for (field, value) in &args.filter {
            query = query.set(field, value.as_str());
        }
        query
    }

    /// Reads a list through the cache, refetching when stale or invalidated.
    pub async fn cached_list<F, Fut>(
        &self,
        resource: &str,
        query: &Query,
        fetch: F,
    ) -> Result<Value, HttpError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Value, HttpError>>,
    {
        let key = CacheKey::new(resource, query.encode());
        self.cache.get_or_fetch(key, fetch).await
    }

    /// Typed variant of [`App::cached_list`] for pages rendered as tables.
    pub async fn cached_page<T, F, Fut>(
        &self,
        resource: &str,
        query: &Query,
        fetch: F,
    ) -> Result<Page<T>, HttpError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Page<T>, HttpError>>,
    {
        let value = self
            .cached_list(resource, query, || async {
                Ok(serde_json::to_value(fetch().await?)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Parses `YYYY-MM-DD`, failing with the field name on bad input.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("{field} must be a YYYY-MM-DD date, got '{raw}'"))
}

/// Client-side range check shared by session and calendar forms.
pub fn ensure_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        bail!("end date {end} is before start date {start}");
    }
    Ok(())
}

pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} is required");
    }
    Ok(())
}

/// Interactive deletion guard; `--yes` skips it.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Renders a paged result's footer line.
pub fn print_page_footer<T>(page: &Page<T>) {
    println!(
        "{} of {} record(s){}",
        page.results.len(),
        page.count,
        if page.next.is_some() { ", more pages available" } else { "" }
    );
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Renders a mutation failure, expanding per-field validation errors.
pub fn report_api_error(err: &HttpError) {
    if let HttpError::Api { status, body } = err {
        if let Some(fields) = body.field_errors() {
            eprintln!("Request rejected ({status}):");
            for (field, messages) in fields {
                eprintln!("  {}: {}", field, messages.join(", "));
            }
            return;
        }
    }
    eprintln!("Error: {err}");
}
