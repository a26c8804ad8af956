//! Typed clients for the three ERP backend services.
//!
//! Each service lives under its own namespace of the shared API base URL:
//! academics under `/v1/academics/api`, exams under `/v1/exams/api`, and
//! students under `/v1/students`. [`ErpApi`] wires one [`HttpClient`] per
//! namespace, all sharing the same token source and timeout.

mod academics;
mod exams;
mod students;
pub mod types;

use std::sync::Arc;

use url::Url;

pub use academics::AcademicsClient;
pub use exams::{ExamsClient, Resource};
pub use students::StudentsClient;

use crate::auth::TokenSource;
use crate::config::Settings;
use crate::http::{HttpClient, HttpError};

pub const ACADEMICS_NAMESPACE: &str = "/v1/academics/api";
pub const EXAMS_NAMESPACE: &str = "/v1/exams/api";
pub const STUDENTS_NAMESPACE: &str = "/v1/students";

/// Facade bundling the three service clients.
pub struct ErpApi {
    pub academics: AcademicsClient,
    pub exams: ExamsClient,
    pub students: StudentsClient,
}

impl ErpApi {
    pub fn from_settings(
        settings: &Settings,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, HttpError> {
        let base = settings.api_base_url.trim_end_matches('/');
        let service = |namespace: &str| -> Result<Arc<HttpClient>, HttpError> {
            let url = Url::parse(&format!("{}{}", base, namespace))?;
            Ok(Arc::new(HttpClient::with_config(url, tokens.clone(), settings.timeout())?))
        };

        let academics_http = service(ACADEMICS_NAMESPACE)?;
        let students_http = service(STUDENTS_NAMESPACE)?;
        let exams_http = service(EXAMS_NAMESPACE)?;

        Ok(Self {
            academics: AcademicsClient::new(academics_http.clone()),
            exams: ExamsClient::new(exams_http),
            students: StudentsClient::new(students_http, academics_http),
        })
    }
}
