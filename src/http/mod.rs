//! HTTP layer for the ERP backend services.
//!
//! Each ERP service (academics, exams, students) is reached through an
//! [`HttpClient`] bound to that service's base URL. The layer owns the
//! request conventions shared by every domain client: JSON headers, bearer
//! token injection, DRF query-string construction, pagination-envelope
//! coercion, and structured error normalization.

mod error;
mod http_client;
mod query;
mod types;

pub use error::{ErrorBody, HttpError};
pub use http_client::HttpClient;
pub use query::{Query, QueryValue};
pub use types::Page;
