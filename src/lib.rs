pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod http;
pub mod log;

pub use crate::api::ErpApi;
pub use crate::commands::App;
pub use crate::config::{Settings, load_configuration};
pub use crate::http::{ErrorBody, HttpError, Page, Query};
