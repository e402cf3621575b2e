//! HTTP surface for depot
//!
//! Routes:
//! - `GET /`, `/index.htm`, `/index.html` - build index page
//! - `GET /api/health-check` - liveness
//! - `GET /api/listing` - ordered listing as JSON
//! - `POST /api/upload` - bearer-authenticated multipart upload
//! - `GET /latest/:platform` - redirect to the newest artifact
//! - `GET /status/:platform` - build status badge
//! - `GET {base_path}/:revision/:file` - artifact download

pub mod auth;
pub mod badge;
pub mod error;
pub mod index;
pub mod server;
pub mod state;
pub mod upload;

pub use badge::{BadgeCache, BadgeService, BadgeSource, MemoryBadgeCache, NoopBadgeCache};
pub use error::{ApiError, ErrorBody};
pub use server::{app, serve};
pub use state::{AppState, Settings};
