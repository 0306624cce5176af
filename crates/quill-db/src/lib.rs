//! # quill-db: Credential Store for Quillsync
//!
//! SQLite persistence for user accounts, device records, and refresh
//! tokens. Access goes through per-table repositories hanging off a shared
//! [`Database`] pool handle.
//!
//! ## Layout
//!
//! - [`pool`] - `Database` handle + `DbConfig`
//! - [`migrations`] - embedded schema migrations
//! - [`models`] - row types (`UserRow` keeps the password hash private to
//!   this boundary)
//! - [`repository`] - `UserRepository`, `DeviceRepository`,
//!   `RefreshTokenRepository`
//!
//! ## Example
//! ```rust,ignore
//! let db = Database::new(DbConfig::in_memory()).await?;
//! let user = db.users().find_by_email("a@example.com").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use models::{DeviceRow, NewRefreshToken, RefreshTokenRow, UserRow};
pub use pool::{Database, DbConfig};
pub use repository::device::DeviceRepository;
pub use repository::token::RefreshTokenRepository;
pub use repository::user::UserRepository;
