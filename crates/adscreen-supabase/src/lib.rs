//! Supabase REST API client.
//!
//! Three thin collaborators over the same HTTP client:
//! - auth: resolve a caller's bearer token to a user
//! - settings: key/value store used for classifier credential lookup
//! - analyses: append-only history of analysis results
//!
//! History writes are fire-and-forget from the pipeline's perspective;
//! errors here are logged by the caller, never surfaced.

pub mod analyses;
pub mod auth;
pub mod client;
pub mod error;
pub mod settings;

pub use auth::AuthUser;
pub use client::{SupabaseClient, SupabaseConfig};
pub use error::{SupabaseError, SupabaseResult};
