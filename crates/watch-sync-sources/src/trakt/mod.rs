pub mod api;
pub mod auth;
pub mod client;

pub use api::TraktIds;
pub use auth::{authenticate as trakt_authenticate, TokenInfo};
pub use client::TraktClient;
