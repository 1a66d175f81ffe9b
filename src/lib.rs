pub mod admin;
pub mod category;
pub mod config;
pub mod content;
pub mod content_query;
pub mod error;
pub mod logger;
pub mod newsletter;
pub mod paginator;
pub mod server;
pub mod source;
pub mod store;
pub mod sync;
pub mod text_utils;
pub mod util;
