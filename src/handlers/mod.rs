//! HTTP request handlers.

pub mod http;
pub mod jokes;

pub use http::*;
pub use jokes::list_jokes;
