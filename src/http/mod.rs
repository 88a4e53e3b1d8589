//! HTTP protocol helpers
//!
//! Response builders shared by every route.

mod response;

pub use response::{build_json_response, build_options_response, CORS_HEADERS};
