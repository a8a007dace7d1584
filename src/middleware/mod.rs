//! Request middleware.
//!
//! - [`api_key`]: guards the `/api` routes with a static key when
//!   `API_KEY` is configured

pub mod api_key;
