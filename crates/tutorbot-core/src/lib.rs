//! # Tutorbot Core
//!
//! Core types and utilities for the Tutorbot service.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`codes`]: Enrollment-code alphabet, generation and normalisation
//!
//! # Example
//!
//! ```ignore
//! use tutorbot_core::codes::{generate_code, normalize_code};
//! use tutorbot_core::errors::AppError;
//!
//! let code = generate_code();
//! assert_eq!(code.len(), 5);
//! assert_eq!(normalize_code("  ab12c "), "AB12C");
//!
//! let error = AppError::not_found(anyhow::anyhow!("Conversation not found"));
//! ```

pub mod codes;
pub mod errors;

// Re-export commonly used types at crate root
pub use codes::{CODE_ALPHABET, CODE_LENGTH, generate_code, is_code_token, normalize_code};
pub use errors::AppError;
