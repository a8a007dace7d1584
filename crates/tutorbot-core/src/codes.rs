//! Enrollment-code alphabet utilities.
//!
//! Codes are five characters drawn uniformly from `A-Z0-9`. Everything a
//! user types is normalised (trimmed, uppercased) before it is compared
//! against stored codes.

use rand::Rng;

/// Number of characters in an enrollment code.
pub const CODE_LENGTH: usize = 5;

/// Characters an enrollment code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a fresh candidate code from the thread-local RNG.
///
/// Uniqueness is not checked here; callers retry against the registry.
pub fn generate_code() -> String {
    generate_code_with(&mut rand::thread_rng())
}

/// Draws a candidate code from the given RNG.
pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Trims surrounding whitespace and uppercases user input.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Returns `true` when `text` is exactly a bare code token as typed:
/// five characters from the code alphabet, already uppercase.
pub fn is_code_token(text: &str) -> bool {
    text.len() == CODE_LENGTH && text.bytes().all(|b| CODE_ALPHABET.contains(&b))
}
