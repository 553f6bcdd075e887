//! Short code generation.
//!
//! Codes are drawn uniformly from a 62-symbol alphabet using bytes from the
//! operating system CSPRNG. Every attempt is independent; nothing is derived
//! from a counter or the previous code.

use crate::error::AppError;
use serde_json::json;

/// Symbols a generated code may contain.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default length of a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Largest multiple of 62 that fits in a byte; bytes at or above it are
/// rejected so that every symbol is equally likely.
const ACCEPT_BELOW: u8 = 248;

/// Generates a random code of exactly `length` alphabet symbols.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random source fails.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7)?;
/// assert_eq!(code.len(), 7);
/// assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> Result<String, AppError> {
    let mut code = String::with_capacity(length);
    let mut buffer = vec![0u8; length.max(8) * 2];

    while code.len() < length {
        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::internal(
                "Failed to generate random bytes",
                json!({ "reason": e.to_string() }),
            )
        })?;

        for &byte in buffer.iter().filter(|&&b| b < ACCEPT_BELOW) {
            if code.len() == length {
                break;
            }
            code.push(ALPHABET[usize::from(byte % 62)] as char);
        }
    }

    Ok(code)
}

/// Returns true if every character of `code` belongs to [`ALPHABET`].
pub fn is_alphabet_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| ALPHABET.contains(&b))
}
