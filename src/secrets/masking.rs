//! Display masking for sensitive values
//!
//! Masking is one-way and only applied when values leave the process in a
//! response body. Lengths are counted in characters, not bytes.

use lazy_static::lazy_static;
use regex::Regex;

pub const MASK: &str = "****";

lazy_static! {
    static ref CONNECTION_PASSWORD: Regex =
        Regex::new("password=[^;]+").expect("connection string password pattern is valid");
}

/// Keep the first `visible` characters and append the mask; values not
/// longer than `visible` are masked entirely.
fn mask_with_prefix(value: &str, visible: usize) -> String {
    if value.chars().count() > visible {
        let prefix: String = value.chars().take(visible).collect();
        format!("{}{}", prefix, MASK)
    } else {
        MASK.to_string()
    }
}

/// `hunter2` -> `hu****`
pub fn mask_password(password: &str) -> String {
    mask_with_prefix(password, 2)
}

/// `abcd1234` -> `abcd****`
pub fn mask_api_key(api_key: &str) -> String {
    mask_with_prefix(api_key, 4)
}

/// Generic vault values use the API key rule
pub fn mask_secret_value(value: &str) -> String {
    mask_with_prefix(value, 4)
}

/// Replace every `password=<value>` segment (up to `;` or end of input)
pub fn mask_connection_string(connection_string: &str) -> String {
    CONNECTION_PASSWORD
        .replace_all(connection_string, "password=****")
        .into_owned()
}
