//! Path and file-name utilities.
//!
//! Helpers for hidden-file detection, lossy name conversion, canonical-name
//! validation and natural ("human") file-name ordering.

use std::cmp::Ordering;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    /// Splits a file name into alternating digit and non-digit chunks.
    static ref NATURAL_CHUNK_REGEX: Regex = Regex::new(r"[0-9]+|[^0-9]+").unwrap();
}

/// Characters that are rejected in canonical names, on any platform.
const INVALID_NAME_CHARS: &[char] = &['<', '>', '"', '|', '?', '*', ':', '/', '\\'];

/// Gets the file name from a path with fallback to lossy conversion.
///
/// # Arguments
///
/// * `path` - The path to extract the file name from
///
/// # Returns
///
/// * `String` - The file name, using lossy conversion if necessary
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Converts a path to a string with fallback to lossy conversion.
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Checks if a filename starts with a dot (hidden file) using safe conversion.
pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Checks that `name` can be used as a bare file stem inside the organized directory.
///
/// # Returns
///
/// * `Result<()>` - Ok if the name is usable, or an error describing the issue
pub fn validate_file_stem(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Other("Canonical name must not be empty".to_string()));
    }
    if name.starts_with('.') {
        return Err(Error::Other(format!(
            "Canonical name '{}' must not start with a dot",
            name
        )));
    }
    if name
        .chars()
        .any(|c| INVALID_NAME_CHARS.contains(&c) || c.is_control())
    {
        return Err(Error::Other(format!(
            "Canonical name '{}' contains invalid characters",
            name
        )));
    }
    Ok(())
}

/// Compares two paths by file name in natural order.
///
/// Digit runs compare by numeric value, other chunks compare case-insensitively,
/// so `p2.jpg` sorts before `p10.jpg`. Falls back to plain byte order to stay total.
pub fn natural_cmp(a: &Path, b: &Path) -> Ordering {
    let a_name = get_file_name_lossy(a);
    let b_name = get_file_name_lossy(b);
    natural_cmp_str(&a_name, &b_name)
}

/// Natural-order comparison of two plain strings. See [`natural_cmp`].
pub fn natural_cmp_str(a: &str, b: &str) -> Ordering {
    let mut a_chunks = NATURAL_CHUNK_REGEX.find_iter(a);
    let mut b_chunks = NATURAL_CHUNK_REGEX.find_iter(b);

    loop {
        match (a_chunks.next(), b_chunks.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let order = compare_chunk(x.as_str(), y.as_str());
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

fn compare_chunk(x: &str, y: &str) -> Ordering {
    let x_digits = x.bytes().all(|b| b.is_ascii_digit());
    let y_digits = y.bytes().all(|b| b.is_ascii_digit());

    match (x_digits, y_digits) {
        (true, true) => {
            // Compare by magnitude without parsing, so arbitrarily long runs work.
            let x_trim = x.trim_start_matches('0');
            let y_trim = y.trim_start_matches('0');
            x_trim
                .len()
                .cmp(&y_trim.len())
                .then_with(|| x_trim.cmp(y_trim))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}
