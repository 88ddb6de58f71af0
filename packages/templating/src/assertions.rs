//! Assertions Module
//!
//! Sanity checks for user supplied interpolation markers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TemplatingError};

static UNUSABLE_INTERPOLATION_REGEXPS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"@",          // control flow reserved symbol
        r"^\s*$",      // empty
        r"[<>]",       // html tag
        r"^[{}]$",     // single brace
        r"&(#|[a-z])", // character reference
        r"^//",        // comment
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

pub fn assert_interpolation_symbols(identifier: &str, start: &str, end: &str) -> Result<()> {
    for regexp in UNUSABLE_INTERPOLATION_REGEXPS.iter() {
        if regexp.is_match(start) || regexp.is_match(end) {
            return Err(TemplatingError::InvalidConfig(format!(
                "{}: ['{}', '{}'] contains unusable interpolation symbol.",
                identifier, start, end
            )));
        }
    }
    Ok(())
}
