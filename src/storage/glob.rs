//! Glob pattern matching for storage listings
//!
//! Input paths are caller-supplied globs like `song_data/*/*/*/*.json`.
//! Only `*` is supported, and it never crosses a `/` boundary, which is
//! what makes a four-level glob mean exactly four directory levels.

use crate::error::{Error, Result};
use regex::Regex;

/// Compile a storage glob into an anchored regex
pub fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for segment in glob.trim_matches('/').split('*') {
        if !pattern.ends_with('^') {
            pattern.push_str("[^/]*");
        }
        pattern.push_str(&regex::escape(segment));
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|e| Error::invalid_path(glob, format!("bad glob: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_glob() {
        let re = glob_to_regex("log_data/*.json").unwrap();
        assert!(re.is_match("log_data/2018-11-12-events.json"));
        assert!(!re.is_match("log_data/nested/2018-11-12-events.json"));
        assert!(!re.is_match("log_data/2018-11-12-events.csv"));
    }

    #[test]
    fn test_nested_glob() {
        let re = glob_to_regex("song_data/*/*/*/*.json").unwrap();
        assert!(re.is_match("song_data/A/B/C/TRABCEI128F424C983.json"));
        assert!(!re.is_match("song_data/A/B/TRABCEI128F424C983.json"));
        assert!(!re.is_match("song_data/A/B/C/D/TRABCEI128F424C983.json"));
    }

    #[test]
    fn test_literal_dots_escaped() {
        let re = glob_to_regex("log_data/*.json").unwrap();
        assert!(!re.is_match("log_data/eventsXjson"));
    }

    #[test]
    fn test_leading_slash_trimmed() {
        let re = glob_to_regex("/log_data/*.json").unwrap();
        assert!(re.is_match("log_data/a.json"));
    }
}
