//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad row count)|
//! | 50-59   | fetch            | Page source failures                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`fetch_exit_code`] or the relevant command

use pagesel_engine::FetchError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (terminal setup, output I/O).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, non-numeric row count.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Page source unreachable, or it kept failing after retries.
pub const EXIT_FETCH_UPSTREAM: u8 = 50;

/// Page source answered with a non-retryable HTTP error (4xx).
pub const EXIT_FETCH_REJECTED: u8 = 51;

/// Page source answered with a body that is not an artworks page.
pub const EXIT_FETCH_PARSE: u8 = 52;

/// Map a fetch error to its exit code.
pub fn fetch_exit_code(err: &FetchError) -> u8 {
    match err {
        FetchError::Network(_) => EXIT_FETCH_UPSTREAM,
        FetchError::Http(status, _) if *status == 429 || *status >= 500 => EXIT_FETCH_UPSTREAM,
        FetchError::Http(_, _) => EXIT_FETCH_REJECTED,
        FetchError::Parse(_) => EXIT_FETCH_PARSE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_exit_codes() {
        assert_eq!(fetch_exit_code(&FetchError::Network("refused".into())), 50);
        assert_eq!(fetch_exit_code(&FetchError::Http(503, String::new())), 50);
        assert_eq!(fetch_exit_code(&FetchError::Http(429, String::new())), 50);
        assert_eq!(fetch_exit_code(&FetchError::Http(404, String::new())), 51);
        assert_eq!(fetch_exit_code(&FetchError::Parse("bad".into())), 52);
    }
}
