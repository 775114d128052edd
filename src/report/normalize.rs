//! Error-record normalization
//!
//! Turns a raw failure message (usually a Playwright timeout with its
//! multi-line call log) into one line that can be embedded as a string
//! literal in the session-status payload.

/// Marker after which Playwright appends its step-by-step call log
pub const DIAGNOSTIC_MARKER: &str = "Call log:";

/// Token substituted for `:` so the reason cannot collide with key/value syntax
pub const COLON_REPLACEMENT: &str = "=>";

/// Normalize a raw diagnostic into a single-line error record
///
/// Truncates at [`DIAGNOSTIC_MARKER`], flattens line breaks to spaces,
/// replaces colons with [`COLON_REPLACEMENT`], drops single quotes and trims.
/// Applying it to its own output returns the same string.
pub fn normalize_error(raw: &str) -> String {
    let head = match raw.find(DIAGNOSTIC_MARKER) {
        Some(pos) => &raw[..pos],
        None => raw,
    };

    head.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace(':', COLON_REPLACEMENT)
        .replace('\'', "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playwright_timeout_is_truncated_at_call_log() {
        let raw = "Timeout 5000ms exceeded.\nCall log:\n  - waiting for selector\n";
        assert_eq!(normalize_error(raw), "Timeout 5000ms exceeded.");
    }

    #[test]
    fn test_nothing_after_marker_survives() {
        let raw = "Error: boom\nCall log:\n  - secret step\nCall log: again";
        let record = normalize_error(raw);
        assert_eq!(record, "Error=> boom");
        assert!(!record.contains("secret"));
    }

    #[test]
    fn test_newlines_colons_and_quotes() {
        let raw = "Assertion failed: expected 'Apple'\r\nbut got 'Samsung'\rdone";
        let record = normalize_error(raw);
        assert_eq!(
            record,
            "Assertion failed=> expected Apple but got Samsung done"
        );
        assert!(!record.contains('\n'));
        assert!(!record.contains('\r'));
        assert!(!record.contains(':'));
        assert!(!record.contains('\''));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Timeout 5000ms exceeded.\nCall log:\n  - waiting for selector\n",
            "page.goto: net::ERR_NAME_NOT_RESOLVED at https://testathon.live/",
            "it's a 'quoted' message:\nsecond line",
            "",
            "already clean",
            "trailing marker Call log:",
        ];
        for raw in inputs {
            let once = normalize_error(raw);
            assert_eq!(normalize_error(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_clean_input_is_unchanged() {
        assert_eq!(
            normalize_error("Search returned 3 results"),
            "Search returned 3 results"
        );
    }

    #[test]
    fn test_url_colons_become_arrows() {
        assert_eq!(
            normalize_error("Failed to navigate to https://testathon.live/"),
            "Failed to navigate to https=>//testathon.live/"
        );
    }
}
