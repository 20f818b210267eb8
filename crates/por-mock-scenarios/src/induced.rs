//! ---
//! por_section: "02-scenario-engine"
//! por_subsection: "module"
//! por_type: "source"
//! por_scope: "code"
//! por_description: "Canned bodies for induced HTTP error statuses."
//! por_version: "v0.1.0"
//! por_owner: "tbd"
//! ---
use serde::Serialize;

/// `{error, message}` body sent with an induced status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    pub message: &'a str,
}

const KNOWN: [(u16, ErrorBody<'static>); 9] = [
    (400, ErrorBody { error: "Bad Request", message: "Invalid request parameters" }),
    (401, ErrorBody { error: "Unauthorized", message: "Authentication required" }),
    (403, ErrorBody { error: "Forbidden", message: "Access denied" }),
    (404, ErrorBody { error: "Not Found", message: "Resource not found" }),
    (429, ErrorBody { error: "Too Many Requests", message: "Rate limit exceeded" }),
    (500, ErrorBody { error: "Internal Server Error", message: "An unexpected error occurred" }),
    (502, ErrorBody { error: "Bad Gateway", message: "Upstream service unavailable" }),
    (503, ErrorBody { error: "Service Unavailable", message: "Service temporarily unavailable" }),
    (504, ErrorBody { error: "Gateway Timeout", message: "Upstream request timed out" }),
];

const FALLBACK: ErrorBody<'static> = ErrorBody {
    error: "Error",
    message: "An error occurred",
};

/// Body for an induced status; codes outside the table get the generic body.
pub fn error_body(status: u16) -> ErrorBody<'static> {
    KNOWN
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, body)| *body)
        .unwrap_or(FALLBACK)
}

/// Codes with a dedicated body.
pub fn known_statuses() -> impl Iterator<Item = u16> {
    KNOWN.iter().map(|(code, _)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_matches_contract() {
        let encoded = serde_json::to_string(&error_body(404)).unwrap();
        assert_eq!(
            encoded,
            r#"{"error":"Not Found","message":"Resource not found"}"#
        );
    }

    #[test]
    fn every_known_code_has_its_own_body() {
        let codes: Vec<u16> = known_statuses().collect();
        assert_eq!(codes, vec![400, 401, 403, 404, 429, 500, 502, 503, 504]);
        for code in codes {
            assert_ne!(error_body(code), FALLBACK, "code {code}");
        }
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(error_body(418), FALLBACK);
        assert_eq!(error_body(201).error, "Error");
    }
}
