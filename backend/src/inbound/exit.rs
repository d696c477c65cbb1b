//! Process exit mapping for domain errors.
//!
//! Command-line adapters report failures as a JSON error on stderr and a
//! `sysexits`-style status, so scripts can branch on the category without
//! parsing the message.

use std::process::ExitCode;

use crate::domain::{Error, ErrorCode};

/// Exit status for an error category.
pub fn status_for(code: ErrorCode) -> u8 {
    match code {
        ErrorCode::InvalidRequest => 64,
        ErrorCode::NotFound => 66,
        ErrorCode::FailedPrecondition => 65,
        ErrorCode::InternalError => 70,
        ErrorCode::Conflict => 75,
        ErrorCode::Unauthorized => 77,
    }
}

/// Render `error` for stderr and pick the matching exit code.
pub fn report(error: &Error) -> (String, ExitCode) {
    let rendered = serde_json::to_string(error).unwrap_or_else(|_| error.to_string());
    (rendered, ExitCode::from(status_for(error.code())))
}

#[cfg(test)]
mod tests {
    //! Exit status coverage.
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(ErrorCode::InvalidRequest, 64)]
    #[case(ErrorCode::FailedPrecondition, 65)]
    #[case(ErrorCode::NotFound, 66)]
    #[case(ErrorCode::InternalError, 70)]
    #[case(ErrorCode::Conflict, 75)]
    #[case(ErrorCode::Unauthorized, 77)]
    fn categories_map_to_sysexits(#[case] code: ErrorCode, #[case] expected: u8) {
        assert_eq!(status_for(code), expected);
    }

    #[rstest]
    fn report_renders_json_with_details() {
        let error = Error::failed_precondition("change expired")
            .with_details(json!({ "reason": "undo_expired" }));
        let (rendered, _) = report(&error);
        let value: Value = serde_json::from_str(&rendered).expect("json");
        assert_eq!(value["code"], "failed_precondition");
        assert_eq!(value["details"]["reason"], "undo_expired");
    }
}
