//! Tests for the domain error payload and its serialisation contract.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::failed_precondition("blocked"), ErrorCode::FailedPrecondition)]
#[case(Error::conflict("raced"), ErrorCode::Conflict)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn serialises_with_snake_case_code_and_skips_missing_details() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));
}

#[rstest]
fn deserialise_rejects_blank_messages() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({ "code": "internal_error", "message": "  " }));
    assert!(result.is_err());
}

#[rstest]
fn reason_reads_details_reason_field() {
    let error = Error::failed_precondition("favorite")
        .with_details(json!({ "reason": "favorite_club_protected", "clubId": "c1" }));
    assert_eq!(error.reason(), Some("favorite_club_protected"));
}

#[rstest]
fn reason_is_none_without_details() {
    assert!(Error::internal("boom").reason().is_none());
}
