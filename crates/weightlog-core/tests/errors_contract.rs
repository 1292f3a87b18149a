// SPDX-License-Identifier: Apache-2.0

use weightlog_core::{ExitCode, MachineError, ResultExt};

#[test]
fn result_ext_attaches_static_context() {
    let r: Result<(), &str> = Err("bad");
    let err = r.with_context("read export file").expect_err("must error");
    assert_eq!(err.context, "read export file");
    assert_eq!(err.source, "bad");
    assert_eq!(err.to_string(), "read export file: bad");
}

#[test]
fn machine_error_serializes_with_sorted_details() {
    let err = MachineError::new("validation", "bad input")
        .with_detail("field", "email")
        .with_detail("reason", "invalid");
    let json = serde_json::to_string(&err).expect("serialize");
    assert_eq!(
        json,
        r#"{"code":"validation","message":"bad input","details":{"field":"email","reason":"invalid"}}"#
    );
    assert_eq!(err.to_string(), "validation: bad input");
}

#[test]
fn exit_codes_are_stable() {
    assert_eq!(ExitCode::Success as u8, 0);
    assert_eq!(ExitCode::Usage as u8, 2);
    assert_eq!(ExitCode::Validation as u8, 3);
    assert_eq!(ExitCode::DependencyFailure as u8, 4);
    assert_eq!(ExitCode::Internal as u8, 10);
    assert_eq!(ExitCode::DependencyFailure.as_str(), "dependency_failure");
}
