use std::collections::HashSet;

use super::*;

#[test]
fn every_server_code_maps_to_exactly_one_sentinel() {
    let mut seen = HashSet::new();
    for code in ErrorCode::ALL {
        assert!(seen.insert(code.as_str()), "duplicate wire code {}", code);
        assert_eq!(ErrorCode::from_wire(code.as_str()), Some(*code));
    }
    assert_eq!(seen.len(), ErrorCode::ALL.len());
}

#[test]
fn unknown_codes_do_not_map() {
    assert_eq!(ErrorCode::from_wire("not_a_code"), None);
    assert_eq!(ErrorCode::from_wire(""), None);
}

#[test]
fn codes_carry_their_kind() {
    assert_eq!(ErrorCode::MfaRequired.kind(), ErrorKind::Authentication);
    assert_eq!(ErrorCode::OrgRequiresOneAdmin.kind(), ErrorKind::Authorization);
    assert_eq!(ErrorCode::NotFound.kind(), ErrorKind::NotFound);
    assert_eq!(ErrorCode::OrgExists.kind(), ErrorKind::Conflict);
}

#[test]
fn controller_errors_display_the_wire_code() {
    let err = Error::Controller {
        code: ErrorCode::OrgExists,
        status: 409,
        message: Some("org code taken".to_string()),
    };
    assert_eq!(
        err.to_string(),
        "controller responded with org_exists (status 409): org code taken"
    );
    assert!(err.has_envelope());
}

#[test]
fn rejections_expose_the_code_through_anyhow_chains() {
    let rejection: Rejection<()> = Rejection {
        op: "create org",
        error: Error::Controller {
            code: ErrorCode::OrgExists,
            status: 409,
            message: None,
        },
        partial: Some(()),
    };
    let err = anyhow::Error::new(rejection).context("creating acme");
    assert_eq!(error_code(&err), Some(ErrorCode::OrgExists));
    let rendered = format!("{:#}", err);
    assert!(rendered.contains("create org"), "{rendered}");
    assert!(rendered.contains("org_exists"), "{rendered}");
}

#[test]
fn transport_errors_have_no_envelope() {
    let err = Error::ConnectionRefused {
        url: "http://localhost:1".to_string(),
    };
    assert!(!err.has_envelope());
    assert_eq!(err.kind(), ErrorKind::Transport);
}
