use super::*;

#[derive(Debug, Default, serde::Deserialize)]
struct Thing {
    #[serde(default)]
    id: String,
}

#[test]
fn success_decodes_data() {
    let body = br#"{"success":true,"data":{"id":"X"}}"#;
    let thing: Thing = decode_envelope("get thing", "http://c", 200, body).unwrap();
    assert_eq!(thing.id, "X");
}

#[test]
fn error_code_maps_to_sentinel_with_partial_data() {
    let body = br#"{"success":false,"errorCode":"not_found"}"#;
    let rejection = decode_envelope::<Thing>("get thing", "http://c", 404, body).unwrap_err();
    assert_eq!(rejection.code(), Some(ErrorCode::NotFound));
    let partial = rejection.partial.expect("envelope was parsed");
    assert_eq!(partial.id, "");
}

#[test]
fn partial_data_is_kept_on_failure() {
    let body = br#"{"success":false,"errorCode":"mfa_required","data":{"id":"L1"}}"#;
    let rejection = decode_envelope::<Thing>("login", "http://c", 401, body).unwrap_err();
    assert_eq!(rejection.code(), Some(ErrorCode::MfaRequired));
    assert_eq!(rejection.partial.unwrap().id, "L1");
}

#[test]
fn status_above_500_is_not_a_controller() {
    let body = br#"{"success":false,"errorCode":"not_found"}"#;
    let rejection = decode_envelope::<Thing>("x", "http://c", 502, body).unwrap_err();
    assert!(matches!(rejection.error, Error::NotController { status: 502, .. }));
    assert!(rejection.partial.is_none());
}

#[test]
fn status_500_with_envelope_is_still_parsed() {
    let body = br#"{"success":false,"message":"boom"}"#;
    let rejection = decode_envelope::<Thing>("x", "http://c", 500, body).unwrap_err();
    assert!(matches!(rejection.error, Error::Unsuccessful { status: 500, .. }));
    assert!(rejection.partial.is_some());
}

#[test]
fn unparseable_body_is_not_a_controller() {
    let rejection = decode_envelope::<Thing>("x", "http://c", 200, b"<html>").unwrap_err();
    assert!(matches!(
        rejection.error,
        Error::NotController {
            source: Some(_),
            ..
        }
    ));
}

#[test]
fn success_false_with_200_is_unsuccessful() {
    let body = br#"{"success":false}"#;
    let rejection = decode_envelope::<Thing>("x", "http://c", 200, body).unwrap_err();
    assert!(matches!(rejection.error, Error::Unsuccessful { status: 200, .. }));
}

#[test]
fn unknown_error_codes_are_reported_verbatim() {
    let body = br#"{"success":false,"errorCode":"brand_new"}"#;
    let rejection = decode_envelope::<Thing>("x", "http://c", 400, body).unwrap_err();
    match rejection.error {
        Error::UnknownErrorCode { code, .. } => assert_eq!(code, "brand_new"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn client_requires_scheme_and_host() {
    assert!(Client::new("localhost:54321", "t", Auth::None).is_err());
    assert!(Client::new("not a url", "t", Auth::None).is_err());
    let client = Client::new("http://localhost:54321/", "list-orgs", Auth::None).unwrap();
    assert_eq!(client.base_url(), "http://localhost:54321");
    assert!(
        client
            .user_agent()
            .starts_with("opsicle/controller-sdk/client-list-orgs")
    );
    assert_eq!(client.url("/orgs"), "http://localhost:54321/api/v1/orgs");
}

#[test]
fn segments_are_percent_encoded() {
    assert_eq!(segment("a b/c"), "a%20b%2Fc");
    assert_eq!(segment("user@example.com"), "user@example.com");
}
