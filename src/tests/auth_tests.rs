use std::net::TcpListener;

use super::*;
use crate::controller::ErrorKind;
use crate::credentials::Profile;
use crate::tui::{Cancelled, is_cancelled};

struct CountingLogin {
    calls: usize,
    token: Option<&'static str>,
}

impl LoginFlow for CountingLogin {
    fn login(&mut self, store: &CredentialStore) -> Result<()> {
        self.calls += 1;
        match self.token {
            Some(token) => {
                store.write(token)?;
                Ok(())
            }
            None => Err(Cancelled.into()),
        }
    }
}

fn store() -> (tempfile::TempDir, CredentialStore) {
    let home = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(&Profile::under(home.path()));
    (home, store)
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    crate::controller::find(err).map(|e| e.kind())
}

#[test]
fn unreachable_controller_keeps_the_stored_credential() {
    let (_home, store) = store();
    store.write("T0").unwrap();
    let mut login = CountingLogin {
        calls: 0,
        token: Some("T1"),
    };

    let err = require_session(&store, &closed_port_url(), "list-orgs", &mut login).unwrap_err();

    assert_eq!(kind_of(&err), Some(ErrorKind::Transport), "{err:#}");
    assert_eq!(login.calls, 0);
    assert_eq!(store.read().unwrap().token, "T0");
}

#[test]
fn missing_credential_starts_login_before_validating() {
    let (_home, store) = store();
    let mut login = CountingLogin {
        calls: 0,
        token: Some("T1"),
    };

    let err = require_session(&store, &closed_port_url(), "list-orgs", &mut login).unwrap_err();

    assert_eq!(login.calls, 1);
    assert_eq!(kind_of(&err), Some(ErrorKind::Transport));
    assert_eq!(store.read().unwrap().token, "T1");
}

#[test]
fn cancelled_login_ends_the_loop() {
    let (_home, store) = store();
    let mut login = CountingLogin {
        calls: 0,
        token: None,
    };

    let err = require_session(&store, &closed_port_url(), "list-orgs", &mut login).unwrap_err();

    assert!(is_cancelled(&err));
    assert_eq!(login.calls, 1);
    assert!(matches!(store.read(), Err(CredentialError::NoSession)));
}

#[test]
fn malformed_controller_url_fails_without_login() {
    let (_home, store) = store();
    store.write("T0").unwrap();
    let mut login = CountingLogin {
        calls: 0,
        token: Some("T1"),
    };

    let err = require_session(&store, "not a url", "list-orgs", &mut login).unwrap_err();

    assert_eq!(kind_of(&err), Some(ErrorKind::Validation));
    assert_eq!(login.calls, 0);
}
