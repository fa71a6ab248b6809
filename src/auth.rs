//! The re-authentication loop every authenticated command goes through.

use anyhow::Result;

use crate::app::App;
use crate::cli::{Console, Ctx};
use crate::commands::session::{self, LoginInput};
use crate::config::{CliValues, Effective};
use crate::controller::{Auth, Client};
use crate::credentials::{CredentialError, CredentialStore};

/// Obtains a fresh session and persists it to the store.
pub trait LoginFlow {
    fn login(&mut self, store: &CredentialStore) -> Result<()>;
}

/// Returns a session token the controller accepts.
///
/// A missing credential, or one the controller rejects, leads to `login`
/// followed by another validation round. Transport failures and login
/// errors (including cancellation) end the loop and leave the stored
/// credential untouched.
pub fn require_session(
    store: &CredentialStore,
    controller_url: &str,
    id: &str,
    login: &mut dyn LoginFlow,
) -> Result<String> {
    loop {
        match store.read() {
            Ok(session) => {
                let client = Client::new(controller_url, id, Auth::Bearer(session.token.clone()))?;
                match client.validate_session() {
                    Ok(info) => {
                        tracing::debug!(user = %info.email, "session accepted");
                        return Ok(session.token);
                    }
                    Err(rejection) if rejection.partial.is_none() => return Err(rejection.into()),
                    Err(rejection) => {
                        tracing::info!(error = %rejection.error, "stored session rejected; logging in again");
                        store.delete()?;
                    }
                }
            }
            Err(CredentialError::NoSession) => tracing::debug!("no stored session"),
            Err(err) => return Err(err.into()),
        }
        login.login(store)?;
    }
}

/// Ensures a valid session and returns a client authenticated with it.
///
/// Messages from a login run on the way go to stderr; stdout belongs to the
/// command.
pub fn require_auth(ctx: &mut Ctx<'_>) -> Result<Client> {
    let url = ctx.controller_url()?;
    let id = ctx.client_id();
    let App {
        ui,
        err,
        env,
        config_file,
        credentials,
        color,
        ..
    } = &mut *ctx.app;
    let mut flow = InteractiveLogin {
        console: Console {
            ui: &mut **ui,
            out: &mut **err,
            color: *color,
        },
        env,
        config_file,
        controller_url: &url,
    };
    let token = require_session(credentials, &url, &id, &mut flow)?;
    Ok(Client::new(&url, &id, Auth::Bearer(token))?)
}

/// Runs the `login` command's flow with values from the environment and
/// config file only; the current command's flags do not apply to it.
struct InteractiveLogin<'a> {
    console: Console<'a>,
    env: &'a crate::config::Env,
    config_file: &'a crate::config::ConfigFile,
    controller_url: &'a str,
}

impl LoginFlow for InteractiveLogin<'_> {
    fn login(&mut self, store: &CredentialStore) -> Result<()> {
        let config = Effective::bind(
            &session::login_flags(),
            &CliValues::new(),
            self.env,
            self.config_file,
        )?;
        let input = LoginInput::from_config(&config)?;
        session::perform_login(&mut self.console, store, self.controller_url, &input)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
