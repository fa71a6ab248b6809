//! Login, logout, registration and verification.

use std::path::PathBuf;

use super::*;
use crate::cli::Console;
use crate::config::Effective;
use crate::controller::{Auth, Client};
use crate::credentials::{CredentialError, CredentialStore};
use crate::tui::Prompt;

pub fn login_flags() -> FlagSet {
    FlagSet::new()
        .string("email", None, "", "email address of the account")
        .string("password", None, "", "password of the account")
        .string("mfa-token", None, "", "one-time code, when the account uses MFA")
}

/// Values the login flow starts from; empty ones are asked for.
#[derive(Clone, Debug, Default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub mfa_token: String,
}

impl LoginInput {
    pub fn from_config(config: &Effective) -> Result<Self> {
        Ok(Self {
            email: config.string("email")?.to_string(),
            password: config.string("password")?.to_string(),
            mfa_token: config.string("mfa-token")?.to_string(),
        })
    }
}

/// Starts a session, answering an MFA challenge if the controller sends one,
/// and stores the token. Returns where it was stored.
///
/// Credentials typed into the form are asked for again after
/// `invalid_credentials`; credentials given as flags are not.
pub fn perform_login(
    console: &mut Console<'_>,
    store: &CredentialStore,
    controller_url: &str,
    input: &LoginInput,
) -> Result<PathBuf> {
    let client = Client::new(controller_url, "login", Auth::None)?;
    let asking = input.email.is_empty() || input.password.is_empty();
    let mut email = input.email.clone();

    let token = loop {
        let password = if asking {
            let (e, p) = ask_credentials(console, &email)?;
            email = e;
            p
        } else {
            input.password.clone()
        };

        match client.start_session(&email, &password) {
            Ok(session) => break session.session_token,
            Err(rejection) if rejection.code() == Some(ErrorCode::MfaRequired) => {
                let challenge = rejection.partial.unwrap_or_default();
                tracing::debug!(mfa_type = %challenge.mfa_type, "controller requested MFA");
                let code = if input.mfa_token.is_empty() {
                    ask_mfa_token(console, &challenge.mfa_type)?
                } else {
                    input.mfa_token.clone()
                };
                let tokens = client.verify_mfa(&challenge.login_id, &challenge.mfa_type, &code)?;
                break tokens.session_token;
            }
            Err(rejection) if asking && rejection.code() == Some(ErrorCode::InvalidCredentials) => {
                console.boxed(Tone::Warn, "Incorrect email or password; try again")?;
            }
            Err(rejection) => return Err(rejection.into()),
        }
    };

    if token.is_empty() {
        bail!("controller accepted the login but returned no session token");
    }
    let path = store.write(&token)?;
    tracing::info!(path = %path.display(), "session stored");
    console.boxed(
        Tone::Success,
        &format!("Logged in as {}\nSession saved to {}", email, path.display()),
    )?;
    Ok(path)
}

fn ask_credentials(console: &mut Console<'_>, email: &str) -> Result<(String, String)> {
    let mut form = Form::new("Log in to Opsicle")
        .field_with_value(
            "email",
            "Email",
            FieldKind::String,
            email,
            &[Validator::Required, Validator::Email],
        )
        .field("password", "Password", FieldKind::Password, &[Validator::Required]);
    tui::run(&mut *console.ui, &mut form, Mode::Fullscreen)?;
    Ok((
        form.value("email").unwrap_or_default().trim().to_string(),
        form.value("password").unwrap_or_default().to_string(),
    ))
}

fn ask_mfa_token(console: &mut Console<'_>, mfa_type: &str) -> Result<String> {
    let label = match mfa_type {
        "totp" => "TOTP code".to_string(),
        "" => "Verification code".to_string(),
        other => format!("{} code", other),
    };
    let mut prompt = Prompt::new("Multi-factor authentication").field("mfa-token", &label, FieldKind::String);
    tui::run(&mut *console.ui, &mut prompt, Mode::Fullscreen)?;
    let code = prompt.value("mfa-token").unwrap_or_default().trim().to_string();
    if code.is_empty() {
        bail!("no verification code entered");
    }
    Ok(code)
}

pub(super) fn login() -> Node {
    Node::leaf("login", "Start a session and store its token", run_login).flags(login_flags())
}

fn run_login(ctx: &mut Ctx<'_>) -> Result<()> {
    let input = LoginInput::from_config(&ctx.config)?;
    let url = ctx.controller_url()?;
    let (mut console, store) = ctx.console_and_store();
    perform_login(&mut console, store, &url, &input)?;
    Ok(())
}

pub(super) fn logout() -> Node {
    Node::leaf("logout", "End the session and remove its token", run_logout)
}

fn run_logout(ctx: &mut Ctx<'_>) -> Result<()> {
    let session = match ctx.app.credentials.read() {
        Ok(session) => session,
        Err(CredentialError::NoSession) => {
            return ctx.boxed(Tone::Info, "Not logged in; nothing to do");
        }
        Err(err) => return Err(err.into()),
    };

    let client = Client::new(
        &ctx.controller_url()?,
        &ctx.client_id(),
        Auth::Bearer(session.token.clone()),
    )?;
    if let Err(rejection) = client.end_session() {
        tracing::warn!(error = %rejection.error, "controller did not end the session");
        ctx.boxed(
            Tone::Warn,
            &format!("The controller could not end the session: {}", rejection.error),
        )?;
    }
    ctx.app.credentials.delete()?;
    ctx.success(&format!("Logged out; removed {}", session.path.display()))
}

pub(super) fn register() -> Node {
    Node::leaf("register", "Create an account on the controller", run_register).flags(
        FlagSet::new()
            .string("email", None, "", "email address for the new account")
            .string("password", None, "", "password for the new account"),
    )
}

fn run_register(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let mut email = ctx.string("email")?;
    let mut password = ctx.string("password")?;
    complete(
        ctx,
        "Register",
        &mut [
            (Ask::email("email", "Email"), &mut email),
            (Ask::password("password", "Password"), &mut password),
        ],
    )?;

    let client = Client::new(&ctx.controller_url()?, &ctx.client_id(), Auth::None)?;
    let user = client.register_user(&email, &password)?;
    if json {
        return ctx.emit_json(&user);
    }
    ctx.success(&format!(
        "Registered {}\nCheck your inbox for a verification code, then run `opsicle verify email`",
        user.email
    ))
}

pub(super) fn verify() -> Node {
    Node::leaf("verify", "Show who the current session belongs to", run_verify).child(
        Node::leaf("email", "Confirm an email address with its verification code", run_verify_email)
            .flags(FlagSet::new().string("code", None, "", "code from the verification email")),
    )
}

fn run_verify(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let info = client.validate_session()?;
    let clock = ctx.clock(false);
    render_record(
        ctx,
        &info,
        &[
            ("user", or_dash(&info.user_id)),
            ("email", or_dash(&info.email)),
            ("session", or_dash(&info.session_id)),
            ("expires", clock.format_opt(info.expires_at.as_deref())),
        ],
    )
}

fn run_verify_email(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let mut code = ctx.string("code")?;
    complete(ctx, "Verify email", &mut [(Ask::text("code", "Verification code"), &mut code)])?;

    let client = Client::new(&ctx.controller_url()?, &ctx.client_id(), Auth::None)?;
    let verified = client.verify_email(code.trim())?;
    if json {
        return ctx.emit_json(&verified);
    }
    ctx.success(&format!("Verified {}", or_dash(&verified.email)))
}
