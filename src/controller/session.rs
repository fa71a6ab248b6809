//! Sessions, registration and controller bootstrap.

use super::*;

impl Client {
    pub fn start_session(&self, email: &str, password: &str) -> Outcome<StartSessionResponse> {
        let body = StartSessionRequest {
            email: email.to_string(),
            password: password.to_string(),
            hostname: std::env::var("HOSTNAME").ok(),
        };
        self.call("start session", Method::POST, "/session", Some(&body))
    }

    pub fn verify_mfa(&self, login_id: &str, mfa_type: &str, mfa_token: &str) -> Outcome<SessionTokens> {
        let body = VerifyMfaRequest {
            login_id: login_id.to_string(),
            mfa_type: mfa_type.to_string(),
            mfa_token: mfa_token.to_string(),
        };
        self.call("verify mfa", Method::POST, "/session/mfa", Some(&body))
    }

    pub fn validate_session(&self) -> Outcome<SessionInfo> {
        self.call("validate session", Method::GET, "/session", NO_BODY)
    }

    pub fn end_session(&self) -> Outcome<serde_json::Value> {
        self.call("end session", Method::DELETE, "/session", NO_BODY)
    }

    pub fn register_user(&self, email: &str, password: &str) -> Outcome<UserRef> {
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call("register user", Method::POST, "/user", Some(&body))
    }

    pub fn verify_email(&self, code: &str) -> Outcome<VerifiedEmail> {
        let path = format!("/verification/{}", segment(code));
        self.call("verify email", Method::POST, &path, NO_BODY)
    }

    /// Requires `Auth::Basic` with the controller's admin credentials.
    pub fn initialize_controller(&self) -> Outcome<ControllerInit> {
        self.call("initialize controller", Method::POST, "/admin/initialize", NO_BODY)
    }

    /// Requires `Auth::Basic` with the controller's admin credentials.
    pub fn create_initial_user(&self, email: &str, password: &str) -> Outcome<UserRef> {
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call("create initial user", Method::POST, "/admin/user", Some(&body))
    }
}
