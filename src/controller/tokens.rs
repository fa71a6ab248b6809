use super::*;

impl Client {
    pub fn list_tokens(&self) -> Outcome<Vec<Token>> {
        self.call("list tokens", Method::GET, "/tokens", NO_BODY)
    }

    pub fn create_token(&self, name: &str, org_id: Option<String>, ttl_hours: Option<f64>) -> Outcome<CreatedToken> {
        let body = CreateTokenRequest {
            name: name.to_string(),
            org_id,
            ttl_hours,
        };
        self.call("create token", Method::POST, "/token", Some(&body))
    }

    pub fn delete_token(&self, token_id: &str) -> Outcome<serde_json::Value> {
        let path = format!("/token/{}", segment(token_id));
        self.call("delete token", Method::DELETE, &path, NO_BODY)
    }
}
