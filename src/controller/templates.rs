use super::*;

impl Client {
    pub fn list_templates(&self) -> Outcome<Vec<Template>> {
        self.call("list templates", Method::GET, "/templates", NO_BODY)
    }

    /// Posts the raw YAML document; validation happens on the controller.
    pub fn submit_template(&self, document: &str, org_id: Option<String>) -> Outcome<SubmittedTemplate> {
        let body = SubmitTemplateRequest {
            value: document.to_string(),
            org_id,
        };
        self.call("submit template", Method::POST, "/template", Some(&body))
    }

    pub fn get_template(&self, template_ref: &str) -> Outcome<Template> {
        let path = format!("/template/{}", segment(template_ref));
        self.call("get template", Method::GET, &path, NO_BODY)
    }

    pub fn update_template(&self, template_id: &str, description: &str) -> Outcome<Template> {
        let path = format!("/template/{}", segment(template_id));
        let body = UpdateTemplateRequest {
            description: description.to_string(),
        };
        self.call("update template", Method::PATCH, &path, Some(&body))
    }

    pub fn delete_template(&self, template_id: &str) -> Outcome<serde_json::Value> {
        let path = format!("/template/{}", segment(template_id));
        self.call("delete template", Method::DELETE, &path, NO_BODY)
    }

    pub fn invite_template_user(
        &self,
        template_id: &str,
        email: &str,
        can_update: bool,
        can_delete: bool,
    ) -> Outcome<InvitationRef> {
        let path = format!("/template/{}/user", segment(template_id));
        let body = InviteTemplateUserRequest {
            email: email.to_string(),
            can_update,
            can_delete,
        };
        self.call("invite template user", Method::POST, &path, Some(&body))
    }
}
