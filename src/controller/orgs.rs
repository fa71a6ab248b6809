//! Organizations, their members, roles and invitations.

use super::*;

impl Client {
    pub fn list_orgs(&self) -> Outcome<Vec<Org>> {
        self.call("list orgs", Method::GET, "/orgs", NO_BODY)
    }

    pub fn create_org(&self, code: &str, name: &str) -> Outcome<CreatedOrg> {
        let body = CreateOrgRequest {
            code: code.to_string(),
            name: name.to_string(),
        };
        self.call("create org", Method::POST, "/org", Some(&body))
    }

    /// `org_ref` may be the org's id or its code.
    pub fn get_org(&self, org_ref: &str) -> Outcome<Org> {
        let path = format!("/org/{}", segment(org_ref));
        self.call("get org", Method::GET, &path, NO_BODY)
    }

    pub fn list_org_users(&self, org_id: &str) -> Outcome<Vec<OrgUser>> {
        let path = format!("/org/{}/users", segment(org_id));
        self.call("list org users", Method::GET, &path, NO_BODY)
    }

    pub fn invite_org_user(&self, org_id: &str, email: &str, is_admin: bool) -> Outcome<InvitationRef> {
        let path = format!("/org/{}/member", segment(org_id));
        let body = InviteUserRequest {
            email: email.to_string(),
            is_admin,
        };
        self.call("invite org user", Method::POST, &path, Some(&body))
    }

    pub fn update_org_user(&self, org_id: &str, user_id: &str, member_type: &str) -> Outcome<serde_json::Value> {
        let path = format!("/org/{}/member/{}", segment(org_id), segment(user_id));
        let body = UpdateMemberRequest {
            member_type: member_type.to_string(),
        };
        self.call("update org user", Method::PATCH, &path, Some(&body))
    }

    pub fn remove_org_user(&self, org_id: &str, user_id: &str) -> Outcome<serde_json::Value> {
        let path = format!("/org/{}/member/{}", segment(org_id), segment(user_id));
        self.call("remove org user", Method::DELETE, &path, NO_BODY)
    }

    pub fn leave_org(&self, org_id: &str) -> Outcome<serde_json::Value> {
        let path = format!("/org/{}/member", segment(org_id));
        self.call("leave org", Method::DELETE, &path, NO_BODY)
    }

    pub fn set_org_config(&self, org_id: &str, key: &str, value: serde_json::Value) -> Outcome<serde_json::Value> {
        let path = format!("/org/{}/config", segment(org_id));
        let body = OrgConfigRequest {
            key: key.to_string(),
            value,
        };
        self.call("set org config", Method::PATCH, &path, Some(&body))
    }

    pub fn can_org_user(&self, org_id: &str, user_id: &str, action: &str, resource: &str) -> Outcome<CanResult> {
        let path = format!("/org/{}/user/{}/can", segment(org_id), segment(user_id));
        let query = [("action", action.to_string()), ("resource", resource.to_string())];
        self.call_with_query("check org user permission", Method::GET, &path, &query, NO_BODY)
    }

    pub fn list_org_roles(&self, org_id: &str) -> Outcome<Vec<Role>> {
        let path = format!("/org/{}/roles", segment(org_id));
        self.call("list org roles", Method::GET, &path, NO_BODY)
    }

    pub fn create_org_role(&self, org_id: &str, name: &str, permissions: Vec<Permission>) -> Outcome<RoleRef> {
        let path = format!("/org/{}/role", segment(org_id));
        let body = CreateRoleRequest {
            name: name.to_string(),
            permissions,
        };
        self.call("create org role", Method::POST, &path, Some(&body))
    }

    pub fn delete_org_role(&self, org_id: &str, role_id: &str) -> Outcome<serde_json::Value> {
        let path = format!("/org/{}/role/{}", segment(org_id), segment(role_id));
        self.call("delete org role", Method::DELETE, &path, NO_BODY)
    }

    pub fn assign_org_role(&self, org_id: &str, user_id: &str, role_id: &str) -> Outcome<serde_json::Value> {
        let path = format!("/org/{}/member/{}/role", segment(org_id), segment(user_id));
        let body = AssignRoleRequest {
            role_id: role_id.to_string(),
        };
        self.call("assign org role", Method::POST, &path, Some(&body))
    }

    pub fn list_invitations(&self) -> Outcome<Invitations> {
        self.call("list invitations", Method::GET, "/invitations", NO_BODY)
    }

    pub fn respond_org_invitation(&self, invitation_id: &str, accept: bool) -> Outcome<InvitationOutcome> {
        let path = format!("/org-invitation/{}", segment(invitation_id));
        let body = RespondInvitationRequest { accept };
        self.call("respond to org invitation", Method::PATCH, &path, Some(&body))
    }

    pub fn respond_template_invitation(&self, invitation_id: &str, accept: bool) -> Outcome<InvitationOutcome> {
        let path = format!("/template-invitation/{}", segment(invitation_id));
        let body = RespondInvitationRequest { accept };
        self.call("respond to template invitation", Method::PATCH, &path, Some(&body))
    }
}
