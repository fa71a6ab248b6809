use serde_json::json;

use super::*;
use crate::config::parse_bool;
use crate::controller::Org;
use crate::render::VERBS;
use crate::select::select_org_invitation;

pub(super) fn create() -> Node {
    Node::leaf("org", "Create an organization", run_create)
        .alias("organization")
        .flags(
            FlagSet::new()
                .string("org-code", None, "", "short unique code, e.g. acme")
                .string("org-name", None, "", "display name"),
        )
}

pub(super) fn get() -> Node {
    Node::leaf("org", "Show an organization", run_get)
        .alias("organization")
        .flags(org_flag(FlagSet::new()))
}

pub(super) fn list() -> Node {
    Node::leaf("orgs", "List organizations you belong to", run_list).alias("organizations")
}

pub(super) fn join() -> Node {
    Node::leaf("org", "Accept an invitation to an organization", run_join)
        .alias("organization")
        .flags(yes_flag(org_flag(FlagSet::new())))
}

pub(super) fn leave() -> Node {
    Node::leaf("org", "Leave an organization", run_leave)
        .alias("organization")
        .flags(yes_flag(org_flag(FlagSet::new())))
}

pub(super) fn can_user() -> Node {
    Node::leaf("user", "Check whether a member may perform an action", run_can)
        .args(Arity::Exact(2), "<ACTION> <RESOURCE>")
        .long("ACTION is one of create, view, update, delete, execute or manage.")
        .flags(org_flag(FlagSet::new()).string("member", None, "", "member email or user id"))
}

pub(super) fn set_approvals() -> Node {
    Node::leaf("approvals", "Require approvals for automations", run_set_approvals)
        .args(Arity::Exact(1), "<on|off>")
        .flags(org_flag(FlagSet::new()))
}

fn membership(org: &Org) -> String {
    org.member_type.clone().unwrap_or_else(|| "-".to_string())
}

fn run_create(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let client = require_auth(ctx)?;
    let mut code = ctx.string("org-code")?;
    let mut name = ctx.string("org-name")?;
    complete(
        ctx,
        "Create organization",
        &mut [
            (Ask::text("org-code", "Code"), &mut code),
            (Ask::text("org-name", "Name"), &mut name),
        ],
    )?;

    let created = client.create_org(code.trim(), name.trim())?;
    if json {
        return ctx.emit_json(&created);
    }
    ctx.success(&format!("Created organization {} ({})", created.code, created.id))
}

fn run_get(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org = select_org(ctx.ui(), &client, &raw)?;
    let clock = ctx.clock(false);
    let approvals = if org.requires_approvals { "required" } else { "not required" };
    render_record(
        ctx,
        &org,
        &[
            ("id", org.id.clone()),
            ("code", org.code.clone()),
            ("name", or_dash(&org.name)),
            ("membership", membership(&org)),
            ("approvals", approvals.to_string()),
            ("created", clock.format_opt(org.created_at.as_deref())),
        ],
    )
}

fn run_list(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let orgs = client.list_orgs()?;
    let clock = ctx.clock(false);
    render_list(
        ctx,
        &orgs,
        &["id", "code", "name", "membership", "created"],
        |o| {
            vec![
                Cell::from(&o.id),
                Cell::from(&o.code),
                Cell::from(&o.name),
                Cell::from(membership(o)),
                Cell::from(clock.format_opt(o.created_at.as_deref())),
            ]
        },
    )
}

fn run_join(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let invitation = select_org_invitation(ctx.ui(), &client, &raw)?;
    let role = if invitation.is_admin { "an administrator" } else { "a member" };
    confirm(
        ctx,
        "Join organization",
        &format!(
            "Join {} ({}) as {}?",
            invitation.org_name, invitation.org_code, role
        ),
    )?;

    let outcome = client.respond_org_invitation(&invitation.id, true)?;
    if json {
        return ctx.emit_json(&outcome);
    }
    ctx.success(&format!("Joined {}", invitation.org_code))
}

fn run_leave(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org = select_org(ctx.ui(), &client, &raw)?;
    confirm(ctx, "Leave organization", &format!("Leave {} ({})?", org.name, org.code))?;

    match client.leave_org(&org.id) {
        Ok(_) => ctx.success(&format!("Left {}", org.code)),
        Err(rejection) => {
            let hint = match rejection.code() {
                Some(ErrorCode::OrgRequiresOneAdmin) => format!(
                    "You are the last administrator of {}; make another member an administrator first",
                    org.code
                ),
                Some(ErrorCode::LastUserInResource) => format!(
                    "You are the last member of {}; an organization cannot be left empty",
                    org.code
                ),
                _ => return Err(rejection.into()),
            };
            Err(anyhow::Error::new(rejection).context(hint))
        }
    }
}

fn run_can(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let action = ctx.args[0].to_ascii_lowercase();
    let resource = ctx.args[1].clone();
    if !VERBS.contains(&action.as_str()) {
        bail!("unknown action {:?}; expected one of {}", action, VERBS.join(", "));
    }

    let client = require_auth(ctx)?;
    let raw_org = ctx.string("org")?;
    let raw_member = ctx.string("member")?;
    let org = select_org(ctx.ui(), &client, &raw_org)?;
    let user = select_user(ctx.ui(), &client, &org.id, &raw_member)?;
    let result = client.can_org_user(&org.id, &user.user_id, &action, &resource)?;
    if json {
        return ctx.emit_json(&result);
    }
    if result.allowed {
        ctx.success(&format!("{} can {} {} in {}", user.email, action, resource, org.code))
    } else {
        ctx.boxed(
            Tone::Warn,
            &format!("{} cannot {} {} in {}", user.email, action, resource, org.code),
        )
    }
}

fn run_set_approvals(ctx: &mut Ctx<'_>) -> Result<()> {
    let Some(enabled) = parse_bool(&ctx.args[0]) else {
        bail!("expected on or off, received {:?}", ctx.args[0]);
    };
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org = select_org(ctx.ui(), &client, &raw)?;
    client.set_org_config(&org.id, "requiresApprovals", json!(enabled))?;
    let state = if enabled { "now require" } else { "no longer require" };
    ctx.success(&format!("Automations in {} {} approval", org.code, state))
}
