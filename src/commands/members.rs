use super::*;
use crate::config::Source;
use crate::controller::OrgUser;
use crate::tui::{Choice, Selector};

pub(super) fn create() -> Node {
    Node::leaf("user", "Invite a user into an organization", run_create)
        .alias("member")
        .flags(
            org_flag(FlagSet::new())
                .string("email", None, "", "email address to invite")
                .bool("admin", None, false, "invite as an administrator"),
        )
}

pub(super) fn list() -> Node {
    Node::leaf("users", "List the members of an organization", run_list)
        .alias("members")
        .flags(org_flag(FlagSet::new()))
}

pub(super) fn update() -> Node {
    Node::leaf("user", "Change a member's membership or role", run_update)
        .alias("member")
        .long("Without --admin or --role the new membership type is asked for.")
        .flags(
            org_flag(FlagSet::new())
                .string("member", None, "", "member email or user id")
                .string("role", None, "", "role name or id to assign")
                .bool("admin", None, false, "make the member an administrator (false demotes)"),
        )
}

pub(super) fn remove() -> Node {
    Node::leaf("user", "Remove a member from an organization", run_remove)
        .alias("member")
        .flags(yes_flag(
            org_flag(FlagSet::new()).string("member", None, "", "member email or user id"),
        ))
}

fn member_type(admin: bool) -> &'static str {
    if admin { "admin" } else { "member" }
}

fn run_create(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let admin = ctx.config.boolean("admin")?;
    let org = select_org(ctx.ui(), &client, &raw)?;
    let mut email = ctx.string("email")?;
    complete(ctx, "Invite user", &mut [(Ask::email("email", "Email"), &mut email)])?;

    let invitation = client.invite_org_user(&org.id, email.trim(), admin)?;
    if json {
        return ctx.emit_json(&invitation);
    }
    ctx.success(&format!(
        "Invited {} to {} as {}",
        email.trim(),
        org.code,
        member_type(admin)
    ))
}

fn run_list(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org = select_org(ctx.ui(), &client, &raw)?;
    let users = client.list_org_users(&org.id)?;
    let clock = ctx.clock(false);
    render_list(
        ctx,
        &users,
        &["user id", "email", "membership", "roles", "joined"],
        |u: &OrgUser| {
            vec![
                Cell::from(&u.user_id),
                Cell::from(&u.email),
                Cell::from(&u.member_type),
                Cell::from(u.roles.clone()),
                Cell::from(clock.format_opt(u.joined_at.as_deref())),
            ]
        },
    )
}

fn run_update(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw_org = ctx.string("org")?;
    let raw_member = ctx.string("member")?;
    let raw_role = ctx.string("role")?;
    let admin_given = ctx.config.source("admin") != Some(Source::Default);
    let admin = ctx.config.boolean("admin")?;

    let org = select_org(ctx.ui(), &client, &raw_org)?;
    let user = select_user(ctx.ui(), &client, &org.id, &raw_member)?;

    let mut changes = Vec::new();
    let new_type = if admin_given {
        Some(member_type(admin).to_string())
    } else if raw_role.is_empty() {
        if !ctx.interactive() {
            bail!("nothing to update; pass --admin and/or --role");
        }
        let mut selector = Selector::new(
            &format!("Membership of {}", user.email),
            vec![
                Choice::new("Administrator", "admin").describe("can manage members, roles and settings"),
                Choice::new("Member", "member").describe("acts within the roles assigned"),
            ],
        );
        tui::run(ctx.ui(), &mut selector, Mode::Fullscreen)?;
        selector.value().map(str::to_string)
    } else {
        None
    };

    if let Some(new_type) = new_type {
        client.update_org_user(&org.id, &user.user_id, &new_type)?;
        changes.push(format!("membership is now {}", new_type));
    }
    if !raw_role.is_empty() {
        let role = select_role(ctx.ui(), &client, &org.id, &raw_role)?;
        client.assign_org_role(&org.id, &user.user_id, &role.id)?;
        changes.push(format!("role {} assigned", role.name));
    }
    ctx.success(&format!(
        "Updated {} in {}: {}",
        user.email,
        org.code,
        changes.join("; ")
    ))
}

fn run_remove(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw_org = ctx.string("org")?;
    let raw_member = ctx.string("member")?;
    let org = select_org(ctx.ui(), &client, &raw_org)?;
    let user = select_user(ctx.ui(), &client, &org.id, &raw_member)?;
    confirm(
        ctx,
        "Remove member",
        &format!("Remove {} from {}?", user.email, org.code),
    )?;

    match client.remove_org_user(&org.id, &user.user_id) {
        Ok(_) => ctx.success(&format!("Removed {} from {}", user.email, org.code)),
        Err(rejection) => {
            let hint = match rejection.code() {
                Some(ErrorCode::OrgRequiresOneAdmin) | Some(ErrorCode::LastManagerInResource) => {
                    format!(
                        "{} is the last administrator of {}; make another member an administrator first",
                        user.email, org.code
                    )
                }
                Some(ErrorCode::LastUserInResource) => format!(
                    "{} is the last member of {}; an organization cannot be left empty",
                    user.email, org.code
                ),
                _ => return Err(rejection.into()),
            };
            Err(anyhow::Error::new(rejection).context(hint))
        }
    }
}
