use super::*;
use crate::controller::{Permission, Role};
use crate::render::{Actions, VERBS};
use crate::tui::{CheckboxGroup, CheckboxItem};

pub(super) fn create() -> Node {
    Node::leaf("role", "Create a role in an organization", run_create)
        .long(
            "Actions are create, view, update, delete, execute and manage. Without \
             --allow or --deny the allowed actions are picked from a list.",
        )
        .flags(
            org_flag(FlagSet::new())
                .string("role-name", None, "", "name of the new role")
                .string("resource", None, "", "resource the permission applies to, e.g. templates")
                .string_list("allow", None, &[], "actions to allow (comma separated)")
                .string_list("deny", None, &[], "actions to deny (comma separated)"),
        )
}

pub(super) fn list() -> Node {
    Node::leaf("roles", "List the roles of an organization", run_list).flags(org_flag(FlagSet::new()))
}

pub(super) fn remove() -> Node {
    Node::leaf("role", "Delete a role", run_remove).flags(yes_flag(
        org_flag(FlagSet::new()).string("role", None, "", "role name or id"),
    ))
}

fn run_create(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let mut allows = Actions::from_verbs(ctx.config.list("allow")?)?;
    let denys = Actions::from_verbs(ctx.config.list("deny")?)?;
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org = select_org(ctx.ui(), &client, &raw)?;

    let mut name = ctx.string("role-name")?;
    let mut resource = ctx.string("resource")?;
    complete(
        ctx,
        "Create role",
        &mut [
            (Ask::text("role-name", "Role name"), &mut name),
            (Ask::text("resource", "Resource"), &mut resource),
        ],
    )?;

    if allows.is_empty() && denys.is_empty() {
        if !ctx.interactive() {
            bail!("no actions given; pass --allow and/or --deny");
        }
        let items = VERBS.iter().map(|v| CheckboxItem::new(*v, *v)).collect();
        let mut group = CheckboxGroup::new("Allowed actions", items);
        tui::run(ctx.ui(), &mut group, Mode::Fullscreen)?;
        allows = Actions::from_verbs(group.checked_values().as_slice())?;
    }

    let permission = Permission {
        resource: resource.trim().to_string(),
        allows,
        denys,
    };
    let created = client.create_org_role(&org.id, name.trim(), vec![permission])?;
    if json {
        return ctx.emit_json(&created);
    }
    ctx.success(&format!(
        "Created role {} in {} ({})\nallows: {}\ndenies: {}",
        name.trim(),
        org.code,
        created.id,
        allows,
        denys
    ))
}

/// One table row per permission; roles without permissions still get a row.
fn rows(roles: &[Role]) -> Vec<(&Role, Option<&Permission>)> {
    roles
        .iter()
        .flat_map(|r| {
            if r.permissions.is_empty() {
                vec![(r, None)]
            } else {
                r.permissions.iter().map(|p| (r, Some(p))).collect()
            }
        })
        .collect()
}

fn run_list(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org = select_org(ctx.ui(), &client, &raw)?;
    let roles = client.list_org_roles(&org.id)?;
    if ctx.json()? {
        return ctx.emit_json(&roles);
    }
    if roles.is_empty() {
        return ctx.boxed(Tone::Info, &format!("{} has no roles", org.code));
    }
    let table = Table::new(&["id", "name", "resource", "allows", "denies"]).render(
        &rows(&roles),
        |(role, perm)| {
            let (resource, allows, denys) = match perm {
                Some(p) => (p.resource.clone(), p.allows.to_string(), p.denys.to_string()),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            vec![
                Cell::from(&role.id),
                Cell::from(&role.name),
                Cell::from(resource),
                Cell::from(allows),
                Cell::from(denys),
            ]
        },
    );
    ctx.print(&table)
}

fn run_remove(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw_org = ctx.string("org")?;
    let raw_role = ctx.string("role")?;
    let org = select_org(ctx.ui(), &client, &raw_org)?;
    let role = select_role(ctx.ui(), &client, &org.id, &raw_role)?;
    confirm(
        ctx,
        "Delete role",
        &format!("Delete role {} from {}?", role.name, org.code),
    )?;
    client.delete_org_role(&org.id, &role.id)?;
    ctx.success(&format!("Deleted role {} from {}", role.name, org.code))
}

#[cfg(test)]
#[path = "../tests/commands/roles_tests.rs"]
mod tests;
