use std::fs;

use super::*;
use crate::controller::Template;
use crate::select::select_template_invitation;

pub(super) fn create() -> Node {
    Node::leaf("template", "Submit an automation template", run_create)
        .long("Submitting a template whose name already exists creates a new version of it.")
        .flags(
            org_flag(FlagSet::new()).string(
                "template-file",
                Some('f'),
                "",
                "path to the YAML template document",
            ),
        )
}

pub(super) fn create_user() -> Node {
    Node::leaf("template-user", "Invite a user to collaborate on a template", run_create_user)
        .flags(
            FlagSet::new()
                .string("template", None, "", "template name or id")
                .string("email", None, "", "email address to invite")
                .bool("can-update", None, false, "allow the user to update the template")
                .bool("can-delete", None, false, "allow the user to delete the template"),
        )
}

pub(super) fn get() -> Node {
    Node::leaf("template", "Show a template", run_get).flags(template_flag())
}

pub(super) fn list() -> Node {
    Node::leaf("templates", "List templates you can access", run_list)
}

pub(super) fn update() -> Node {
    Node::leaf("template", "Change a template's description", run_update)
        .flags(template_flag().string("description", None, "", "new description"))
}

pub(super) fn remove() -> Node {
    Node::leaf("template", "Delete a template", run_remove).flags(yes_flag(template_flag()))
}

pub(super) fn join() -> Node {
    Node::leaf("template", "Accept an invitation to a template", run_join).flags(yes_flag(template_flag()))
}

fn template_flag() -> FlagSet {
    FlagSet::new().string("template", None, "", "template name or id")
}

/// Reads the document and checks that it is YAML before it is sent.
fn read_document(path: &str) -> Result<String> {
    let document = fs::read_to_string(path).with_context(|| format!("read template file {}", path))?;
    serde_yaml::from_str::<serde_yaml::Value>(&document)
        .with_context(|| format!("template file {} is not valid YAML", path))?;
    Ok(document)
}

fn run_create(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let mut path = ctx.string("template-file")?;
    complete(
        ctx,
        "Submit template",
        &mut [(Ask::text("template-file", "Template file"), &mut path)],
    )?;
    let document = read_document(path.trim())?;

    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org_id = if raw.is_empty() {
        None
    } else {
        Some(select_org(ctx.ui(), &client, &raw)?.id)
    };
    let submitted = client.submit_template(&document, org_id)?;
    if json {
        return ctx.emit_json(&submitted);
    }
    ctx.success(&format!(
        "Submitted template {} version {} ({})",
        submitted.name, submitted.version, submitted.id
    ))
}

fn run_create_user(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let can_update = ctx.config.boolean("can-update")?;
    let can_delete = ctx.config.boolean("can-delete")?;
    let client = require_auth(ctx)?;
    let raw = ctx.string("template")?;
    let template = select_template(ctx.ui(), &client, &raw)?;
    let mut email = ctx.string("email")?;
    complete(ctx, "Invite user", &mut [(Ask::email("email", "Email"), &mut email)])?;

    let invitation = client.invite_template_user(&template.id, email.trim(), can_update, can_delete)?;
    if json {
        return ctx.emit_json(&invitation);
    }
    ctx.success(&format!("Invited {} to template {}", email.trim(), template.name))
}

fn run_get(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("template")?;
    let template = select_template(ctx.ui(), &client, &raw)?;
    let clock = ctx.clock(false);
    render_record(
        ctx,
        &template,
        &[
            ("id", template.id.clone()),
            ("name", template.name.clone()),
            ("version", template.version.to_string()),
            ("description", or_dash(template.description.as_deref().unwrap_or_default())),
            ("created by", or_dash(template.created_by.as_deref().unwrap_or_default())),
            ("created", clock.format_opt(template.created_at.as_deref())),
            ("updated", clock.format_opt(template.last_updated_at.as_deref())),
        ],
    )
}

fn run_list(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let templates = client.list_templates()?;
    let clock = ctx.clock(false);
    render_list(
        ctx,
        &templates,
        &["id", "name", "version", "description", "updated"],
        |t: &Template| {
            vec![
                Cell::from(&t.id),
                Cell::from(&t.name),
                Cell::from(t.version),
                Cell::from(t.description.clone()),
                Cell::from(clock.format_opt(t.last_updated_at.as_deref().or(t.created_at.as_deref()))),
            ]
        },
    )
}

fn run_update(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let client = require_auth(ctx)?;
    let raw = ctx.string("template")?;
    let template = select_template(ctx.ui(), &client, &raw)?;
    let mut description = ctx.string("description")?;
    complete(
        ctx,
        "Update template",
        &mut [(Ask::text("description", "Description"), &mut description)],
    )?;

    let updated = client.update_template(&template.id, description.trim())?;
    if json {
        return ctx.emit_json(&updated);
    }
    ctx.success(&format!("Updated the description of {}", template.name))
}

fn run_remove(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("template")?;
    let template = select_template(ctx.ui(), &client, &raw)?;
    confirm(
        ctx,
        "Delete template",
        &format!("Delete template {} and all of its versions?", template.name),
    )?;
    match client.delete_template(&template.id) {
        Ok(_) => ctx.success(&format!("Deleted template {}", template.name)),
        Err(rejection) if rejection.code() == Some(ErrorCode::LastManagerInResource) => {
            Err(anyhow::Error::new(rejection).context(format!(
                "You are the last manager of {}; give another collaborator delete rights first",
                template.name
            )))
        }
        Err(rejection) => Err(rejection.into()),
    }
}

fn run_join(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let client = require_auth(ctx)?;
    let raw = ctx.string("template")?;
    let invitation = select_template_invitation(ctx.ui(), &client, &raw)?;
    confirm(
        ctx,
        "Join template",
        &format!(
            "Collaborate on {} at the invitation of {}?",
            invitation.template_name, invitation.inviter_email
        ),
    )?;
    let outcome = client.respond_template_invitation(&invitation.id, true)?;
    if json {
        return ctx.emit_json(&outcome);
    }
    ctx.success(&format!("Joined template {}", invitation.template_name))
}
