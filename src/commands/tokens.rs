use super::*;
use crate::controller::Token;

pub(super) fn create() -> Node {
    Node::leaf("token", "Create an API token", run_create).flags(
        org_flag(FlagSet::new())
            .string("name", None, "", "name to recognise the token by")
            .float("ttl-hours", None, 0.0, "hours until the token expires; 0 never expires"),
    )
}

pub(super) fn list() -> Node {
    Node::leaf("tokens", "List your API tokens", run_list)
}

pub(super) fn remove() -> Node {
    Node::leaf("token", "Revoke an API token", run_remove)
        .flags(yes_flag(FlagSet::new().string("token", None, "", "token name or id")))
}

fn run_create(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let ttl = ctx.config.float("ttl-hours")?;
    if ttl < 0.0 || !ttl.is_finite() {
        bail!("--ttl-hours must be zero or a positive number of hours");
    }
    let client = require_auth(ctx)?;
    let raw = ctx.string("org")?;
    let org_id = if raw.is_empty() {
        None
    } else {
        Some(select_org(ctx.ui(), &client, &raw)?.id)
    };
    let mut name = ctx.string("name")?;
    complete(ctx, "Create API token", &mut [(Ask::text("name", "Token name"), &mut name)])?;

    let ttl_hours = (ttl > 0.0).then_some(ttl);
    let created = client.create_token(name.trim(), org_id, ttl_hours)?;
    if json {
        return ctx.emit_json(&created);
    }
    ctx.success(&format!(
        "Created API token {} ({})\nStore it now; it will not be shown again:\n\n{}",
        created.name, created.id, created.token
    ))
}

fn run_list(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let tokens = client.list_tokens()?;
    let clock = ctx.clock(false);
    render_list(
        ctx,
        &tokens,
        &["id", "name", "org", "created", "expires", "last used"],
        |t: &Token| {
            vec![
                Cell::from(&t.id),
                Cell::from(&t.name),
                Cell::from(t.org_id.clone()),
                Cell::from(clock.format_opt(t.created_at.as_deref())),
                Cell::from(match t.expires_at.as_deref() {
                    Some(at) => clock.format(at),
                    None => "never".to_string(),
                }),
                Cell::from(clock.format_opt(t.last_used_at.as_deref())),
            ]
        },
    )
}

fn run_remove(ctx: &mut Ctx<'_>) -> Result<()> {
    let client = require_auth(ctx)?;
    let raw = ctx.string("token")?;
    let token = select_token(ctx.ui(), &client, &raw)?;
    confirm(
        ctx,
        "Revoke token",
        &format!("Revoke API token {} ({})?", token.name, token.id),
    )?;
    client.delete_token(&token.id)?;
    ctx.success(&format!("Revoked API token {}", token.name))
}
