use super::*;
use crate::controller::{Auth, Client};

fn admin_flags() -> FlagSet {
    FlagSet::new()
        .string("admin-username", None, "", "controller administrator username")
        .string("admin-password", None, "", "controller administrator password")
}

pub(super) fn node() -> Node {
    Node::group("initialize", "Bootstrap a new controller")
        .alias("init")
        .child(
            Node::leaf("controller", "Prepare the controller's storage", run_controller)
                .flags(admin_flags()),
        )
        .child(
            Node::leaf("user", "Create the first user account", run_user).flags(
                admin_flags()
                    .string("email", None, "", "email address of the first user")
                    .string("password", None, "", "password of the first user"),
            ),
        )
}

/// Builds a client that authenticates with the administrator credentials.
/// Missing credentials and missing `extra` values are asked for together.
fn admin_client<'a>(
    ctx: &mut Ctx<'_>,
    title: &str,
    extra: Vec<(Ask, &'a mut String)>,
) -> Result<Client> {
    let mut username = ctx.string("admin-username")?;
    let mut password = ctx.string("admin-password")?;
    let mut fields = vec![
        (Ask::text("admin-username", "Admin username"), &mut username),
        (Ask::password("admin-password", "Admin password"), &mut password),
    ];
    fields.extend(extra);
    complete(ctx, title, &mut fields)?;
    drop(fields);
    basic_client(ctx, username, password)
}

fn basic_client(ctx: &Ctx<'_>, username: String, password: String) -> Result<Client> {
    Ok(Client::new(
        &ctx.controller_url()?,
        &ctx.client_id(),
        Auth::Basic { username, password },
    )?)
}

fn run_controller(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let client = admin_client(ctx, "Controller administrator", Vec::new())?;
    let init = client.initialize_controller()?;
    if json {
        return ctx.emit_json(&init);
    }
    let version = init.version.as_deref().unwrap_or("unknown version");
    ctx.success(&format!("Controller initialized ({})", version))
}

fn run_user(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let mut email = ctx.string("email")?;
    let mut password = ctx.string("password")?;
    let client = admin_client(
        ctx,
        "Create the first user",
        vec![
            (Ask::email("email", "Email"), &mut email),
            (Ask::password("password", "Password"), &mut password),
        ],
    )?;
    let user = client.create_initial_user(&email, &password)?;
    if json {
        return ctx.emit_json(&user);
    }
    ctx.success(&format!("Created the first user {} ({})", user.email, user.id))
}
