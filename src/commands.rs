//! The `opsicle` command tree.
//!
//! Each submodule owns one area of the controller API and hands the tree
//! the leaves for it. Helpers shared by several leaves live here.

use anyhow::{Context, Result, bail};

use crate::auth::require_auth;
use crate::cli::{Arity, Ctx, Node};
use crate::config::FlagSet;
use crate::controller::ErrorCode;
use crate::render::emit_fields;
use crate::select::{select_org, select_role, select_template, select_token, select_user};
use crate::tui::{self, Cell, Dialog, FieldKind, Form, Mode, Table, Tone, Validator};

mod audit;
mod initialize;
mod members;
mod orgs;
mod roles;
pub mod session;
mod start;
mod templates;
mod tokens;
mod utils;

pub fn tree() -> Node {
    Node::group("opsicle", "Operate an Opsicle automation controller")
        .long(
            "Every flag can also be set through an environment variable (the flag name \
             uppercased with '-' replaced by '_') or in ~/.opsicle/config.yaml.",
        )
        .child(session::login())
        .child(session::logout())
        .child(session::register())
        .child(session::verify())
        .child(initialize::node())
        .child(
            Node::group("create", "Create a resource")
                .alias("new")
                .child(orgs::create())
                .child(members::create())
                .child(roles::create())
                .child(tokens::create())
                .child(templates::create())
                .child(templates::create_user()),
        )
        .child(
            Node::group("get", "Show one resource")
                .child(orgs::get())
                .child(templates::get()),
        )
        .child(
            Node::group("list", "List resources")
                .alias("ls")
                .child(orgs::list())
                .child(members::list())
                .child(roles::list())
                .child(tokens::list())
                .child(templates::list())
                .child(audit::list()),
        )
        .child(
            Node::group("update", "Change a resource")
                .child(members::update())
                .child(templates::update()),
        )
        .child(
            Node::group("remove", "Delete a resource")
                .alias("rm")
                .alias("delete")
                .child(members::remove())
                .child(roles::remove())
                .child(tokens::remove())
                .child(templates::remove()),
        )
        .child(
            Node::group("join", "Accept a pending invitation")
                .child(orgs::join())
                .child(templates::join()),
        )
        .child(Node::group("leave", "Leave a resource").child(orgs::leave()))
        .child(
            Node::group("can", "Check permissions")
                .child(Node::group("org", "Check permissions in an organization").child(orgs::can_user())),
        )
        .child(
            Node::group("set", "Change settings")
                .child(Node::group("org", "Change organization settings").child(orgs::set_approvals())),
        )
        .child(utils::node())
        .child(start::node())
}

fn org_flag(flags: FlagSet) -> FlagSet {
    flags.string("org", None, "", "organization code or id")
}

fn yes_flag(flags: FlagSet) -> FlagSet {
    flags.bool("yes", Some('y'), false, "skip the confirmation prompt")
}

/// An input that can be supplied by flag or asked for in a form.
struct Ask {
    id: &'static str,
    label: &'static str,
    kind: FieldKind,
    validators: &'static [Validator],
}

impl Ask {
    const fn text(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::String,
            validators: &[Validator::Required],
        }
    }

    const fn email(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::String,
            validators: &[Validator::Required, Validator::Email],
        }
    }

    const fn password(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::Password,
            validators: &[Validator::Required],
        }
    }
}

/// Asks for every empty value in one form. Values given as flags are
/// checked against the same validators instead.
fn complete(ctx: &mut Ctx<'_>, title: &str, fields: &mut [(Ask, &mut String)]) -> Result<()> {
    let mut missing = Vec::new();
    for (i, (ask, value)) in fields.iter().enumerate() {
        if value.is_empty() {
            missing.push(i);
            continue;
        }
        for v in ask.validators {
            if let Err(problem) = v.check(value) {
                bail!("invalid --{}: {}", ask.id, problem);
            }
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    if !ctx.interactive() {
        let names: Vec<String> = missing.iter().map(|&i| format!("--{}", fields[i].0.id)).collect();
        bail!("missing {}; pass them as flags or run in a terminal", names.join(", "));
    }

    let mut form = Form::new(title);
    for &i in &missing {
        let ask = &fields[i].0;
        form = form.field(ask.id, ask.label, ask.kind, ask.validators);
    }
    tui::run(ctx.ui(), &mut form, Mode::Fullscreen)?;
    for &i in &missing {
        let (ask, value) = &mut fields[i];
        **value = form.value(ask.id).unwrap_or_default().to_string();
    }
    Ok(())
}

/// Asks before a destructive step unless `--yes` was given.
fn confirm(ctx: &mut Ctx<'_>, title: &str, question: &str) -> Result<()> {
    if ctx.config.boolean("yes")? {
        return Ok(());
    }
    if !ctx.interactive() {
        bail!("{} Pass --yes to confirm without a prompt", question);
    }
    let mut dialog = Dialog::confirm(title, question).labels("Yes", "No");
    let mode = dialog.mode();
    tui::run(ctx.ui(), &mut dialog, mode)
}

/// Prints `items` as JSON or as a table.
fn render_list<T, F>(ctx: &mut Ctx<'_>, items: &[T], headers: &[&str], row: F) -> Result<()>
where
    T: serde::Serialize,
    F: FnMut(&T) -> Vec<Cell>,
{
    if ctx.json()? {
        return ctx.emit_json(items);
    }
    if items.is_empty() {
        return ctx.boxed(Tone::Info, "Nothing to show");
    }
    let table = Table::new(headers).render(items, row);
    ctx.print(&table)
}

/// Prints one record as JSON or as aligned fields.
fn render_record<T: serde::Serialize>(ctx: &mut Ctx<'_>, record: &T, fields: &[(&str, String)]) -> Result<()> {
    if ctx.json()? {
        return ctx.emit_json(record);
    }
    emit_fields(ctx.out(), fields)
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
