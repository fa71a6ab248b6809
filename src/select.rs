//! Resolves the resource a command acts on, from a flag value or by asking.

use anyhow::{Result, bail};

use crate::controller::{
    Client, ErrorCode, Org, OrgInvitation, OrgUser, Role, Template, TemplateInvitation, Token,
};
use crate::tui::{self, Choice, Driver, FilterList, Mode};

/// What is being selected, for messages and the list title.
struct Target<'a> {
    noun: &'static str,
    flag: &'static str,
    raw: &'a str,
}

/// Picks one of `candidates`.
///
/// A `raw` value matching a candidate wins. Otherwise the candidates are
/// offered in a filterable list, which needs a terminal; a single candidate
/// is taken implicitly only when no `raw` value was given.
fn choose<T>(
    ui: &mut dyn Driver,
    target: Target<'_>,
    mut candidates: Vec<T>,
    matches: impl Fn(&T, &str) -> bool,
    choice: impl Fn(&T) -> Choice,
) -> Result<T> {
    let Target { noun, flag, raw } = target;
    if !raw.is_empty() {
        if let Some(i) = candidates.iter().position(|c| matches(c, raw)) {
            return Ok(candidates.swap_remove(i));
        }
        tracing::debug!(noun, raw, "no candidate matches; asking");
    }
    match candidates.len() {
        0 => bail!("no {}s available", noun),
        1 if raw.is_empty() => {
            tracing::debug!(noun, "single candidate selected implicitly");
            return Ok(candidates.swap_remove(0));
        }
        _ => {}
    }
    if !ui.interactive() {
        if !raw.is_empty() {
            bail!("no {} matches {:?}; check the value of --{}", noun, raw, flag);
        }
        bail!(
            "{} {}s are available; pass --{} to choose one",
            candidates.len(),
            noun,
            flag
        );
    }

    let choices: Vec<Choice> = candidates.iter().map(&choice).collect();
    let mut list = FilterList::new(&format!("Select {}", noun), choices);
    tui::run(ui, &mut list, Mode::Fullscreen)?;
    let Some(value) = list.value().map(str::to_string) else {
        bail!("no {} selected", noun);
    };
    match candidates.iter().position(|c| choice(c).value == value) {
        Some(i) => Ok(candidates.swap_remove(i)),
        None => bail!("no {} selected", noun),
    }
}

pub fn select_org(ui: &mut dyn Driver, client: &Client, raw: &str) -> Result<Org> {
    if !raw.is_empty() {
        match client.get_org(raw) {
            Ok(org) => return Ok(org),
            Err(rejection) if rejection.code() == Some(ErrorCode::NotFound) => {
                tracing::debug!(org = raw, "organization lookup missed; listing");
            }
            Err(rejection) => return Err(rejection.into()),
        }
    }
    let orgs = client.list_orgs()?;
    choose(
        ui,
        Target {
            noun: "organization",
            flag: "org",
            raw,
        },
        orgs,
        |o, raw| o.id == raw || o.code.eq_ignore_ascii_case(raw),
        |o| Choice::new(format!("{} ({})", o.name, o.code), o.id.clone()),
    )
}

pub fn select_user(ui: &mut dyn Driver, client: &Client, org_id: &str, raw: &str) -> Result<OrgUser> {
    let users = client.list_org_users(org_id)?;
    choose(
        ui,
        Target {
            noun: "member",
            flag: "member",
            raw,
        },
        users,
        |u, raw| u.user_id == raw || u.email.eq_ignore_ascii_case(raw),
        |u| Choice::new(u.email.clone(), u.user_id.clone()).describe(u.member_type.clone()),
    )
}

pub fn select_role(ui: &mut dyn Driver, client: &Client, org_id: &str, raw: &str) -> Result<Role> {
    let roles = client.list_org_roles(org_id)?;
    choose(
        ui,
        Target {
            noun: "role",
            flag: "role",
            raw,
        },
        roles,
        |r, raw| r.id == raw || r.name.eq_ignore_ascii_case(raw),
        |r| Choice::new(r.name.clone(), r.id.clone()),
    )
}

pub fn select_template(ui: &mut dyn Driver, client: &Client, raw: &str) -> Result<Template> {
    if !raw.is_empty() {
        match client.get_template(raw) {
            Ok(template) => return Ok(template),
            Err(rejection) if rejection.code() == Some(ErrorCode::NotFound) => {
                tracing::debug!(template = raw, "template lookup missed; listing");
            }
            Err(rejection) => return Err(rejection.into()),
        }
    }
    let templates = client.list_templates()?;
    choose(
        ui,
        Target {
            noun: "template",
            flag: "template",
            raw,
        },
        templates,
        |t, raw| t.id == raw || t.name == raw,
        |t| {
            let c = Choice::new(format!("{} v{}", t.name, t.version), t.id.clone());
            match &t.description {
                Some(d) if !d.is_empty() => c.describe(d.clone()),
                _ => c,
            }
        },
    )
}

pub fn select_token(ui: &mut dyn Driver, client: &Client, raw: &str) -> Result<Token> {
    let tokens = client.list_tokens()?;
    choose(
        ui,
        Target {
            noun: "token",
            flag: "token",
            raw,
        },
        tokens,
        |t, raw| t.id == raw || t.name == raw,
        |t| Choice::new(t.name.clone(), t.id.clone()),
    )
}

/// Picks a pending organization invitation; `raw` matches the org id or code.
pub fn select_org_invitation(ui: &mut dyn Driver, client: &Client, raw: &str) -> Result<OrgInvitation> {
    let invitations = client.list_invitations()?.org_invitations;
    choose(
        ui,
        Target {
            noun: "organization invitation",
            flag: "org",
            raw,
        },
        invitations,
        |i, raw| i.id == raw || i.org_id == raw || i.org_code.eq_ignore_ascii_case(raw),
        |i| {
            Choice::new(format!("{} ({})", i.org_name, i.org_code), i.id.clone())
                .describe(format!("invited by {}", i.inviter_email))
        },
    )
}

/// Picks a pending template invitation; `raw` matches the template id or name.
pub fn select_template_invitation(
    ui: &mut dyn Driver,
    client: &Client,
    raw: &str,
) -> Result<TemplateInvitation> {
    let invitations = client.list_invitations()?.template_invitations;
    choose(
        ui,
        Target {
            noun: "template invitation",
            flag: "template",
            raw,
        },
        invitations,
        |i, raw| i.id == raw || i.template_id == raw || i.template_name == raw,
        |i| {
            Choice::new(i.template_name.clone(), i.id.clone())
                .describe(format!("invited by {}", i.inviter_email))
        },
    )
}

#[cfg(test)]
#[path = "tests/select_tests.rs"]
mod tests;
