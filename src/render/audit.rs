use crate::controller::AuditLog;

/// (verb, resource type) → sentence. `{who}` is the acting entity,
/// `{what}` the resource id.
const SENTENCES: &[(&str, &str, &str)] = &[
    ("create", "session", "{who} logged in"),
    ("delete", "session", "{who} logged out"),
    ("create", "user", "{who} registered account {what}"),
    ("verify", "user", "{who} verified their email address"),
    ("create", "org", "{who} created organization {what}"),
    ("update", "org", "{who} updated the configuration of organization {what}"),
    ("delete", "org", "{who} deleted organization {what}"),
    ("invite", "org_user", "{who} invited a user to organization {what}"),
    ("join", "org_user", "{who} joined organization {what}"),
    ("leave", "org_user", "{who} left organization {what}"),
    ("update", "org_user", "{who} changed a membership in organization {what}"),
    ("delete", "org_user", "{who} removed a member from organization {what}"),
    ("create", "org_role", "{who} created role {what}"),
    ("delete", "org_role", "{who} deleted role {what}"),
    ("assign", "org_role", "{who} assigned role {what}"),
    ("create", "token", "{who} created API token {what}"),
    ("delete", "token", "{who} revoked API token {what}"),
    ("create", "template", "{who} submitted template {what}"),
    ("update", "template", "{who} updated template {what}"),
    ("delete", "template", "{who} deleted template {what}"),
    ("invite", "template_user", "{who} invited a user to template {what}"),
    ("join", "template_user", "{who} joined template {what}"),
];

pub fn describe(log: &AuditLog) -> String {
    let who = if log.entity_id.is_empty() {
        format!("an unknown {}", fallback_word(&log.entity_type, "entity"))
    } else {
        format!("{} {}", fallback_word(&log.entity_type, "entity"), log.entity_id)
    };
    let what = log.resource_id.as_deref().unwrap_or("(unknown)");

    let sentence = SENTENCES
        .iter()
        .find(|(verb, kind, _)| {
            verb.eq_ignore_ascii_case(&log.verb) && kind.eq_ignore_ascii_case(&log.resource_type)
        })
        .map(|(_, _, s)| s.replace("{who}", &who).replace("{what}", what));

    let sentence = sentence.unwrap_or_else(|| {
        format!(
            "{} performed '{}' on {} {}",
            who,
            fallback_word(&log.verb, "an action"),
            fallback_word(&log.resource_type, "resource"),
            what
        )
    });
    capitalize(&sentence)
}

fn fallback_word<'a>(s: &'a str, default: &'a str) -> &'a str {
    if s.trim().is_empty() { default } else { s }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
