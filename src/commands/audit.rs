use time::OffsetDateTime;

use super::*;
use crate::controller::{AuditLog, Order};
use crate::render::{describe_audit_log, to_rfc3339};

const MAX_LIMIT: i64 = 1000;

pub(super) fn list() -> Node {
    Node::leaf("audit-logs", "Show recent activity", run_list)
        .alias("audit")
        .flags(
            FlagSet::new()
                .integer("limit", Some('l'), 20, "number of entries to fetch")
                .string(
                    "till",
                    None,
                    "",
                    "newest timestamp to include, e.g. 2024-01-01T00:00:00 (default now)",
                )
                .string("order", None, "desc", "desc for newest first, asc for oldest first")
                .bool("utc", None, false, "show and read timestamps in UTC"),
        )
}

fn parse_order(raw: &str) -> Result<Order> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "desc" => Ok(Order::Desc),
        "asc" => Ok(Order::Asc),
        other => bail!("unsupported --order {:?} (expected asc or desc)", other),
    }
}

fn run_list(ctx: &mut Ctx<'_>) -> Result<()> {
    let json = ctx.json()?;
    let clock = ctx.clock(ctx.config.boolean("utc")?);
    let limit = ctx.config.integer("limit")?;
    if !(1..=MAX_LIMIT).contains(&limit) {
        bail!("--limit must be between 1 and {}", MAX_LIMIT);
    }
    let order = parse_order(&ctx.string("order")?)?;
    let till = ctx.string("till")?;
    let cursor = if till.trim().is_empty() {
        OffsetDateTime::now_utc()
    } else {
        clock.parse(till.trim())?
    };
    let cursor = to_rfc3339(cursor)?;

    let client = require_auth(ctx)?;
    let logs = client.list_audit_logs(&cursor, limit as u32, order)?;
    if json {
        return ctx.emit_json(&logs);
    }
    if logs.is_empty() {
        return ctx.boxed(Tone::Info, &format!("No audit log entries at or before {}", cursor));
    }
    let timestamp = clock.label("timestamp");
    let table = Table::new(&[timestamp.as_str(), "status", "description", "source ip"]).render(
        &logs,
        |log: &AuditLog| {
            vec![
                Cell::from(clock.format(&log.created_at)),
                Cell::from(&log.status),
                Cell::from(describe_audit_log(log)),
                Cell::from(log.src_ip.clone()),
            ]
        },
    );
    ctx.print(&table)
}
