mod common;

use anyhow::Result;
use serde_json::{Value, json};

use common::{Fixture, Home, detached, ok};

fn signed_in() -> Result<(Fixture, Home)> {
    let fixture = Fixture::start()?;
    fixture.accept_sessions();
    let home = Home::new();
    home.write_session("T0");
    Ok((fixture, home))
}

#[test]
fn templates_as_json_keep_the_controller_ids() -> Result<()> {
    let (fixture, home) = signed_in()?;
    fixture.on(
        "GET",
        "/templates",
        ok(json!([
            { "id": "t1", "name": "deploy", "version": 3, "description": "ship it" },
            { "id": "t2", "name": "rollback", "version": 1 }
        ])),
    );

    let out = home.run(&fixture, detached(), &["list", "templates", "--output=json"]);

    assert_eq!(out.code, 0, "stderr:\n{}", out.stderr);
    let parsed: Value = serde_json::from_str(&out.stdout)?;
    let items = parsed.as_array().expect("a JSON array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "t1");
    assert_eq!(items[1]["id"], "t2");
    assert_eq!(items[0]["version"], 3);
    Ok(())
}

#[test]
fn audit_logs_in_utc_render_one_row_per_entry() -> Result<()> {
    let (fixture, home) = signed_in()?;
    fixture.on(
        "GET",
        "/audit-logs",
        ok(json!([
            {
                "entityId": "u1", "entityType": "user", "verb": "create",
                "resourceId": "o1", "resourceType": "org", "status": "success",
                "srcIp": "10.0.0.1", "createdAt": "2023-12-31T23:30:00Z"
            },
            {
                "entityId": "u1", "entityType": "user", "verb": "login",
                "resourceType": "session", "status": "failed",
                "createdAt": "2023-12-31T22:15:00Z"
            }
        ])),
    );

    let out = home.run(
        &fixture,
        detached(),
        &["list", "audit-logs", "--utc", "--limit=2", "--till=2024-01-01T00:00:00"],
    );

    assert_eq!(out.code, 0, "stderr:\n{}", out.stderr);
    assert!(out.stdout.contains("timestamp (utc)"), "{}", out.stdout);
    let rows = out.stdout.lines().filter(|l| l.contains("Dec 31 2023")).count();
    assert_eq!(rows, 2, "{}", out.stdout);

    let hit = &fixture.hits_to("GET", "/audit-logs")[0];
    let query = hit.query.clone().unwrap_or_default();
    assert!(query.contains("cursor=2024-01-01T00%3A00%3A00Z"), "{query}");
    assert!(query.contains("limit=2"), "{query}");
    assert!(query.contains("order=desc"), "{query}");
    Ok(())
}

#[test]
fn audit_limit_out_of_range_is_rejected_before_any_request() -> Result<()> {
    let (fixture, home) = signed_in()?;

    let out = home.run(&fixture, detached(), &["list", "audit-logs", "--limit=0"]);

    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("--limit"), "{}", out.stderr);
    assert!(fixture.hits().is_empty());
    Ok(())
}

#[test]
fn empty_listing_says_so() -> Result<()> {
    let (fixture, home) = signed_in()?;
    fixture.on("GET", "/tokens", ok(json!([])));

    let out = home.run(&fixture, detached(), &["list", "tokens"]);

    assert_eq!(out.code, 0, "stderr:\n{}", out.stderr);
    assert!(out.stdout.contains("Nothing to show"), "{}", out.stdout);
    Ok(())
}

#[test]
fn record_output_as_json_is_the_dto() -> Result<()> {
    let (fixture, home) = signed_in()?;
    fixture.on(
        "GET",
        "/org/acme",
        ok(json!({ "id": "o1", "code": "acme", "name": "Acme", "requiresApprovals": true })),
    );

    let out = home.run(&fixture, detached(), &["get", "org", "--org=acme", "-o", "json"]);

    assert_eq!(out.code, 0, "stderr:\n{}", out.stderr);
    let parsed: Value = serde_json::from_str(&out.stdout)?;
    assert_eq!(parsed["id"], "o1");
    assert_eq!(parsed["requiresApprovals"], true);
    Ok(())
}
