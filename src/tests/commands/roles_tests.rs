use super::*;

fn role(id: &str, permissions: Vec<Permission>) -> Role {
    Role {
        id: id.to_string(),
        name: format!("role-{id}"),
        permissions,
    }
}

fn permission(resource: &str, allows: &str) -> Permission {
    Permission {
        resource: resource.to_string(),
        allows: allows.parse().unwrap(),
        denys: Actions::NONE,
    }
}

#[test]
fn each_permission_gets_its_own_row() {
    let roles = vec![
        role(
            "r1",
            vec![permission("templates", "view"), permission("automations", "execute")],
        ),
        role("r2", Vec::new()),
    ];
    let rows = rows(&roles);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].0.id, "r1");
    assert_eq!(rows[1].1.map(|p| p.resource.as_str()), Some("automations"));
    assert_eq!(rows[2].0.id, "r2");
    assert!(rows[2].1.is_none());
}
