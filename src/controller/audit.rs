use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

impl Client {
    /// Entries at or before `cursor` (RFC 3339), newest first unless `Asc`.
    pub fn list_audit_logs(&self, cursor: &str, limit: u32, order: Order) -> Outcome<Vec<AuditLog>> {
        let query = [
            ("cursor", cursor.to_string()),
            ("limit", limit.to_string()),
            ("order", order.as_str().to_string()),
        ];
        self.call_with_query("list audit logs", Method::GET, "/audit-logs", &query, NO_BODY)
    }
}
