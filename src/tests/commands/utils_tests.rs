use std::io::Cursor;

use super::*;

/// Canned server bytes on the read side, captured client bytes on the write side.
struct Wire {
    replies: Cursor<Vec<u8>>,
    sent: Vec<u8>,
}

impl Wire {
    fn new(replies: &[u8]) -> Self {
        Self {
            replies: Cursor::new(replies.to_vec()),
            sent: Vec::new(),
        }
    }
}

impl Read for Wire {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.replies.read(buf)
    }
}

impl Write for Wire {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn mysql_greeting(version: &str) -> Vec<u8> {
    let mut payload = vec![0x0a];
    payload.extend_from_slice(version.as_bytes());
    payload.push(0);
    payload.extend_from_slice(&[1, 0, 0, 0]);
    let len = payload.len() as u32;
    let mut packet = len.to_le_bytes()[..3].to_vec();
    packet.push(0);
    packet.extend(payload);
    packet
}

#[test]
fn redis_ping_expects_pong() {
    let mut wire = Wire::new(b"+PONG\r\n");
    let detail = Backend::Cache.probe(&mut wire).unwrap();
    assert_eq!(wire.sent, b"PING\r\n");
    assert_eq!(detail, "answered PING with PONG");
}

#[test]
fn redis_error_reply_still_counts_as_reachable() {
    let mut wire = Wire::new(b"-NOAUTH Authentication required.\r\n");
    let detail = Backend::Cache.probe(&mut wire).unwrap();
    assert!(detail.contains("NOAUTH"), "{detail}");
}

#[test]
fn redis_garbage_is_an_error() {
    let mut wire = Wire::new(b"HTTP/1.1 400 Bad Request\r\n");
    assert!(Backend::Cache.probe(&mut wire).is_err());
}

#[test]
fn nats_needs_the_info_banner_then_pong() {
    let mut wire = Wire::new(b"INFO {\"server_id\":\"x\"}\r\n+OK\r\nPONG\r\n");
    let detail = Backend::Queue.probe(&mut wire).unwrap();
    assert_eq!(detail, "answered PING with PONG");
    assert!(String::from_utf8_lossy(&wire.sent).ends_with("PING\r\n"));

    let mut wire = Wire::new(b"+PONG\r\n");
    let err = Backend::Queue.probe(&mut wire).unwrap_err();
    assert!(err.to_string().contains("INFO banner"), "{err}");
}

#[test]
fn mysql_greeting_reports_the_server_version() {
    let mut wire = Wire::new(&mysql_greeting("8.0.36"));
    let detail = Backend::Database.probe(&mut wire).unwrap();
    assert_eq!(detail, "greeted as server 8.0.36");
    assert!(wire.sent.is_empty());
}

#[test]
fn closed_connection_before_reply_is_an_error() {
    let mut wire = Wire::new(b"");
    let err = Backend::Cache.probe(&mut wire).unwrap_err();
    assert!(err.to_string().contains("closed"), "{err}");
}

#[test]
fn mongodb_only_needs_the_connection() {
    let mut wire = Wire::new(b"");
    assert!(Backend::AuditDatabase.probe(&mut wire).is_ok());
}

#[test]
fn unresolvable_address_is_reported() {
    let err = connect("no-port-here", Duration::from_millis(100)).unwrap_err();
    assert!(err.to_string().contains("no-port-here"), "{err}");
}
