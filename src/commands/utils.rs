//! Diagnostics: backend reachability checks and the effective configuration.

use std::io::{Read, Write};
use std::net::{Shutdown as Direction, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Serialize;

use super::*;
use crate::config::{Source, env_key};

const MAX_LINE: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Cache,
    Queue,
    Database,
    AuditDatabase,
}

impl Backend {
    fn name(self) -> &'static str {
        match self {
            Backend::Cache => "cache",
            Backend::Queue => "queue",
            Backend::Database => "database",
            Backend::AuditDatabase => "audit-database",
        }
    }

    fn default_addr(self) -> &'static str {
        match self {
            Backend::Cache => "localhost:6379",
            Backend::Queue => "localhost:4222",
            Backend::Database => "localhost:3306",
            Backend::AuditDatabase => "localhost:27017",
        }
    }

    fn protocol(self) -> &'static str {
        match self {
            Backend::Cache => "redis",
            Backend::Queue => "nats",
            Backend::Database => "mysql",
            Backend::AuditDatabase => "mongodb",
        }
    }

    /// Speaks just enough of the backend's protocol to know it is alive.
    /// Returns a short description of what answered.
    fn probe<S: Read + Write>(self, stream: &mut S) -> Result<String> {
        match self {
            Backend::Cache => {
                stream.write_all(b"PING\r\n").context("send PING")?;
                let reply = read_line(stream)?;
                if reply == "+PONG" {
                    Ok("answered PING with PONG".to_string())
                } else if let Some(err) = reply.strip_prefix('-') {
                    Ok(format!("is up but refused PING: {}", err))
                } else {
                    bail!("unexpected reply to PING: {:?}", reply)
                }
            }
            Backend::Queue => {
                let banner = read_line(stream)?;
                if !banner.starts_with("INFO ") {
                    bail!("expected an INFO banner, received {:?}", banner);
                }
                stream
                    .write_all(b"CONNECT {\"verbose\":false}\r\nPING\r\n")
                    .context("send PING")?;
                loop {
                    let reply = read_line(stream)?;
                    match reply.as_str() {
                        "PONG" => return Ok("answered PING with PONG".to_string()),
                        "+OK" => continue,
                        other if other.starts_with("-ERR") => {
                            return Ok(format!("is up but refused the connection: {}", other));
                        }
                        other => bail!("unexpected reply to PING: {:?}", other),
                    }
                }
            }
            Backend::Database => {
                let mut header = [0u8; 4];
                stream.read_exact(&mut header).context("read handshake header")?;
                let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
                if len == 0 || len > 1 << 16 {
                    bail!("implausible handshake length {}", len);
                }
                let mut payload = vec![0u8; len];
                stream.read_exact(&mut payload).context("read handshake")?;
                match payload[0] {
                    0x0a => {
                        let end = payload[1..].iter().position(|&b| b == 0).unwrap_or(len - 1);
                        let version = String::from_utf8_lossy(&payload[1..1 + end]);
                        Ok(format!("greeted as server {}", version))
                    }
                    0xff => {
                        let message = String::from_utf8_lossy(payload.get(3..).unwrap_or_default());
                        Ok(format!("is up but refused the connection: {}", message.trim()))
                    }
                    other => bail!("unsupported handshake protocol version {}", other),
                }
            }
            Backend::AuditDatabase => Ok("accepted a TCP connection".to_string()),
        }
    }
}

fn read_line<R: Read>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = reader.read(&mut byte).context("read reply")?;
        if n == 0 {
            bail!("connection closed before a reply arrived");
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
        if line.len() > MAX_LINE {
            bail!("reply line longer than {} bytes", MAX_LINE);
        }
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

fn connect(addr: &str, timeout: Duration) -> Result<TcpStream> {
    let targets: Vec<_> = addr
        .to_socket_addrs()
        .with_context(|| format!("resolve {}", addr))?
        .collect();
    let mut last = None;
    for target in targets {
        match TcpStream::connect_timeout(&target, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%target, error = %err, "connect failed");
                last = Some(err);
            }
        }
    }
    match last {
        Some(err) => Err(err).with_context(|| format!("connect to {}", addr)),
        None => bail!("{} did not resolve to any address", addr),
    }
}

pub(super) fn node() -> Node {
    let check_flags = || {
        FlagSet::new()
            .string("addr", None, "", "host:port of the backend (default depends on the backend)")
            .duration("timeout", None, Duration::from_secs(5), "connect and reply timeout")
    };
    Node::group("utils", "Diagnostics")
        .alias("util")
        .child(
            Node::group("check", "Check that a backend is reachable")
                .child(Node::leaf("cache", "Ping the Redis cache", run_check_cache).flags(check_flags()))
                .child(Node::leaf("queue", "Ping the NATS queue", run_check_queue).flags(check_flags()))
                .child(
                    Node::leaf("database", "Check the MySQL database greets", run_check_database)
                        .alias("db")
                        .flags(check_flags()),
                )
                .child(
                    Node::leaf(
                        "audit-database",
                        "Check the MongoDB audit database accepts connections",
                        run_check_audit_database,
                    )
                    .flags(check_flags()),
                ),
        )
        .child(Node::leaf("print", "Show the effective configuration and file locations", run_print))
}

fn run_check_cache(ctx: &mut Ctx<'_>) -> Result<()> {
    check(ctx, Backend::Cache)
}

fn run_check_queue(ctx: &mut Ctx<'_>) -> Result<()> {
    check(ctx, Backend::Queue)
}

fn run_check_database(ctx: &mut Ctx<'_>) -> Result<()> {
    check(ctx, Backend::Database)
}

fn run_check_audit_database(ctx: &mut Ctx<'_>) -> Result<()> {
    check(ctx, Backend::AuditDatabase)
}

fn check(ctx: &mut Ctx<'_>, backend: Backend) -> Result<()> {
    let mut addr = ctx.string("addr")?;
    if addr.is_empty() {
        addr = backend.default_addr().to_string();
    }
    let timeout = ctx.config.duration("timeout")?;
    tracing::debug!(backend = backend.name(), %addr, ?timeout, "checking backend");

    let mut stream = connect(&addr, timeout)
        .with_context(|| format!("{} at {} is not reachable", backend.name(), addr))?;
    stream.set_read_timeout(Some(timeout)).context("set read timeout")?;
    stream.set_write_timeout(Some(timeout)).context("set write timeout")?;
    let closer = stream.try_clone().context("clone connection")?;
    ctx.shutdown.register(&format!("check-{}", backend.name()), move || {
        let _ = closer.shutdown(Direction::Both);
    });

    let detail = backend
        .probe(&mut stream)
        .with_context(|| format!("{} at {} did not answer as {}", backend.name(), addr, backend.protocol()))?;
    ctx.success(&format!("{} at {} {}", backend.name(), addr, detail))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Setting {
    flag: &'static str,
    value: String,
    source: Source,
    env: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    profile_dir: String,
    config_file: String,
    config_file_loaded: bool,
    session_file: String,
    logged_in: bool,
    settings: Vec<Setting>,
}

fn run_print(ctx: &mut Ctx<'_>) -> Result<()> {
    let app = &*ctx.app;
    let report = Report {
        profile_dir: app.profile.dir().display().to_string(),
        config_file: app.profile.config_path().display().to_string(),
        config_file_loaded: app.config_file.path().is_some(),
        session_file: app.credentials.path().display().to_string(),
        logged_in: app.credentials.read().is_ok(),
        settings: ctx
            .config
            .iter()
            .map(|(flag, value, source)| Setting {
                flag,
                value: value.display(),
                source,
                env: env_key(flag),
            })
            .collect(),
    };
    if ctx.json()? {
        return ctx.emit_json(&report);
    }

    let yes_no = |b: bool| (if b { "yes" } else { "no" }).to_string();
    emit_fields(
        ctx.out(),
        &[
            ("profile", report.profile_dir.clone()),
            ("config file", report.config_file.clone()),
            ("config loaded", yes_no(report.config_file_loaded)),
            ("session file", report.session_file.clone()),
            ("logged in", yes_no(report.logged_in)),
        ],
    )?;
    let table = Table::new(&["flag", "value", "source", "environment variable"]).render(
        &report.settings,
        |s: &Setting| {
            vec![
                Cell::from(s.flag),
                Cell::from(&s.value),
                Cell::from(s.source.to_string()),
                Cell::from(&s.env),
            ]
        },
    );
    ctx.print(&format!("\n{}", table))
}

#[cfg(test)]
#[path = "../tests/commands/utils_tests.rs"]
mod tests;
