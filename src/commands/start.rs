//! Launches platform services as supervised child processes.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use super::*;

const POLL: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Service {
    Controller,
    Coordinator,
    HttpReceiver,
}

impl Service {
    fn name(self) -> &'static str {
        match self {
            Service::Controller => "controller",
            Service::Coordinator => "coordinator",
            Service::HttpReceiver => "helper-httpreceiver",
        }
    }

    fn default_listen_addr(self) -> &'static str {
        match self {
            Service::Controller => "0.0.0.0:54321",
            Service::Coordinator => "0.0.0.0:54322",
            Service::HttpReceiver => "0.0.0.0:8080",
        }
    }

    fn default_binary(self) -> String {
        format!("opsicle-{}", self.name())
    }

    /// Arguments passed to the service binary.
    fn args(self, listen_addr: &str, controller_url: &str) -> Vec<String> {
        let mut args = vec!["--listen-addr".to_string(), listen_addr.to_string()];
        if self != Service::Controller {
            args.push("--controller-url".to_string());
            args.push(controller_url.to_string());
        }
        args
    }
}

fn service_flags() -> FlagSet {
    FlagSet::new()
        .string("listen-addr", None, "", "address the service listens on")
        .string("binary", None, "", "service executable (default opsicle-<service>)")
}

pub(super) fn node() -> Node {
    Node::group("start", "Run a platform service in the foreground")
        .alias("run")
        .child(Node::leaf("controller", "Start the controller", run_controller).flags(service_flags()))
        .child(Node::leaf("coordinator", "Start the coordinator", run_coordinator).flags(service_flags()))
        .child(
            Node::group("helper", "Start a helper service").child(
                Node::leaf("httpreceiver", "Start the HTTP receiver helper", run_http_receiver)
                    .flags(service_flags()),
            ),
        )
}

fn run_controller(ctx: &mut Ctx<'_>) -> Result<()> {
    start(ctx, Service::Controller)
}

fn run_coordinator(ctx: &mut Ctx<'_>) -> Result<()> {
    start(ctx, Service::Coordinator)
}

fn run_http_receiver(ctx: &mut Ctx<'_>) -> Result<()> {
    start(ctx, Service::HttpReceiver)
}

fn start(ctx: &mut Ctx<'_>, service: Service) -> Result<()> {
    let mut listen_addr = ctx.string("listen-addr")?;
    if listen_addr.is_empty() {
        listen_addr = service.default_listen_addr().to_string();
    }
    let mut binary = ctx.string("binary")?;
    if binary.is_empty() {
        binary = service.default_binary();
    }
    let args = service.args(&listen_addr, &ctx.controller_url()?);

    tracing::info!(service = service.name(), %binary, ?args, "starting service");
    let child = Command::new(&binary)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("start {} ({})", service.name(), binary))?;
    let pid = child.id();
    ctx.boxed(
        Tone::Info,
        &format!("Started {} (pid {}) on {}", service.name(), pid, listen_addr),
    )?;

    let child = Arc::new(Mutex::new(child));
    let handle = child.clone();
    ctx.shutdown.register(&format!("service-{}", service.name()), move || {
        let mut child = handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(None) = child.try_wait() {
            tracing::info!(pid, "stopping service");
            let _ = child.kill();
            let _ = child.wait();
        }
    });

    let status = wait(&child)?;
    if status.success() {
        ctx.success(&format!("{} exited", service.name()))
    } else {
        bail!("{} exited with {}", service.name(), status)
    }
}

/// Polls rather than blocking in `wait` so the shutdown function can take
/// the lock and kill the child.
fn wait(child: &Mutex<Child>) -> Result<ExitStatus> {
    loop {
        let polled = child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_wait()
            .context("wait for service")?;
        if let Some(status) = polled {
            return Ok(status);
        }
        thread::sleep(POLL);
    }
}

#[cfg(test)]
#[path = "../tests/commands/start_tests.rs"]
mod tests;
