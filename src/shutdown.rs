//! Release functions that run once, in parallel, when a command ends or
//! the process is interrupted.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use anyhow::{Context, Result};

type Release = Box<dyn FnOnce() + Send + 'static>;

/// Exit code used after draining on SIGINT/SIGTERM.
pub const INTERRUPTED_EXIT: i32 = 130;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Open,
    Draining,
    Drained,
}

struct State {
    procs: HashMap<String, Release>,
    phase: Phase,
}

pub struct Shutdown {
    state: Mutex<State>,
    finished: Condvar,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                procs: HashMap::new(),
                phase: Phase::Open,
            }),
            finished: Condvar::new(),
        }
    }
}

impl Shutdown {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `release` under `id`. A second registration with the same id
    /// replaces the first. Once draining has begun `release` runs right away.
    pub fn register<F>(&self, id: &str, release: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.lock();
        if state.phase != Phase::Open {
            drop(state);
            tracing::debug!(id, "shutdown already started; releasing immediately");
            release();
            return;
        }
        if state.procs.insert(id.to_string(), Box::new(release)).is_some() {
            tracing::warn!(id, "shutdown process registered twice; replacing the earlier one");
        }
    }

    pub fn pending(&self) -> usize {
        self.lock().procs.len()
    }

    pub fn is_drained(&self) -> bool {
        self.lock().phase == Phase::Drained
    }

    /// Runs every registered function on its own thread and waits for all
    /// of them. Later and concurrent callers wait for the first drain to
    /// finish. Returns how many functions this call ran.
    pub fn drain(&self) -> usize {
        let procs = {
            let mut state = self.lock();
            match state.phase {
                Phase::Open => {
                    state.phase = Phase::Draining;
                    std::mem::take(&mut state.procs)
                }
                Phase::Draining => {
                    let _done = self
                        .finished
                        .wait_while(state, |s| s.phase != Phase::Drained)
                        .unwrap_or_else(PoisonError::into_inner);
                    return 0;
                }
                Phase::Drained => return 0,
            }
        };

        let count = procs.len();
        tracing::debug!(count, "draining shutdown processes");
        thread::scope(|scope| {
            let handles: Vec<_> = procs
                .into_iter()
                .map(|(id, release)| (id, scope.spawn(release)))
                .collect();
            for (id, handle) in handles {
                if handle.join().is_err() {
                    tracing::error!(id = %id, "shutdown process panicked");
                }
            }
        });

        self.lock().phase = Phase::Drained;
        self.finished.notify_all();
        count
    }
}

/// Starts a thread that waits for SIGINT/SIGTERM, gives the terminal back,
/// drains `shutdown` and exits the process with [`INTERRUPTED_EXIT`].
pub fn listen_for_signals(shutdown: Arc<Shutdown>) -> Result<()> {
    thread::Builder::new()
        .name("opsicle-signals".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    tracing::warn!(error = %err, "signal listener unavailable");
                    return;
                }
            };
            let restore = || {
                crate::tui::restore_terminal();
            };
            if rt.block_on(drain_on(wait_for_signal(), &shutdown, restore)).is_some() {
                std::process::exit(INTERRUPTED_EXIT);
            }
        })
        .context("spawn signal listener")?;
    Ok(())
}

/// Waits for `signal`, runs `restore`, then drains `shutdown`. Returns the
/// signal's name, or `None` when the listener failed and nothing ran.
async fn drain_on<F>(signal: F, shutdown: &Shutdown, restore: impl FnOnce()) -> Option<&'static str>
where
    F: Future<Output = std::io::Result<&'static str>>,
{
    match signal.await {
        Ok(name) => {
            restore();
            tracing::info!(signal = name, "received signal; shutting down");
            shutdown.drain();
            Some(name)
        }
        Err(err) => {
            tracing::warn!(error = %err, "signal listener failed");
            None
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "SIGINT")
}

#[cfg(test)]
#[path = "tests/shutdown_tests.rs"]
mod tests;
