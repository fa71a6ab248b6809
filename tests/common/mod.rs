#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use opsicle::app::App;
use opsicle::cli::Dispatcher;
use opsicle::commands;
use opsicle::config::Env;
use opsicle::tui::ScriptedDriver;

/// One canned controller answer.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

pub fn ok(data: Value) -> Reply {
    Reply {
        status: 200,
        body: json!({ "success": true, "data": data }),
    }
}

pub fn fail(status: u16, code: &str, data: Value) -> Reply {
    Reply {
        status,
        body: json!({ "success": false, "errorCode": code, "data": data }),
    }
}

/// A request the fixture received.
#[derive(Clone, Debug)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct Routes {
    replies: HashMap<(String, String), VecDeque<Reply>>,
    hits: Vec<Hit>,
}

type Shared = Arc<Mutex<Routes>>;

/// An in-process stand-in for the controller. Replies queued for a route
/// are served in order; the last one repeats.
pub struct Fixture {
    pub url: String,
    routes: Shared,
    _rt: tokio::runtime::Runtime,
}

impl Fixture {
    pub fn start() -> Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("build fixture runtime")?;
        let routes = Shared::default();
        let app = Router::new().fallback(handle).with_state(routes.clone());

        let listener = rt
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .context("bind fixture")?;
        let addr = listener.local_addr().context("fixture addr")?;
        rt.spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url: format!("http://{}", addr),
            routes,
            _rt: rt,
        })
    }

    /// Queues `reply` for `method` on `path` (without the `/api/v1` prefix).
    pub fn on(&self, method: &str, path: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        routes
            .replies
            .entry((method.to_string(), format!("/api/v1{}", path)))
            .or_default()
            .push_back(reply);
        self
    }

    /// Accepts any bearer token as a live session.
    pub fn accept_sessions(&self) -> &Self {
        self.on(
            "GET",
            "/session",
            ok(json!({ "sessionId": "S0", "userId": "u1", "email": "a@b.co" })),
        )
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.routes.lock().unwrap().hits.clone()
    }

    pub fn hits_to(&self, method: &str, path: &str) -> Vec<Hit> {
        let full = format!("/api/v1{}", path);
        self.hits()
            .into_iter()
            .filter(|h| h.method == method && h.path == full)
            .collect()
    }
}

async fn handle(
    State(routes): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let mut routes = routes.lock().unwrap();
    routes.hits.push(Hit {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header("authorization"),
        user_agent: header("user-agent"),
        body,
    });

    let key = (method.to_string(), uri.path().to_string());
    let reply = match routes.replies.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
    };
    let reply = reply.unwrap_or_else(|| fail(404, "not_found", Value::Null));
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, axum::Json(reply.body)).into_response()
}

/// A writer tests can read back after the app is done with it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct Output {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A throwaway home directory for one CLI user.
pub struct Home {
    pub dir: tempfile::TempDir,
}

impl Home {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create home"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn session_path(&self) -> PathBuf {
        self.path().join(".opsicle/session/current")
    }

    pub fn write_session(&self, token: &str) {
        let path = self.session_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, token).unwrap();
    }

    pub fn session(&self) -> Option<String> {
        std::fs::read_to_string(self.session_path()).ok()
    }

    /// Runs `opsicle <args>` in-process against `fixture`, answering
    /// prompts from `ui`.
    pub fn run(&self, fixture: &Fixture, ui: ScriptedDriver, args: &[&str]) -> Output {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let mut app = App::with_home(
            self.path(),
            Box::new(out.clone()),
            Box::new(err.clone()),
            Box::new(ui),
            Env::from_pairs([("CONTROLLER_URL", fixture.url.as_str())]),
        )
        .expect("build app");
        let dispatcher = Dispatcher::new(commands::tree()).expect("command tree");

        let mut argv = vec!["opsicle"];
        argv.extend_from_slice(args);
        let code = dispatcher.run(&mut app, argv);
        drop(app);
        Output {
            code,
            stdout: out.text(),
            stderr: err.text(),
        }
    }
}

pub fn interactive() -> ScriptedDriver {
    ScriptedDriver::new(80, 24)
}

pub fn detached() -> ScriptedDriver {
    ScriptedDriver::detached()
}
