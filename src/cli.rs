//! Command tree, argument parsing and the per-invocation lifecycle.
//!
//! Commands are declared as a tree of [`Node`]s. The tree is turned into a
//! `clap::Command` for parsing only; flag values are resolved afterwards
//! against the leaf's own [`FlagSet`], so flags of sibling commands never
//! share a namespace.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

use crate::app::App;
use crate::config::{CliValues, ConfigError, Effective, FlagKind, FlagSet, FlagSpec};
use crate::credentials::CredentialStore;
use crate::render::{Clock, OutputFormat};
use crate::shutdown::{self, Shutdown};
use crate::tui::{self, Driver, Tone};

pub const DEFAULT_CONTROLLER_URL: &str = "http://localhost:54321";

pub mod exit {
    pub const OK: i32 = 0;
    pub const ERROR: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INTERRUPTED: i32 = crate::shutdown::INTERRUPTED_EXIT;
}

const ARGS: &str = "args";

pub type RunFn = fn(&mut Ctx<'_>) -> Result<()>;

/// Number of positional arguments a command accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    None,
    Exact(usize),
    Range(usize, usize),
    Any,
}

impl Arity {
    fn check(self, n: usize) -> Result<(), String> {
        let problem = match self {
            Arity::None if n != 0 => format!("accepts no arguments, received {}", n),
            Arity::Exact(want) if n != want => {
                format!("accepts {} argument(s), received {}", want, n)
            }
            Arity::Range(min, max) if !(min..=max).contains(&n) => {
                format!("accepts between {} and {} arguments, received {}", min, max, n)
            }
            _ => return Ok(()),
        };
        Err(problem)
    }
}

pub struct Node {
    pub name: &'static str,
    pub aliases: Vec<&'static str>,
    pub short: &'static str,
    pub long: Option<&'static str>,
    pub flags: FlagSet,
    pub arity: Arity,
    pub arg_names: &'static str,
    pub run: Option<RunFn>,
    pub children: Vec<Node>,
}

impl Node {
    /// A node that only groups children; invoking it prints its help.
    pub fn group(name: &'static str, short: &'static str) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            short,
            long: None,
            flags: FlagSet::new(),
            arity: Arity::None,
            arg_names: "",
            run: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(name: &'static str, short: &'static str, run: RunFn) -> Self {
        Self::group(name, short).runs(run)
    }

    pub fn runs(mut self, run: RunFn) -> Self {
        self.run = Some(run);
        self
    }

    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn long(mut self, text: &'static str) -> Self {
        self.long = Some(text);
        self
    }

    pub fn flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }

    pub fn args(mut self, arity: Arity, names: &'static str) -> Self {
        self.arity = arity;
        self.arg_names = names;
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    fn find(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Flags every runnable command accepts.
pub fn common_flags() -> FlagSet {
    FlagSet::new()
        .string(
            "controller-url",
            None,
            DEFAULT_CONTROLLER_URL,
            "base URL of the controller",
        )
        .string("output", Some('o'), "text", "output format: text or json")
        .string(
            "log-level",
            None,
            "warn",
            "log verbosity: error, warn, info, debug or trace",
        )
}

/// Everything a command's run function can reach.
pub struct Ctx<'a> {
    pub app: &'a mut App,
    pub config: Effective,
    pub args: Vec<String>,
    pub path: Vec<&'static str>,
    pub shutdown: Arc<Shutdown>,
}

impl Ctx<'_> {
    /// Identifies the command in the controller user agent, e.g. `list-orgs`.
    pub fn client_id(&self) -> String {
        self.path.join("-")
    }

    pub fn string(&self, name: &str) -> Result<String, ConfigError> {
        self.config.string(name).map(str::to_string)
    }

    pub fn controller_url(&self) -> Result<String, ConfigError> {
        self.string("controller-url")
    }

    pub fn output(&self) -> Result<OutputFormat> {
        self.config.string("output")?.parse()
    }

    pub fn json(&self) -> Result<bool> {
        Ok(self.output()? == OutputFormat::Json)
    }

    pub fn clock(&self, utc: bool) -> Clock {
        Clock::new(self.app.local_offset, utc)
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.app.out
    }

    pub fn ui(&mut self) -> &mut dyn Driver {
        &mut *self.app.ui
    }

    pub fn interactive(&self) -> bool {
        self.app.ui.interactive()
    }

    pub fn print(&mut self, text: &str) -> Result<()> {
        writeln!(self.app.out, "{}", text).context("write output")
    }

    pub fn emit_json<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        crate::render::emit_json(&mut *self.app.out, value)
    }

    pub fn boxed(&mut self, tone: Tone, message: &str) -> Result<()> {
        let color = self.app.color;
        tui::write_box(&mut *self.app.out, tone, message, color).context("write output")
    }

    pub fn success(&mut self, message: &str) -> Result<()> {
        self.boxed(Tone::Success, message)
    }

    pub fn console_and_store(&mut self) -> (Console<'_>, &CredentialStore) {
        let app = &mut *self.app;
        let console = Console {
            ui: &mut *app.ui,
            out: &mut *app.out,
            color: app.color,
        };
        (console, &app.credentials)
    }
}

/// Input and output for flows that run outside a [`Ctx`], such as the login
/// flow started by the re-authentication loop.
pub struct Console<'a> {
    pub ui: &'a mut dyn Driver,
    pub out: &'a mut dyn Write,
    pub color: bool,
}

impl Console<'_> {
    pub fn boxed(&mut self, tone: Tone, message: &str) -> Result<()> {
        tui::write_box(&mut *self.out, tone, message, self.color).context("write output")
    }
}

pub struct Dispatcher {
    root: Node,
}

impl Dispatcher {
    /// Installs the common flags on runnable nodes and validates the tree.
    pub fn new(mut root: Node) -> Result<Self> {
        let mut problems = Vec::new();
        prepare(&mut root, &mut Vec::new(), &mut problems);
        if !problems.is_empty() {
            anyhow::bail!("invalid command tree:\n  {}", problems.join("\n  "));
        }
        let mut cmd = build_command(&root, true);
        cmd.build();
        Ok(Self { root })
    }

    pub fn command(&self, color: bool) -> Command {
        build_command(&self.root, true).color(if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        })
    }

    /// Parses `argv` (program name first), runs the selected command and
    /// returns the process exit code.
    pub fn run<I, T>(&self, app: &mut App, argv: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = match self.command(app.color).try_get_matches_from(argv) {
            Ok(m) => m,
            Err(err) => return report_parse_error(app, &err),
        };

        let (node, path, leaf) = self.resolve(&matches);
        let Some(run) = node.run else {
            return self.print_help(app, &path);
        };

        let args: Vec<String> = match node.arity {
            Arity::None => Vec::new(),
            _ => leaf
                .get_many::<String>(ARGS)
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
        };
        if let Err(problem) = node.arity.check(args.len()) {
            let _ = writeln!(app.err, "error: `{}` {}", path.join(" "), problem);
            let _ = writeln!(app.err, "\nFor more information, try '--help'.");
            return exit::USAGE;
        }

        let cli = cli_values(&node.flags, leaf);
        let config = match Effective::bind(&node.flags, &cli, &app.env, &app.config_file) {
            Ok(c) => c,
            Err(err) => {
                let _ = writeln!(app.err, "error: {}", err);
                return exit::USAGE;
            }
        };

        init_logging(config.string("log-level").unwrap_or("warn"));
        tracing::debug!(command = %path.join(" "), ?args, "dispatching");

        let shutdown = Shutdown::new();
        if app.handle_signals {
            if let Err(err) = shutdown::listen_for_signals(shutdown.clone()) {
                tracing::warn!(error = %err, "continuing without signal handling");
            }
        }

        let result = {
            let mut ctx = Ctx {
                app: &mut *app,
                config,
                args,
                path,
                shutdown: shutdown.clone(),
            };
            run(&mut ctx)
        };
        shutdown.drain();

        match result {
            Ok(()) => exit::OK,
            Err(err) if tui::is_cancelled(&err) => {
                tracing::debug!("command cancelled");
                exit::ERROR
            }
            Err(err) => {
                let message = format!("{:#}", err);
                let _ = tui::write_box(&mut *app.err, Tone::Error, &message, app.color);
                exit::ERROR
            }
        }
    }

    fn resolve<'m>(&self, matches: &'m ArgMatches) -> (&Node, Vec<&'static str>, &'m ArgMatches) {
        let mut node = &self.root;
        let mut path = Vec::new();
        let mut current = matches;
        while let Some((name, sub)) = current.subcommand() {
            let Some(child) = node.find(name) else {
                break;
            };
            node = child;
            path.push(child.name);
            current = sub;
        }
        (node, path, current)
    }

    fn print_help(&self, app: &mut App, path: &[&'static str]) -> i32 {
        let mut cmd = self.command(app.color);
        cmd.build();
        let mut target = &cmd;
        for name in path {
            match target.find_subcommand(name) {
                Some(sub) => target = sub,
                None => break,
            }
        }
        let help = target.clone().render_help();
        let _ = write!(app.out, "{}", help);
        exit::OK
    }
}

fn prepare(node: &mut Node, path: &mut Vec<&'static str>, problems: &mut Vec<String>) {
    path.push(node.name);
    let here = path.join(" ");
    if node.run.is_some() {
        let own = std::mem::take(&mut node.flags);
        node.flags = common_flags().merge(own);
    }
    for p in node.flags.problems() {
        problems.push(format!("{}: {}", here, p));
    }
    let mut seen: Vec<&str> = Vec::new();
    for child in &node.children {
        for name in std::iter::once(&child.name).chain(child.aliases.iter()) {
            if seen.contains(name) {
                problems.push(format!("{}: subcommand name '{}' is used twice", here, name));
            }
            seen.push(name);
        }
    }
    for child in &mut node.children {
        prepare(child, path, problems);
    }
    path.pop();
}

fn build_command(node: &Node, is_root: bool) -> Command {
    let mut cmd = Command::new(node.name)
        .about(node.short)
        .visible_aliases(node.aliases.iter().copied());
    if let Some(long) = node.long {
        cmd = cmd.long_about(long);
    }
    if is_root {
        cmd = cmd
            .version(env!("CARGO_PKG_VERSION"))
            .disable_help_subcommand(true);
    }
    for spec in node.flags.specs() {
        cmd = cmd.arg(flag_arg(spec));
    }
    if node.arity != Arity::None {
        cmd = cmd.arg(
            Arg::new(ARGS)
                .value_name(node.arg_names)
                .num_args(0..)
                .action(ArgAction::Append),
        );
    }
    for child in &node.children {
        cmd = cmd.subcommand(build_command(child, false));
    }
    cmd
}

fn flag_arg(spec: &FlagSpec) -> Arg {
    let kind = spec.kind();
    let default = spec.default.display();
    let mut help = spec.usage.to_string();
    if !default.is_empty() {
        help.push_str(&format!(" [default: {}]", default));
    }
    help.push_str(&format!(" [env: {}]", spec.env_key()));

    let mut arg = Arg::new(spec.name)
        .long(spec.name)
        .help(help)
        .action(ArgAction::Append);
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    match kind {
        FlagKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_name("BOOL"),
        FlagKind::StringList => arg.value_name("LIST"),
        _ => arg.value_name(kind.to_string().to_ascii_uppercase()),
    }
}

fn cli_values(flags: &FlagSet, matches: &ArgMatches) -> CliValues {
    let mut out = CliValues::new();
    for spec in flags.specs() {
        if matches.value_source(spec.name) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(values) = matches.get_many::<String>(spec.name) {
            out.insert(spec.name.to_string(), values.cloned().collect());
        }
    }
    out
}

fn report_parse_error(app: &mut App, err: &clap::Error) -> i32 {
    use clap::error::ErrorKind;
    let rendered = err.render();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(app.out, "{}", rendered);
            exit::OK
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = write!(app.out, "{}", rendered);
            exit::USAGE
        }
        _ => {
            let _ = write!(app.err, "{}", rendered);
            exit::USAGE
        }
    }
}

/// Installs the stderr subscriber once per process; later calls are no-ops.
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "tests/cli/dispatcher_tests.rs"]
mod tests;
