use std::sync::Mutex;

use super::*;
use crate::config::Env;
use crate::tui::ScriptedDriver;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct Harness {
    app: App,
    out: Buffer,
    err: Buffer,
    _home: tempfile::TempDir,
}

fn harness(env: &[(&str, &str)]) -> Harness {
    let home = tempfile::tempdir().unwrap();
    let out = Buffer::default();
    let err = Buffer::default();
    let app = App::with_home(
        home.path(),
        Box::new(out.clone()),
        Box::new(err.clone()),
        Box::new(ScriptedDriver::detached()),
        Env::from_pairs(env.iter().copied()),
    )
    .unwrap();
    Harness {
        app,
        out,
        err,
        _home: home,
    }
}

fn echo(ctx: &mut Ctx<'_>) -> Result<()> {
    let line = format!(
        "{} limit={} args={}",
        ctx.client_id(),
        ctx.config.integer("limit")?,
        ctx.args.join(",")
    );
    ctx.print(&line)
}

fn fail(_: &mut Ctx<'_>) -> Result<()> {
    anyhow::bail!("widget factory exploded")
}

fn cancel(_: &mut Ctx<'_>) -> Result<()> {
    Err(tui::Cancelled.into())
}

fn tree() -> Node {
    let limit = || FlagSet::new().integer("limit", Some('l'), 20, "page size");
    Node::group("opsicle", "test tree")
        .child(
            Node::group("list", "list things")
                .alias("ls")
                .child(Node::leaf("orgs", "list orgs", echo).flags(limit()))
                .child(
                    Node::leaf("audit-logs", "list audit logs", echo)
                        .flags(limit())
                        .args(Arity::Range(0, 1), "[CURSOR]"),
                ),
        )
        .child(
            Node::group("set", "set things").child(
                Node::leaf("approvals", "toggle approvals", echo)
                    .flags(limit())
                    .args(Arity::Exact(1), "<on|off>"),
            ),
        )
        .child(Node::leaf("boom", "always fails", fail))
        .child(Node::leaf("quit", "always cancels", cancel))
}

fn run(h: &mut Harness, argv: &[&str]) -> i32 {
    let dispatcher = Dispatcher::new(tree()).unwrap();
    let mut full = vec!["opsicle"];
    full.extend_from_slice(argv);
    dispatcher.run(&mut h.app, full)
}

#[test]
fn leaf_runs_with_client_id_from_its_path() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["list", "orgs"]), exit::OK);
    assert_eq!(h.out.text(), "list-orgs limit=20 args=\n");
}

#[test]
fn alias_resolves_to_the_canonical_path() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["ls", "orgs", "-l", "5"]), exit::OK);
    assert_eq!(h.out.text(), "list-orgs limit=5 args=\n");
}

#[test]
fn command_line_beats_environment() {
    let mut h = harness(&[("LIMIT", "7")]);
    assert_eq!(run(&mut h, &["list", "orgs"]), exit::OK);
    assert!(h.out.text().contains("limit=7"));

    let mut h = harness(&[("LIMIT", "7")]);
    assert_eq!(run(&mut h, &["list", "orgs", "--limit=9"]), exit::OK);
    assert!(h.out.text().contains("limit=9"));
}

#[test]
fn wrong_argument_count_is_rejected_before_running() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["set", "approvals"]), exit::USAGE);
    assert!(h.out.text().is_empty(), "command must not run");
    assert!(h.err.text().contains("accepts 1 argument(s), received 0"));

    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["set", "approvals", "on", "off"]), exit::USAGE);
    assert!(h.out.text().is_empty());

    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["set", "approvals", "on"]), exit::OK);
    assert_eq!(h.out.text(), "set-approvals limit=20 args=on\n");
}

#[test]
fn optional_argument_may_be_omitted() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["list", "audit-logs"]), exit::OK);
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["list", "audit-logs", "c1"]), exit::OK);
    assert!(h.out.text().ends_with("args=c1\n"));
}

#[test]
fn unparseable_environment_value_is_a_usage_error() {
    let mut h = harness(&[("LIMIT", "lots")]);
    assert_eq!(run(&mut h, &["list", "orgs"]), exit::USAGE);
    let err = h.err.text();
    assert!(err.contains("--limit"), "{err}");
    assert!(err.contains("environment"), "{err}");
    assert!(h.out.text().is_empty());
}

#[test]
fn group_without_run_prints_its_help() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["list"]), exit::OK);
    let help = h.out.text();
    assert!(help.contains("orgs"), "{help}");
    assert!(help.contains("audit-logs"), "{help}");
}

#[test]
fn group_help_is_rendered_for_the_group_not_the_root() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["set"]), exit::OK);
    let help = h.out.text();
    assert!(help.contains("approvals"), "{help}");
    assert!(help.contains("toggle approvals"), "{help}");
    assert!(!help.contains("always fails"), "{help}");
}

#[test]
fn help_flag_exits_zero_and_lists_flag_sources() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["list", "orgs", "--help"]), exit::OK);
    let help = h.out.text();
    assert!(help.contains("--limit"), "{help}");
    assert!(help.contains("[env: LIMIT]"), "{help}");
    assert!(help.contains("--controller-url"), "{help}");
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["list", "orgs", "--nope"]), exit::USAGE);
    assert!(h.err.text().contains("--nope"));
}

#[test]
fn failures_render_an_error_box_on_stderr() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["boom"]), exit::ERROR);
    let err = h.err.text();
    assert!(err.contains("ERROR"), "{err}");
    assert!(err.contains("widget factory exploded"), "{err}");
}

#[test]
fn cancellation_exits_one_without_a_box() {
    let mut h = harness(&[]);
    assert_eq!(run(&mut h, &["quit"]), exit::ERROR);
    assert!(h.err.text().is_empty());
}

#[test]
fn duplicate_flags_are_reported_when_building_the_tree() {
    let bad = Node::group("opsicle", "bad").child(
        Node::leaf("x", "x", echo).flags(
            FlagSet::new()
                .string("name", Some('n'), "", "a")
                .string("note", Some('n'), "", "b"),
        ),
    );
    let err = Dispatcher::new(bad).err().expect("tree must be rejected");
    assert!(err.to_string().contains("-n"), "{err}");
}

#[test]
fn redefining_a_common_flag_is_reported() {
    let bad = Node::group("opsicle", "bad").child(
        Node::leaf("x", "x", echo).flags(FlagSet::new().string("output", None, "", "again")),
    );
    assert!(Dispatcher::new(bad).is_err());
}

#[test]
fn duplicate_subcommand_names_are_reported() {
    let bad = Node::group("opsicle", "bad")
        .child(Node::leaf("orgs", "a", echo))
        .child(Node::leaf("organisations", "b", echo).alias("orgs"));
    let err = Dispatcher::new(bad).err().expect("tree must be rejected");
    assert!(err.to_string().contains("'orgs'"), "{err}");
}

#[test]
fn arity_messages_name_the_bounds() {
    assert!(Arity::None.check(0).is_ok());
    assert!(Arity::Any.check(9).is_ok());
    assert!(Arity::Range(1, 2).check(3).unwrap_err().contains("between 1 and 2"));
    assert!(Arity::None.check(1).unwrap_err().contains("no arguments"));
}
