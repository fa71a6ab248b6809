use crossterm::event::KeyCode;

use super::*;

fn driver() -> ScriptedDriver {
    ScriptedDriver::new(80, 24)
}

#[test]
fn table_coerces_cell_values() {
    let rows = vec![vec![
        Cell::from(true),
        Cell::from(false),
        Cell::from(7i64),
        Cell::from("x"),
        Cell::from(vec!["a".to_string(), "b".to_string()]),
    ]];
    let rendered: Vec<String> = rows[0].iter().map(Cell::render).collect();
    assert_eq!(rendered, vec!["✅", "❌", "7", "x", "[\"a\", \"b\"]"]);

    let text = Table::new(&["a", "b", "c", "d", "e"]).render(&rows, |r| r.clone());
    assert!(text.contains("✅"));
    assert!(text.contains("[\"a\", \"b\"]"));
}

#[test]
fn table_coerces_floats_and_bytes() {
    assert_eq!(Cell::from(2.5f64).render(), "2.5");
    assert_eq!(Cell::from(&b"bytes"[..]).render(), "bytes");
    assert_eq!(Cell::from(None::<String>).render(), "-");
}

#[test]
fn table_has_one_line_per_row_between_borders() {
    let items = ["one", "two"];
    let text = Table::new(&["name"]).render(&items, |s| vec![Cell::from(*s)]);
    assert!(text.lines().any(|l| l.contains("one")));
    assert!(text.lines().any(|l| l.contains("two")));
    assert!(text.lines().any(|l| l.contains("name")));
}

#[test]
fn prompt_collects_values_and_masks_passwords() {
    let mut d = driver();
    d.text("a@b").enter().text("hunter2").enter().enter();
    let mut prompt = Prompt::new("Login")
        .field("email", "Email", FieldKind::String)
        .field("password", "Password", FieldKind::Password);
    run(&mut d, &mut prompt, Mode::Inline).unwrap();

    assert_eq!(prompt.value("email"), Some("a@b"));
    assert_eq!(prompt.value("password"), Some("hunter2"));
    assert!(d.screens().iter().all(|s| !s.contains("hunter2")));
    assert!(d.screen().contains("*******"));
}

#[test]
fn prompt_integer_fields_ignore_letters() {
    let mut d = driver();
    d.text("4x2").key(KeyCode::Tab).enter();
    let mut prompt = Prompt::new("Count").field("n", "Count", FieldKind::Integer);
    run(&mut d, &mut prompt, Mode::Inline).unwrap();
    assert_eq!(prompt.value("n"), Some("42"));
}

#[test]
fn prompt_cancel_keys_return_cancelled() {
    for cancel in [UiEvent::key(KeyCode::Esc), UiEvent::ctrl('c')] {
        let mut d = driver();
        d.text("abc").push(cancel);
        let mut prompt = Prompt::new("x").field("a", "A", FieldKind::String);
        let err = run(&mut d, &mut prompt, Mode::Inline).unwrap_err();
        assert!(is_cancelled(&err));
        assert_eq!(prompt.status(), Status::Cancelled);
    }
}

#[test]
fn exhausted_script_is_an_error() {
    let mut d = driver();
    d.text("abc");
    let mut prompt = Prompt::new("x").field("a", "A", FieldKind::String);
    let err = run(&mut d, &mut prompt, Mode::Inline).unwrap_err();
    assert!(err.to_string().contains("exhausted"));
}

#[test]
fn detached_driver_refuses_widgets() {
    let mut d = ScriptedDriver::detached();
    let mut prompt = Prompt::new("x").field("a", "A", FieldKind::String);
    let err = run(&mut d, &mut prompt, Mode::Inline).unwrap_err();
    assert!(err.to_string().contains("TTY"));
}

fn email_form() -> Form {
    Form::new("Register")
        .field("name", "Name", FieldKind::String, &[Validator::String])
        .field(
            "email",
            "Email",
            FieldKind::String,
            &[Validator::Required, Validator::Email],
        )
}

#[test]
fn form_rejects_empty_required_email_and_refocuses() {
    let mut form = email_form();
    for ev in [
        UiEvent::key(KeyCode::Tab),
        UiEvent::key(KeyCode::Tab),
        UiEvent::key(KeyCode::Enter),
    ] {
        form.update(&ev);
    }
    assert_eq!(form.status(), Status::Pending);
    assert_eq!(form.focus(), 1);
    assert_eq!(form.error("email"), Some("this field is required"));
    assert_eq!(form.error("name"), None);
}

#[test]
fn form_rejects_malformed_email_then_accepts_fix() {
    let mut d = driver();
    d.key(KeyCode::Tab)
        .text("not-an-email")
        .key(KeyCode::Tab)
        .enter()
        // focus is back on the email field
        .ctrl('u')
        .text("ops@example.com")
        .key(KeyCode::Tab)
        .enter();
    let mut form = email_form();
    run(&mut d, &mut form, Mode::Fullscreen).unwrap();

    assert_eq!(form.value("email"), Some("ops@example.com"));
    assert_eq!(form.error("email"), None);
    assert!(
        d.screens()
            .iter()
            .any(|s| s.contains("must be an email address"))
    );
}

#[test]
fn validators_check_each_kind() {
    assert!(Validator::Integer.check("12").is_ok());
    assert!(Validator::Integer.check("1.5").is_err());
    assert!(Validator::Float.check("1.5").is_ok());
    assert!(Validator::Float.check("NaN").is_err());
    assert!(Validator::Boolean.check("yes").is_ok());
    assert!(Validator::Boolean.check("maybe").is_err());
    assert!(Validator::Email.check("a@b").is_ok());
    assert!(Validator::Email.check("a b@c").is_err());
    assert!(Validator::Integer.check("").is_ok());
    assert!(Validator::Required.check("  ").is_err());
}

fn choices() -> Vec<Choice> {
    vec![
        Choice::new("Acme", "o1").describe("acme"),
        Choice::new("Globex", "o2").describe("globex"),
        Choice::new("Initech", "o3").describe("initech"),
    ]
}

#[test]
fn selector_moves_with_vim_and_wasd_keys() {
    let mut d = driver();
    d.key(KeyCode::Char('j'))
        .key(KeyCode::Char('s'))
        .key(KeyCode::Char('w'))
        .key(KeyCode::Down)
        .key(KeyCode::Down)
        .key(KeyCode::Char('k'))
        .enter();
    let mut s = Selector::new("Org", choices());
    run(&mut d, &mut s, Mode::Fullscreen).unwrap();
    assert_eq!(s.value(), Some("o2"));
}

#[test]
fn filter_list_narrows_then_navigates() {
    let mut d = driver();
    d.text("i").key(KeyCode::Down).enter();
    let mut list = FilterList::new("Org", choices());
    run(&mut d, &mut list, Mode::Fullscreen).unwrap();
    // "i" matches Initech only, Down stays on it
    assert_eq!(list.value(), Some("o3"));
    assert!(!list.filtering());
}

#[test]
fn filter_list_slash_reenters_filtering() {
    let mut list = FilterList::new("Org", choices()).without_filter();
    assert!(!list.filtering());
    list.update(&UiEvent::key(KeyCode::Char('j')));
    list.update(&UiEvent::key(KeyCode::Char('/')));
    assert!(list.filtering());
    for c in "glo".chars() {
        list.update(&UiEvent::key(KeyCode::Char(c)));
    }
    assert_eq!(list.visible(), vec![1]);
    list.update(&UiEvent::key(KeyCode::Enter));
    assert_eq!(list.value(), Some("o2"));
}

#[test]
fn filter_list_enter_on_empty_view_does_nothing() {
    let mut list = FilterList::new("Org", choices());
    for c in "zzz".chars() {
        list.update(&UiEvent::key(KeyCode::Char(c)));
    }
    list.update(&UiEvent::key(KeyCode::Enter));
    assert_eq!(list.status(), Status::Pending);
}

#[test]
fn checkbox_group_skips_disabled_rows() {
    let mut d = driver();
    d.key(KeyCode::Char(' '))
        .key(KeyCode::Down)
        .key(KeyCode::Char(' '))
        .key(KeyCode::Down)
        .key(KeyCode::Char(' '))
        .enter();
    let mut group = CheckboxGroup::new(
        "Allow",
        vec![
            CheckboxItem::new("create", "create"),
            CheckboxItem::new("view", "view").checked(true).disabled(true),
            CheckboxItem::new("update", "update"),
        ],
    );
    run(&mut d, &mut group, Mode::Inline).unwrap();

    let state: Vec<(&str, bool)> = group
        .items()
        .iter()
        .map(|i| (i.value.as_str(), i.checked))
        .collect();
    assert_eq!(state, vec![("create", true), ("view", true), ("update", true)]);
    assert_eq!(group.checked_values(), vec!["create", "view", "update"]);
}

#[test]
fn dialog_negative_choice_is_cancelled() {
    let mut d = driver();
    d.key(KeyCode::Char('n'));
    let mut dialog = Dialog::confirm("Leave org", "Leave acme?");
    let err = run(&mut d, &mut dialog, Mode::Fullscreen).unwrap_err();
    assert!(is_cancelled(&err));

    let mut d = driver();
    d.key(KeyCode::Right).key(KeyCode::Left).enter();
    let mut dialog = Dialog::confirm("Leave org", "Leave acme?");
    run(&mut d, &mut dialog, Mode::Fullscreen).unwrap();
    assert!(dialog.confirmed());
}

#[test]
fn inline_dialog_is_capped_at_72_columns() {
    let mut d = ScriptedDriver::new(120, 10);
    d.key(KeyCode::Char('y'));
    let mut dialog = Dialog::alert("Notice", "hello").inline();
    run(&mut d, &mut dialog, Mode::Inline).unwrap();
    let top = d.screen().lines().next().unwrap_or_default().to_string();
    assert_eq!(top.chars().count(), 72);
}

#[test]
fn boxed_messages_carry_icon_headers() {
    let text = render_box(Tone::Error, "controller responded with org_exists", false);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with('╭'));
    assert!(lines[1].contains("🔴 ERROR"));
    assert!(lines[2].contains("org_exists"));
    assert!(lines[3].starts_with('╰'));
    assert!(render_box(Tone::Success, "ok", false).contains("🟢 SUCCESS"));
    assert!(render_box(Tone::Warn, "hm", false).contains("🟡 WARNING"));
    assert!(render_box(Tone::Info, "fyi", false).contains("🔵 INFO"));
}

#[test]
fn colored_boxes_use_ansi_sequences() {
    assert!(render_box(Tone::Error, "x", true).contains("\u{1b}["));
    assert!(!render_box(Tone::Error, "x", false).contains("\u{1b}["));
}
