use super::*;

fn flags() -> FlagSet {
    FlagSet::new()
        .bool("yes", Some('y'), false, "skip confirmation")
        .duration("timeout", None, Duration::from_secs(5), "timeout")
        .float("ttl-hours", None, 1.5, "ttl")
        .integer("limit", Some('l'), 20, "limit")
        .string("controller-url", Some('u'), "http://localhost:54321", "url")
        .string_list("allow", None, &["view"], "verbs")
}

fn cli(pairs: &[(&str, &[&str])]) -> CliValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
        .collect()
}

fn file() -> ConfigFile {
    ConfigFile::parse(
        "yes: false\ntimeout: 30\nttl-hours: 2.5\nlimit: 50\ncontroller-url: http://file:1\nallow: [create, delete]\n",
    )
    .unwrap()
}

fn env() -> Env {
    Env::from_pairs([
        ("YES", "1"),
        ("TIMEOUT", "2m"),
        ("TTL_HOURS", "3.25"),
        ("LIMIT", "75"),
        ("CONTROLLER_URL", "http://env:2"),
        ("ALLOW", "manage"),
    ])
}

#[test]
fn defaults_apply_when_no_source_supplies_a_value() {
    let eff = Effective::bind(&flags(), &CliValues::new(), &Env::default(), &ConfigFile::empty()).unwrap();
    assert!(!eff.boolean("yes").unwrap());
    assert_eq!(eff.duration("timeout").unwrap(), Duration::from_secs(5));
    assert_eq!(eff.float("ttl-hours").unwrap(), 1.5);
    assert_eq!(eff.integer("limit").unwrap(), 20);
    assert_eq!(eff.string("controller-url").unwrap(), "http://localhost:54321");
    assert_eq!(eff.list("allow").unwrap(), ["view"]);
    assert_eq!(eff.source("limit"), Some(Source::Default));
}

#[test]
fn config_file_overrides_defaults() {
    let eff = Effective::bind(&flags(), &CliValues::new(), &Env::default(), &file()).unwrap();
    assert!(!eff.boolean("yes").unwrap());
    assert_eq!(eff.duration("timeout").unwrap(), Duration::from_secs(30));
    assert_eq!(eff.float("ttl-hours").unwrap(), 2.5);
    assert_eq!(eff.integer("limit").unwrap(), 50);
    assert_eq!(eff.string("controller-url").unwrap(), "http://file:1");
    assert_eq!(eff.list("allow").unwrap(), ["create", "delete"]);
    assert_eq!(eff.source("allow"), Some(Source::ConfigFile));
}

#[test]
fn environment_overrides_config_file() {
    let eff = Effective::bind(&flags(), &CliValues::new(), &env(), &file()).unwrap();
    assert!(eff.boolean("yes").unwrap());
    assert_eq!(eff.duration("timeout").unwrap(), Duration::from_secs(120));
    assert_eq!(eff.float("ttl-hours").unwrap(), 3.25);
    assert_eq!(eff.integer("limit").unwrap(), 75);
    assert_eq!(eff.string("controller-url").unwrap(), "http://env:2");
    // The winning source replaces the list, it is never merged.
    assert_eq!(eff.list("allow").unwrap(), ["manage"]);
    assert_eq!(eff.source("controller-url"), Some(Source::Environment));
}

#[test]
fn command_line_overrides_everything() {
    let cli = cli(&[
        ("yes", &["false"]),
        ("timeout", &["250ms"]),
        ("ttl-hours", &["0.5"]),
        ("limit", &["2"]),
        ("controller-url", &["http://cli:3"]),
        ("allow", &["view", "update,execute"]),
    ]);
    let eff = Effective::bind(&flags(), &cli, &env(), &file()).unwrap();
    assert!(!eff.boolean("yes").unwrap());
    assert_eq!(eff.duration("timeout").unwrap(), Duration::from_millis(250));
    assert_eq!(eff.float("ttl-hours").unwrap(), 0.5);
    assert_eq!(eff.integer("limit").unwrap(), 2);
    assert_eq!(eff.string("controller-url").unwrap(), "http://cli:3");
    assert_eq!(eff.list("allow").unwrap(), ["view", "update", "execute"]);
    assert_eq!(eff.source("yes"), Some(Source::CommandLine));
}

#[test]
fn uncoercible_values_name_the_flag_and_source() {
    let env = Env::from_pairs([("LIMIT", "lots")]);
    let err = Effective::bind(&flags(), &CliValues::new(), &env, &ConfigFile::empty()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("--limit"), "{msg}");
    assert!(msg.contains("environment"), "{msg}");
    assert!(msg.contains("integer"), "{msg}");
}

#[test]
fn duplicate_definitions_are_recorded() {
    let set = FlagSet::new()
        .string("org", Some('o'), "", "org")
        .string("org", None, "", "again")
        .string("output", Some('o'), "text", "clash");
    assert_eq!(set.specs().len(), 1);
    assert_eq!(set.problems().len(), 2);
    assert!(set.problems()[0].contains("--org"));
    assert!(set.problems()[1].contains("-o"));
}

#[test]
fn asking_for_the_wrong_kind_is_an_error() {
    let eff = Effective::bind(&flags(), &CliValues::new(), &Env::default(), &ConfigFile::empty()).unwrap();
    assert!(matches!(eff.string("limit"), Err(ConfigError::WrongKind { .. })));
    assert!(matches!(eff.string("nope"), Err(ConfigError::Undefined(_))));
}

#[test]
fn env_keys_are_uppercased_with_underscores() {
    assert_eq!(env_key("controller-url"), "CONTROLLER_URL");
    assert_eq!(env_key("audit-database-addr"), "AUDIT_DATABASE_ADDR");
}

#[test]
fn durations_parse_compound_units() {
    assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
    assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
    assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
    assert_eq!(parse_duration("soon"), None);
    assert_eq!(parse_duration("99999999999999999999h"), None);
    assert_eq!(parse_duration("18446744073709551615s1s"), None);
}

#[test]
fn overflowing_duration_is_a_coercion_error() {
    let env = Env::from_pairs([("TIMEOUT", "99999999999999999999h")]);
    let err = Effective::bind(&flags(), &CliValues::new(), &env, &ConfigFile::empty()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("--timeout"), "{msg}");
    assert!(msg.contains("environment"), "{msg}");
}

#[test]
fn missing_config_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFile::load(&dir.path().join("config.yaml")).unwrap();
    assert!(cfg.get("limit").is_none());
    assert!(cfg.path().is_none());
}
