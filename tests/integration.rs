use std::path::Path;
use std::process::Command;

use introspect::tool::{self, ToolName};
use introspect::{
    ClassMember, Config, DefinitionKind, EditOutcome, SourceLookup, extract, find,
    locate_definition_source, replace_definition,
};

const ORIGINAL_F: &str = "def f(a, b):\n    pass";
const EDITED_F: &str = "def f(a, b):\n    return a + b";

fn introspect_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_introspect"));
    cmd.arg("--root").arg(Path::new("tests/fixtures").join(fixture));
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// `pkg/mod.py` holding `f`, plus two more valid modules with two definitions each.
fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "pkg/mod.py", &format!("import math\n\n\n{ORIGINAL_F}\n\n\nclass K:\n    x = 1\n"));
    write(dir.path(), "pkg/sub/util.py", "def g():\n    return 1\n\n\nasync def h(*args):\n    pass\n");
    write(dir.path(), "top.py", "class A:\n    pass\n\n\nclass B(A):\n    def m(self):\n        pass\n");
    dir
}

fn source_of(root: &Path, qualified_name: &str) -> String {
    match locate_definition_source(root, &Config::default(), qualified_name).unwrap() {
        SourceLookup::Found { text } => text,
        other @ SourceLookup::Unknown { .. } => panic!("expected {qualified_name} to exist: {other}"),
    }
}

#[test]
fn extraction_counts_every_top_level_definition() {
    let dir = sample_tree();
    let records = extract(dir.path(), &Config::default()).unwrap();
    assert_eq!(records.len(), 6, "3 files with 2 definitions each");

    let mut names: Vec<&str> = records.iter().map(|r| r.qualified_name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["pkg.mod.K", "pkg.mod.f", "pkg.sub.util.g", "pkg.sub.util.h", "top.A", "top.B"]);

    let b = find(&records, "top.B").unwrap();
    assert_eq!(b.body.len(), 1, "B has one method");
    assert!(matches!(&b.body[0], ClassMember::Method(m) if m.name == "m"), "B.m recorded");
    assert_eq!(find(&records, "pkg.sub.util.h").unwrap().kind, DefinitionKind::AsyncFunction);
}

#[test]
fn malformed_file_does_not_change_other_counts() {
    let dir = sample_tree();
    let before = extract(dir.path(), &Config::default()).unwrap().len();

    write(dir.path(), "pkg/broken.py", "def nope(:\n    pass\n");
    let after = extract(dir.path(), &Config::default()).unwrap();

    assert_eq!(after.len(), before, "broken file contributes nothing");
    assert!(after.iter().all(|r| r.path != Path::new("pkg/broken.py")), "no records from broken file");
}

#[test]
fn every_record_round_trips_through_find() {
    let dir = sample_tree();
    let records = extract(dir.path(), &Config::default()).unwrap();
    let again = extract(dir.path(), &Config::default()).unwrap();
    for record in &records {
        let found = find(&again, &record.qualified_name).unwrap();
        assert_eq!(found.full_text, record.full_text, "{}", record.qualified_name);
    }
}

#[test]
fn unknown_name_yields_every_valid_name() {
    let dir = sample_tree();
    let lookup = locate_definition_source(dir.path(), &Config::default(), "pkg.mod.missing").unwrap();
    let SourceLookup::Unknown { valid_names, .. } = &lookup else {
        panic!("missing name was found");
    };
    assert_eq!(valid_names.len(), 6, "all names listed");

    let text = lookup.to_string();
    for name in valid_names {
        assert!(text.contains(name.as_str()), "guidance mentions {name}");
    }
}

#[test]
fn replace_then_locate_returns_new_text() {
    let dir = sample_tree();
    let outcome = replace_definition(dir.path(), &Config::default(), "pkg.mod.f", EDITED_F).unwrap();
    assert!(outcome.is_applied(), "replace rejected: {outcome:?}");
    assert_eq!(source_of(dir.path(), "pkg.mod.f"), EDITED_F);
}

#[test]
fn replace_with_invalid_syntax_keeps_original() {
    let dir = sample_tree();
    let before = std::fs::read(dir.path().join("pkg/mod.py")).unwrap();

    let outcome = replace_definition(dir.path(), &Config::default(), "pkg.mod.f", "def f(a, b)\n    return a + b").unwrap();
    assert!(!outcome.is_applied(), "invalid replacement accepted");
    assert!(matches!(outcome, EditOutcome::InvalidSyntax { .. }), "got {outcome:?}");

    assert_eq!(source_of(dir.path(), "pkg.mod.f"), ORIGINAL_F);
    assert_eq!(std::fs::read(dir.path().join("pkg/mod.py")).unwrap(), before, "disk untouched");
}

#[test]
fn replace_and_revert_is_byte_identical() {
    let dir = sample_tree();
    let before = std::fs::read(dir.path().join("pkg/mod.py")).unwrap();

    let forward = replace_definition(dir.path(), &Config::default(), "pkg.mod.f", EDITED_F).unwrap();
    assert!(forward.is_applied(), "forward edit: {forward:?}");
    let back = replace_definition(dir.path(), &Config::default(), "pkg.mod.f", ORIGINAL_F).unwrap();
    assert!(back.is_applied(), "revert edit: {back:?}");

    assert_eq!(std::fs::read(dir.path().join("pkg/mod.py")).unwrap(), before);
}

#[test]
fn replacing_a_class_updates_its_members() {
    let dir = sample_tree();
    let outcome = replace_definition(
        dir.path(),
        &Config::default(),
        "top.B",
        "class B(A):\n    y = 2\n\n    def m(self):\n        return self.y",
    )
    .unwrap();
    assert!(outcome.is_applied(), "class replace: {outcome:?}");

    let records = extract(dir.path(), &Config::default()).unwrap();
    let kinds: Vec<DefinitionKind> = find(&records, "top.B").unwrap().body.iter().map(ClassMember::kind).collect();
    assert_eq!(kinds, vec![DefinitionKind::Assignment, DefinitionKind::Method]);
}

#[test]
fn excluded_directories_are_not_walked() {
    let dir = sample_tree();
    write(dir.path(), ".introspect.toml", "exclude = [\"pkg/sub\"]\n");
    let config = Config::load(dir.path()).unwrap();
    let records = extract(dir.path(), &config).unwrap();
    assert!(records.iter().all(|r| !r.qualified_name.starts_with("pkg.sub.")), "pkg/sub excluded");
    assert_eq!(records.len(), 4, "remaining files still extracted");
}

#[test]
fn scan_limit_is_enforced() {
    let dir = sample_tree();
    let config = Config::parse("max_files = 2").unwrap();
    let err = extract(dir.path(), &config).unwrap_err();
    assert!(matches!(err, introspect::Error::ScanLimitExceeded { max_files: 2, .. }), "got {err:?}");
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract(&dir.path().join("absent"), &Config::default()).unwrap_err();
    assert!(matches!(err, introspect::Error::RootNotFound { .. }), "got {err:?}");
}

#[test]
fn tool_get_source_accepts_plain_text() {
    let dir = sample_tree();
    let out = tool::invoke(dir.path(), &Config::default(), ToolName::GetSource, "pkg.mod.f");
    assert_eq!(out, ORIGINAL_F);
}

#[test]
fn tool_get_source_unknown_suggests_same_name() {
    let dir = sample_tree();
    let out = tool::invoke(dir.path(), &Config::default(), ToolName::GetSource, r#"{"qualified_name": "mod.f"}"#);
    assert!(out.contains("Valid qualified names"), "{out}");
    assert!(out.contains("Did you mean `pkg.mod.f`?"), "{out}");
}

#[test]
fn tool_edit_source_unwraps_fence_and_applies() {
    let dir = sample_tree();
    let input = serde_json::json!({
        "qualified_name": "pkg.mod.f",
        "new_code": format!("```python\n{EDITED_F}\n```"),
    })
    .to_string();
    let out = tool::invoke(dir.path(), &Config::default(), ToolName::EditSource, &input);
    assert!(out.starts_with("Replaced `pkg.mod.f`"), "{out}");
    assert_eq!(source_of(dir.path(), "pkg.mod.f"), EDITED_F);
}

#[test]
fn tool_edit_source_malformed_gives_hint() {
    let dir = sample_tree();
    let out = tool::invoke(dir.path(), &Config::default(), ToolName::EditSource, "pkg.mod.f, def f(): pass");
    assert!(out.contains("Malformed Request"), "{out}");
    assert!(out.contains("qualified_name") && out.contains("new_code"), "{out}");
    assert_eq!(source_of(dir.path(), "pkg.mod.f"), ORIGINAL_F);
}

#[test]
fn tool_summary_lists_definitions() {
    let dir = sample_tree();
    let out = tool::invoke(dir.path(), &Config::default(), ToolName::Summary, "");
    assert!(out.contains("pkg.sub.util.h (async function): h(*args)"), "{out}");
    assert!(out.contains("top.A (class): class A"), "{out}");
}

#[test]
fn cli_lists_fixture_definitions() {
    let output = introspect_cmd("basic").arg("list").output().unwrap();
    assert!(
        output.status.success(),
        "list failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pkg.dummy_module.dummy_function (function): dummy_function(a, b)"), "{stdout}");
    assert!(stdout.contains("pkg.dummy_module.DummyClass (class): class DummyClass"), "{stdout}");
    assert!(stdout.contains("scripts.tasks.run (async function): run(job, retries, **options, 3) - Run a job."), "{stdout}");
    assert!(!stdout.contains("half_written"), "broken file skipped: {stdout}");
    assert!(!stdout.contains("not_python"), "non-python file skipped: {stdout}");
}

#[test]
fn cli_show_prints_definition() {
    let output = introspect_cmd("basic")
        .args(["show", "pkg.dummy_module.dummy_function"])
        .output()
        .unwrap();
    assert!(output.status.success(), "show failed");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "def dummy_function(a, b):\n    pass\n");
}

#[test]
fn cli_show_unknown_exits_nonzero_with_guidance() {
    let output = introspect_cmd("basic").args(["show", "pkg.nope"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pkg.dummy_module.DummyClass"), "{stderr}");
}

#[test]
fn cli_list_json_carries_records() {
    let output = introspect_cmd("basic")
        .args(["list", "--json", "--filter", "dummyclass"])
        .output()
        .unwrap();
    assert!(output.status.success(), "list --json failed");
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let class = &records[0];
    assert_eq!(class["kind"], "class");
    assert_eq!(class["start_line"], 10);
    assert_eq!(class["body"][0]["type"], "expression");
    assert_eq!(class["body"][1]["type"], "assignment");
    assert_eq!(class["body"][3]["decorators"][0], "staticmethod");
}
