//! Tests for argument handling and command dispatch through [`crate::run`].

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::run;

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn path(&self, relative: &str) -> String {
        self.root.join(relative).into_string()
    }
}

#[fixture]
fn project() -> Project {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8Path::from_path(dir.path()).expect("utf8").to_path_buf();
    for (path, text) in [
        (
            "quarry.yml",
            concat!(
                "rules:\n",
                "  - id: no-eval\n",
                "    pattern: call(identifier(\"eval\"), ...)\n",
                "    message: avoid eval\n",
                "  - id: no-exec\n",
                "    pattern: call(identifier(\"exec\"), ...)\n",
                "    message: avoid exec\n",
                "    include: [\"scripts/**\"]\n",
                "exclude:\n",
                "  - \"vendor/**\"\n",
            ),
        ),
        ("app.py", "eval(data)\nexec(code)\n"),
        ("scripts/tool.py", "exec(code)\n"),
        ("vendor/lib.py", "eval(data)\n"),
        ("broken.py", "def (:\n"),
    ] {
        let file = root.join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&file, text).expect("write");
    }
    Project { _dir: dir, root }
}

struct Outcome {
    code: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str]) -> Outcome {
    let argv = std::iter::once("quarry")
        .chain(args.iter().copied())
        .map(OsString::from);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(argv, &mut stdout, &mut stderr);
    Outcome {
        code,
        stdout: String::from_utf8(stdout).expect("utf8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf8 stderr"),
    }
}

#[test]
fn version_prints_the_package_version() {
    let outcome = invoke(&["version"]);
    assert_eq!(outcome.code, ExitCode::SUCCESS);
    assert_eq!(
        outcome.stdout,
        format!("quarry {}\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn help_goes_to_stdout() {
    let outcome = invoke(&["--help"]);
    assert_eq!(outcome.code, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("check"));
    assert!(outcome.stderr.is_empty());
}

#[rstest]
#[case(&[])]
#[case(&["lint"])]
#[case(&["check", "--format", "xml"])]
fn usage_errors_fail(#[case] args: &[&str]) {
    let outcome = invoke(args);
    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("--help"), "{}", outcome.stderr);
}

#[rstest]
fn check_reports_issues_and_load_failures(project: Project) {
    let config = project.path("quarry.yml");
    let outcome = invoke(&["--config", &config, "check", project.root.as_str()]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    let lines: Vec<&str> = outcome.stdout.lines().collect();
    let [failure, eval, exec] = lines.as_slice() else {
        panic!("expected three lines, got {lines:?}");
    };
    assert!(failure.contains("broken.py\terror: syntax error"), "{failure}");
    assert!(eval.ends_with("\teval(data)\tavoid eval (no-eval)"), "{eval}");
    assert!(exec.contains("scripts/tool.py:1:1"), "{exec}");
    assert!(exec.ends_with("(no-exec)"), "{exec}");
}

#[rstest]
fn rule_selection_limits_the_run(project: Project) {
    let config = project.path("quarry.yml");
    let app = project.path("app.py");
    let outcome = invoke(&["--config", &config, "check", "--rule", "no-exec", &app]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.is_empty(), "{}", outcome.stdout);
}

#[rstest]
fn unknown_rule_selection_fails(project: Project) {
    let config = project.path("quarry.yml");
    let outcome = invoke(&["--config", &config, "check", "--rule", "nope"]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert_eq!(outcome.stderr, "error: unknown rule 'nope'\n");
}

#[rstest]
fn missing_rule_file_fails(project: Project) {
    let config = project.path("missing.yml");
    let outcome = invoke(&["--config", &config, "check"]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("rule file not found"), "{}", outcome.stderr);
    assert!(outcome.stdout.is_empty());
}

#[rstest]
fn invalid_patterns_fail_before_any_script_is_read(project: Project) {
    let config = project.path("bad.yml");
    fs::write(
        &config,
        "rules:\n  - id: broken\n    pattern: call(...,\n    message: never\n",
    )
    .expect("write");
    let outcome = invoke(&["--config", &config, "check", project.root.as_str()]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("rule 'broken'"), "{}", outcome.stderr);
    assert!(outcome.stdout.is_empty());
}

#[rstest]
fn rules_lists_selected_rules(project: Project) {
    let config = project.path("quarry.yml");
    let outcome = invoke(&["--config", &config, "rules", "no-exec"]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.starts_with("no-exec\n"), "{}", outcome.stdout);
    assert!(!outcome.stdout.contains("no-eval"));
}

#[rstest]
fn json_format_writes_one_document(project: Project) {
    let config = project.path("quarry.yml");
    let app = project.path("app.py");
    let outcome = invoke(&["--config", &config, "check", "--format", "json", &app]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    let report: serde_json::Value = serde_json::from_str(&outcome.stdout).expect("json");
    let issues = report["issues"].as_array().expect("issues");
    assert_eq!(issues.len(), 1);
    assert_eq!(report["errors"], serde_json::json!([]));
}

#[rstest]
fn test_passes_when_every_rule_compiles(project: Project) {
    let config = project.path("quarry.yml");
    let outcome = invoke(&["--config", &config, "test"]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, "2 rules checked, 0 errors\n");
}

#[rstest]
fn test_reports_every_rule_error(project: Project) {
    let config = project.path("bad.yml");
    fs::write(
        &config,
        concat!(
            "exclude: [\"vendor/[\"]\n",
            "rules:\n",
            "  - id: broken\n",
            "    pattern: call(...,\n",
            "    message: never\n",
            "  - id: fine\n",
            "    pattern: call\n",
            "    message: ok\n",
            "  - id: broken\n",
            "    pattern: [\"call(..., x)\"]\n",
            "    message: again\n",
        ),
    )
    .expect("write");
    let outcome = invoke(&["--config", &config, "test"]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(outcome.stderr.is_empty(), "{}", outcome.stderr);
    let lines: Vec<&str> = outcome.stdout.lines().collect();
    let [first, duplicate, second, glob, summary] = lines.as_slice() else {
        panic!("expected five lines, got {lines:?}");
    };
    assert!(first.starts_with("error: rule 'broken': invalid pattern `call(...,`"), "{first}");
    assert_eq!(*duplicate, "error: duplicate rule id 'broken'");
    assert!(second.starts_with("error: rule 'broken': invalid pattern `call(..., x)`"), "{second}");
    assert!(glob.starts_with("error: rule 'exclude': invalid glob `vendor/[`"), "{glob}");
    assert_eq!(*summary, "3 rules checked, 4 errors");
}

#[rstest]
fn language_selection_skips_other_grammars(project: Project) {
    let config = project.path("quarry.yml");
    fs::write(project.root.join("main.rs"), "fn main() {}\n").expect("write");
    let outcome = invoke(&[
        "--config",
        &config,
        "check",
        "--language",
        "rust",
        project.root.as_str(),
    ]);

    assert_eq!(outcome.code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.is_empty(), "{}", outcome.stdout);
}

#[test]
fn unknown_languages_are_usage_errors() {
    let outcome = invoke(&["check", "--language", "ruby"]);

    assert_eq!(outcome.code, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("unsupported language: 'ruby'"),
        "{}",
        outcome.stderr
    );
}
