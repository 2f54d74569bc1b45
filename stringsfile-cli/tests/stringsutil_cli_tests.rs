use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn stringsutil(dir: &Path, args: &[&str]) -> Output {
    Command::new(assert_cmd::cargo::cargo_bin!("stringsutil"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("STRINGSUTIL_API_KEY")
        .args(args)
        .output()
        .unwrap()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_scan_creates_strings_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(
        dir.join("main.c"),
        "int main(void) {\n  puts(_(\"Hello\"));\n  puts(_(/* Exit */ \"Bye\"));\n  puts(_(\"Hello\"));\n}\n",
    )
    .unwrap();

    let output = stringsutil(dir, &["scan", "-f", "base.strings", "main.c"]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 new strings"));

    let content = fs::read_to_string(dir.join("base.strings")).unwrap();
    assert_eq!(
        content,
        "/* Exit */\n\"Bye\" = \"Bye\";\n\n\"Hello\" = \"Hello\";\n"
    );
}

#[test]
fn test_scan_with_custom_function_and_glob() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/a.c"), "SFSTR(\"One\"); _(\"Ignored\");").unwrap();
    fs::write(dir.join("src/b.c"), "SFSTR(\"Two\");").unwrap();

    let output = stringsutil(
        dir,
        &["scan", "-f", "base.strings", "-n", "SFSTR", "src/*.c"],
    );
    assert_success(&output);

    let content = fs::read_to_string(dir.join("base.strings")).unwrap();
    assert!(content.contains("\"One\" = \"One\";"));
    assert!(content.contains("\"Two\" = \"Two\";"));
    assert!(!content.contains("Ignored"));
}

#[test]
fn test_merge_and_clean() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(
        dir.join("de.strings"),
        "\"Hello\" = \"Hallo\";\n\"Old\" = \"Alt\";\n",
    )
    .unwrap();
    fs::write(
        dir.join("base.strings"),
        "\"Hello\" = \"Hello\";\n/* New */\n\"New\" = \"New\";\n",
    )
    .unwrap();

    let output = stringsutil(dir, &["merge", "-c", "-f", "de.strings", "base.strings"]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 added, 1 removed"));

    let content = fs::read_to_string(dir.join("de.strings")).unwrap();
    assert_eq!(
        content,
        "\"Hello\" = \"Hallo\";\n\n/* New */\n\"New\" = \"New\";\n"
    );
}

#[test]
fn test_export_po_and_import_back() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(
        dir.join("de.strings"),
        "/* Greeting */\n\"Hello\" = \"Hello\";\n\"Yes\" = \"Ja\";\n",
    )
    .unwrap();

    assert_success(&stringsutil(dir, &["export", "-f", "de.strings", "de.po"]));
    let po = fs::read_to_string(dir.join("de.po")).unwrap();
    assert!(po.contains("# Greeting\nmsgid \"Hello\"\nmsgstr \"Hello\"\n"));

    let edited = po.replace("msgstr \"Hello\"", "msgstr \"Hallo\"");
    fs::write(dir.join("de.po"), edited).unwrap();

    let output = stringsutil(dir, &["import", "-f", "de.strings", "de.po"]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 added, 1 modified"));

    let content = fs::read_to_string(dir.join("de.strings")).unwrap();
    assert!(content.contains("\"Hello\" = \"Hallo\";"));
    assert!(content.contains("/* Greeting */"));
}

#[test]
fn test_import_adds_only_with_flag() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("de.strings"), "\"Yes\" = \"Ja\";\n").unwrap();
    fs::write(dir.join("extra.strings"), "\"No\" = \"Nein\";\n").unwrap();

    let output = stringsutil(dir, &["import", "-f", "de.strings", "extra.strings"]);
    assert_success(&output);
    assert!(!fs::read_to_string(dir.join("de.strings")).unwrap().contains("Nein"));

    let output = stringsutil(dir, &["import", "-a", "-f", "de.strings", "extra.strings"]);
    assert_success(&output);
    assert!(fs::read_to_string(dir.join("de.strings")).unwrap().contains("\"No\" = \"Nein\";"));
}

#[test]
fn test_export_header() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("de.strings"), "\"Yes\" = \"Ja\";\n").unwrap();

    assert_success(&stringsutil(dir, &["export", "-f", "de.strings", "de.h"]));
    assert_eq!(
        fs::read_to_string(dir.join("de.h")).unwrap(),
        "static const char *de_strings = \"\\\"Yes\\\" = \\\"Ja\\\";\\n\";\n"
    );
}

#[test]
fn test_report_json() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(
        dir.join("de.strings"),
        "\"Hello\" = \"Hallo\";\n\"Old\" = \"Old\";\n\"%d files\" = \"%s Dateien\";\n",
    )
    .unwrap();
    fs::write(
        dir.join("base.strings"),
        "\"Hello\" = \"Hello\";\n\"New\" = \"New\";\n\"%d files\" = \"%d files\";\n",
    )
    .unwrap();

    let output = stringsutil(dir, &["report", "-f", "de.strings", "base.strings", "--json"]);
    assert_success(&output);

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["summary"]["total"], 3);
    assert_eq!(v["summary"]["translated"], 2);
    assert_eq!(v["untranslated"], serde_json::json!(["Old"]));
    assert_eq!(v["missing"], serde_json::json!(["New"]));
    assert_eq!(v["old"], serde_json::json!(["Old"]));
    assert_eq!(v["mismatched_format"], serde_json::json!(["%d files"]));
}

#[test]
fn test_report_strict_fails_when_incomplete() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("de.strings"), "\"Yes\" = \"Ja\";\n\"No\" = \"No\";\n").unwrap();
    fs::write(dir.join("fr.strings"), "\"Yes\" = \"Oui\";\n").unwrap();

    let output = stringsutil(dir, &["report", "-f", "de.strings", "--strict"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Untranslated: 1"));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .trim_end()
            .ends_with("stringsutil: de.strings is incomplete")
    );

    let output = stringsutil(dir, &["report", "-f", "fr.strings", "--strict"]);
    assert_success(&output);
}

#[test]
fn test_config_file_supplies_strings_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("stringsutil.toml"), "strings_file = \"fr.strings\"\n").unwrap();
    fs::write(dir.join("fr.strings"), "\"Yes\" = \"Oui\";\n").unwrap();

    let output = stringsutil(dir, &["report"]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("=== fr.strings ==="));
    assert!(stdout.contains("Translated: 1 (100.00%)"));
}

#[test]
fn test_translate_with_nothing_to_do() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("de.strings"), "\"Yes\" = \"Ja\";\n").unwrap();

    let output = stringsutil(
        dir,
        &["translate", "-f", "de.strings", "-T", "http://127.0.0.1:9"],
    );
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Translated 0 strings to de"));
}

#[test]
fn test_translate_failure_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let original = "\"Hello %s\" = \"Hello %s\";\n";
    fs::write(dir.join("de.strings"), original).unwrap();

    let output = stringsutil(
        dir,
        &["translate", "-f", "de.strings", "-T", "http://127.0.0.1:9"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("stringsutil: 1 translations failed"));
    assert_eq!(fs::read_to_string(dir.join("de.strings")).unwrap(), original);
}

#[test]
fn test_errors_exit_with_status_1() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let output = stringsutil(dir, &["report"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("stringsutil: No strings file given"));

    fs::write(dir.join("bad.strings"), "\"a\" = \"1\";\n\"b\" = bad;\n").unwrap();
    let output = stringsutil(dir, &["report", "-f", "bad.strings"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .ends_with("stringsutil: Missing text string on line 2.\n")
    );

    fs::write(dir.join("ok.strings"), "\"a\" = \"1\";\n").unwrap();
    let output = stringsutil(dir, &["export", "-f", "ok.strings", "out.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported format"));
}
