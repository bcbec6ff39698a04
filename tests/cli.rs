//! CLI Tests
//!
//! Runs the `zentinel-classify` binary and checks stdout and exit codes.

use std::io::Write;
use std::process::{Command, Output};

fn classify_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zentinel-classify"));
    cmd.env_remove("CLASSIFIER_CONFIG")
        .env_remove("CLASSIFIER_BATCH_WORKERS");
    cmd
}

fn run(args: &[&str]) -> Output {
    classify_bin().args(args).output().expect("Failed to run binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const MALICIOUS_ROW: &str = r#"2024-07-31T00:00:00,177.52.183.80,192.168.1.50,HTTPS,blocked,suspicious,ids,45164,"Mozilla/5.0",/login?backup.sql"#;
const BENIGN_ROW: &str = r#"2024-07-31T00:00:00,177.52.183.80,192.168.1.50,HTTPS,allowed,benign,ids,45164,"Mozilla/5.0",/login"#;

mod classify {
    use super::*;

    #[test]
    fn test_prints_three_lines() {
        let output = run(&["classify", MALICIOUS_ROW]);
        assert!(output.status.success());

        let text = stdout(&output);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3, "{}", text);
        assert_eq!(lines[0], "Activity status: Malicious");
        assert_eq!(lines[1], "Type of attack: Unauthorized backup access");
        assert!(lines[2].starts_with("Reason: "));
    }

    #[test]
    fn test_missing_input() {
        for args in [vec!["classify"], vec!["classify", "   "]] {
            let output = run(&args);
            assert_eq!(output.status.code(), Some(1));
            assert_eq!(
                stdout(&output).trim_end(),
                "Error: No input provided—please pass a single activity row or object."
            );
        }
    }

    #[test]
    fn test_invalid_input_exits_nonzero() {
        let output = run(&["classify", "not,a,row"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stdout(&output).starts_with("Error: Could not parse activity input"));
    }

    #[test]
    fn test_json_output() {
        let output = run(&["classify", "--output", "json", BENIGN_ROW]);
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["status"], "Non-malicious");
        assert_eq!(json["attackType"], "None");
    }

    #[test]
    fn test_config_file() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(config, r#"{{"patterns": {{"scanner-agents": ["zmap"]}}}}"#).unwrap();

        let row = "2024-07-31T00:00:00,1.2.3.4,5.6.7.8,TCP,blocked,benign,fw,0,zmap,/";
        let output = run(&["--config", config.path().to_str().unwrap(), "classify", row]);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Type of attack: Network reconnaissance"));
    }
}

mod batch {
    use super::*;

    #[test]
    fn test_text_output_separated_by_blank_lines() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}\n{}", MALICIOUS_ROW, BENIGN_ROW).unwrap();

        let output = run(&["batch", file.path().to_str().unwrap()]);
        assert!(output.status.success());

        let text = stdout(&output);
        let blocks: Vec<_> = text.split("\n\n").filter(|b| !b.trim().is_empty()).collect();
        assert_eq!(blocks.len(), 2, "{}", text);
        assert!(blocks[0].starts_with("Activity status: Malicious"));
        assert!(blocks[1].starts_with("Activity status: Non-malicious"));
    }

    #[test]
    fn test_json_output_summary() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "header\n{}\n{}", MALICIOUS_ROW, BENIGN_ROW).unwrap();

        let output = run(&[
            "batch",
            "--header",
            "--output",
            "json",
            file.path().to_str().unwrap(),
        ]);
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["summary"]["totalCount"], 2);
        assert_eq!(json["summary"]["maliciousCount"], 1);
        assert_eq!(json["reports"][0]["results"][0]["lineNumber"], 2);
    }

    #[test]
    fn test_unreadable_file_exits_nonzero() {
        let output = run(&["batch", "/nonexistent/events.csv"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stdout(&output).starts_with("Error: "));
    }
}
