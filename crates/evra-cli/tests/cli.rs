use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const VULNERABLE_CONTRACT: &str = r#"
pragma solidity ^0.6.0;

contract Vault {
    address public owner;

    function sweep(address payable to) external {
        to.call.value(address(this).balance)("");
    }

    function shutdown() external {
        selfdestruct(msg.sender);
    }
}
"#;

const SAFE_CONTRACT: &str = r#"
pragma solidity ^0.8.0;

contract Counter {
    uint256 private count;

    function increment() internal {
        count += 1;
    }
}
"#;

/// Command with network and model configuration stripped, so runs stay
/// offline and deterministic regardless of the host environment.
fn evra_cmd() -> Command {
    let mut cmd = Command::cargo_bin("evra-cli").expect("binary should be built");
    cmd.env_remove("ETHERSCAN_API_KEY")
        .env_remove("RPC_URL")
        .env_remove("OPENAI_API_KEY");
    cmd
}

fn contract_file(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(source.as_bytes()).expect("write contract");
    file
}

#[test]
fn local_file_analysis_emits_valid_json() {
    let file = contract_file(VULNERABLE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");

    assert!(parsed.get("contract_address").is_some());
    assert!(parsed.get("chain").is_some());
    assert!(parsed.get("generated_at").is_some());
    assert!(parsed.get("overall_risk").is_some());
    assert!(parsed.get("static_findings").is_some());
    assert!(parsed.get("llm_findings").is_some());
}

#[test]
fn vulnerable_contract_reports_expected_findings() {
    let file = contract_file(VULNERABLE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .output()
        .expect("command should run");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = parsed["static_findings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();

    assert!(ids.contains(&"source:selfdestruct"));
    assert!(ids.contains(&"source:call.value"));
    assert!(ids.contains(&"source:owner"));
    assert!(ids.contains(&"heuristic:missing-nonreentrant"));
    assert!(ids.contains(&"heuristic:missing-onlyowner"));
    assert_eq!(parsed["overall_risk"], "high");
}

#[test]
fn safe_contract_reports_low_risk_and_no_findings() {
    let file = contract_file(SAFE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .output()
        .expect("command should run");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["overall_risk"], "low");
    assert!(parsed["static_findings"].as_array().unwrap().is_empty());
}

#[test]
fn llm_summary_reports_the_skipped_step() {
    let file = contract_file(SAFE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .output()
        .expect("command should run");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        parsed["llm_summary"],
        "LLM summary skipped because OPENAI_API_KEY is not set."
    );
    assert!(parsed["llm_findings"].as_array().unwrap().is_empty());
}

#[test]
fn address_flag_labels_the_report() {
    let file = contract_file(SAFE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .arg("--address")
        .arg("0xdeadbeef")
        .arg("--chain")
        .arg("mainnet")
        .output()
        .expect("command should run");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["contract_address"], "0xdeadbeef");
    assert_eq!(parsed["chain"], "mainnet");
}

#[test]
fn markdown_format_renders_the_fixed_sections() {
    let file = contract_file(VULNERABLE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .arg("--format")
        .arg("markdown")
        .output()
        .expect("command should run");

    let text = String::from_utf8(output.stdout).expect("markdown should be utf-8");
    let offsets: Vec<usize> = [
        "## Summary",
        "## Technical Issues",
        "## AI Findings",
        "## Security Score",
    ]
    .iter()
    .map(|header| text.find(header).expect("section present"))
    .collect();

    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn markdown_shows_score_and_function_names() {
    let file = contract_file(VULNERABLE_CONTRACT);
    evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("Function: `sweep`"))
        .stdout(predicate::str::contains("/ 100**"));
}

#[test]
fn out_flag_writes_to_file() {
    let contract = contract_file(SAFE_CONTRACT);
    let out = NamedTempFile::new().expect("create temp file");

    evra_cmd()
        .arg("--source-file")
        .arg(contract.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let contents = std::fs::read_to_string(out.path()).expect("read output file");
    let parsed: serde_json::Value = serde_json::from_str(&contents).expect("file should be JSON");
    assert_eq!(parsed["overall_risk"], "low");
}

#[test]
fn deterministic_findings_across_runs() {
    let file = contract_file(VULNERABLE_CONTRACT);

    let run = || {
        let output = evra_cmd()
            .arg("--source-file")
            .arg(file.path())
            .output()
            .expect("command should run");
        serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap()
    };

    let first = run();
    let second = run();

    // Everything except the generation timestamp must match.
    assert_eq!(first["static_findings"], second["static_findings"]);
    assert_eq!(first["overall_risk"], second["overall_risk"]);
    assert_eq!(first["llm_summary"], second["llm_summary"]);
}

#[test]
fn expected_flags_drive_the_fixture_evaluation_mode() {
    let contract = contract_file(VULNERABLE_CONTRACT);
    let expected = contract_file(r#"["source:selfdestruct", "source:delegatecall"]"#);

    evra_cmd()
        .arg("--source-file")
        .arg(contract.path())
        .arg("--expected")
        .arg(expected.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("# Exploit Fixture Evaluation"))
        .stdout(predicate::str::contains("Detected 1 of 2 expected findings."))
        .stdout(predicate::str::contains("## Missed\n- `source:delegatecall`"));
}

#[test]
fn expected_flag_without_source_file_fails() {
    evra_cmd()
        .arg("--expected")
        .arg("/tmp/expected.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--source-file"));
}

#[test]
fn missing_address_without_source_file_fails() {
    evra_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--address is required"));
}

#[test]
fn nonexistent_source_file_fails() {
    evra_cmd()
        .arg("--source-file")
        .arg("/tmp/does_not_exist_evra_test.sol")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn invalid_format_flag_fails() {
    let file = contract_file(SAFE_CONTRACT);
    evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn help_flag_prints_usage() {
    evra_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Risk analysis for EVM smart contracts",
        ));
}

#[test]
fn version_flag_prints_version() {
    evra_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("evra"));
}

#[test]
fn default_format_is_json() {
    let file = contract_file(SAFE_CONTRACT);
    let output = evra_cmd()
        .arg("--source-file")
        .arg(file.path())
        .output()
        .expect("command should run");

    serde_json::from_slice::<serde_json::Value>(&output.stdout)
        .expect("default output should be valid JSON");
}
