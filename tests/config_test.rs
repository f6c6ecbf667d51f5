use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CLIENT_SUMMARY: &str = r#"{
    "domain": "client.com",
    "performance": { "load": 3100, "domContentLoaded": 1500, "firstPaint": 900 }
}"#;

const RIVAL_SUMMARY: &str = r#"{
    "domain": "rival.com",
    "performance": { "load": 2500, "domContentLoaded": 1400, "firstPaint": 850 }
}"#;

fn write_site_data(dir: &Path) {
    fs::write(dir.join("client.com.json"), CLIENT_SUMMARY).unwrap();
    fs::write(dir.join("rival.com.json"), RIVAL_SUMMARY).unwrap();
}

fn run_with_config(config_path: &Path, extra_args: &[&str]) -> std::process::Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_rivalscope"))
        .arg("client.com")
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(extra_args)
        .output()
        .expect("Failed to execute command")
}

fn parse_report(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report")
}

#[test]
fn test_cli_with_json_config() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.json");

    let json_content = format!(
        r#"{{
        "source": "{}",
        "competitors": ["rival.com"],
        "output": "json",
        "start_date": "2024-01-01"
    }}"#,
        dir.path().display()
    );
    fs::write(&config_path, json_content).unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(output.status.success());

    let report = parse_report(&output);
    assert_eq!(report["client"], "client.com");
    assert_eq!(report["competitors"][0], "rival.com");
    assert_eq!(report["strategy"]["timeline"]["startDate"], "2024-01-01");
}

#[test]
fn test_cli_with_toml_config() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.toml");

    let toml_content = format!(
        r#"
source = "{}"
competitors = ["rival.com"]
output = "json"
months = 3
start_date = "2024-01-01"
"#,
        dir.path().display()
    );
    fs::write(&config_path, toml_content).unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(output.status.success());

    let report = parse_report(&output);
    assert_eq!(report["strategy"]["timeline"]["endDate"], "2024-04-01");
    assert_eq!(
        report["strategy"]["roiProjection"]["months"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn test_cli_with_yaml_config() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.yaml");

    let yaml_content = format!(
        r#"
source: "{}"
competitors:
  - rival.com
output: json
"#,
        dir.path().display()
    );
    fs::write(&config_path, yaml_content).unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(output.status.success());

    let report = parse_report(&output);
    let gaps = report["gapAnalysis"]["gaps"]["performance"]
        .as_array()
        .unwrap();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0]["title"], "Slow Page Load Time");
}

#[test]
fn test_cli_with_yml_config() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.yml");

    let yaml_content = format!(
        "source: \"{}\"\ncompetitors: [rival.com]\noutput: json\n",
        dir.path().display()
    );
    fs::write(&config_path, yaml_content).unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(output.status.success());
}

#[test]
fn test_cli_with_invalid_config_format() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.txt");
    fs::write(&config_path, "source = \".\"").unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config file"));
}

#[test]
fn test_cli_with_invalid_json_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, "{ invalid json }").unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_with_invalid_toml_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "months = [not valid").unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_with_invalid_yaml_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "months: [1, 2\noutput: json").unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_with_nonexistent_config() {
    let output = run_with_config(Path::new("/nonexistent/rivalscope.toml"), &[]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_args_override_config() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.toml");

    // Config lists an unknown competitor and a longer timeline
    let toml_content = format!(
        r#"
source = "{}"
competitors = ["unknown.com"]
months = 12
"#,
        dir.path().display()
    );
    fs::write(&config_path, toml_content).unwrap();

    let output = run_with_config(
        &config_path,
        &[
            "--competitor",
            "rival.com",
            "--months",
            "2",
            "--output",
            "json",
            "--start-date",
            "2024-01-01",
        ],
    );
    assert!(output.status.success());

    let report = parse_report(&output);
    assert_eq!(report["competitors"][0], "rival.com");
    assert!(report["skippedCompetitors"].as_array().unwrap().is_empty());
    assert_eq!(report["strategy"]["timeline"]["endDate"], "2024-03-01");
}

#[test]
fn test_config_with_unknown_competitor_is_skipped() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.json");

    let json_content = format!(
        r#"{{
        "source": "{}",
        "competitors": ["rival.com", "unknown.com"],
        "output": "json"
    }}"#,
        dir.path().display()
    );
    fs::write(&config_path, json_content).unwrap();

    let output = run_with_config(&config_path, &[]);
    assert!(output.status.success());

    let report = parse_report(&output);
    assert_eq!(report["competitors"].as_array().unwrap().len(), 1);
    assert_eq!(report["skippedCompetitors"][0], "unknown.com");
}

#[test]
fn test_empty_config() {
    let dir = tempdir().unwrap();
    write_site_data(dir.path());
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, "{}").unwrap();

    // Everything comes from the command line
    let output = run_with_config(
        &config_path,
        &[
            "--source",
            dir.path().to_str().unwrap(),
            "--output",
            "json",
        ],
    );
    assert!(output.status.success());

    let report = parse_report(&output);
    assert!(report["competitors"].as_array().unwrap().is_empty());
    let overall = report["gapAnalysis"]["scores"]["overall"].as_f64().unwrap();
    assert!((overall - 100.0).abs() < 1e-9);
}
