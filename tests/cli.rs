mod common;

use std::fs;

use assert_cmd::Command;
use common::TestWorkspace;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::Value;

const SALES_CSV: &str = "\
Data;Produto;Qtd;Preço;Estoque
10/01/2024;Widget;10;9,90;5
11/01/2024;Widget;2;9,90;
12/01/2024;Gadget;1;120,00;3
";

const MAPPING_YAML: &str = "\
date: Data
product: Produto
quantity: Qtd
price: Preço
stock: Estoque
";

#[test]
fn check_accepts_a_clean_upload_and_writes_records() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.csv", SALES_CSV);
    let mapping = ws.write("mapping.yml", MAPPING_YAML);
    let output = ws.path().join("accepted.json");

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--delimiter",
            ";",
            "--decimal-separator",
            ",",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            contains("3 accepted")
                .and(contains("Verdict: VALID"))
                .and(contains("[date_range]")),
        );

    let records: Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read output")).expect("json");
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["date"], "2024-01-10");
    assert_eq!(records[0]["price"], 9.9);
    assert_eq!(records[0]["stock"], 5);
    assert!(records[1].get("stock").is_none());
}

#[test]
fn check_reports_rejected_rows_and_exits_with_two() {
    let ws = TestWorkspace::new();
    let input = ws.write(
        "sales.csv",
        "date,product,quantity,price\n2024-01-10,Widget,0,1\n2024-01-11,,1,1\n",
    );
    let mapping = ws.write(
        "mapping.yml",
        "date: date\nproduct: product\nquantity: quantity\nprice: price\n",
    );
    let output = ws.path().join("accepted.json");

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stdout(
            contains("2 rejected")
                .and(contains("row 1 field 'quantity'"))
                .and(contains("Verdict: INVALID")),
        );
    assert!(!output.exists());
}

#[test]
fn check_json_output_carries_both_stages() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.csv", SALES_CSV);
    let mapping = ws.write("mapping.yml", MAPPING_YAML);

    let assert = Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--delimiter",
            "semicolon",
            "--decimal-separator",
            "comma",
            "--json",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let report: Value = serde_json::from_str(&stdout).expect("json report");
    assert_eq!(report["transform"]["stats"]["total_rows"], 3);
    assert_eq!(report["verdict"]["valid"], true);
    assert_eq!(report["verdict"]["stats"]["unique_products"], 2);
    let kinds: Vec<_> = report["verdict"]["warnings"]
        .as_array()
        .expect("warnings")
        .iter()
        .map(|w| w["type"].as_str().unwrap().to_string())
        .collect();
    assert!(kinds.contains(&"low_data".to_string()));
}

#[test]
fn check_refuses_inputs_over_the_row_cap() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.csv", SALES_CSV);
    let mapping = ws.write("mapping.yml", MAPPING_YAML);

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--delimiter",
            ";",
            "--max-rows",
            "2",
        ])
        .assert()
        .code(1)
        .stderr(contains("above the configured limit of 2"));
}

#[test]
fn check_refuses_files_over_the_size_cap_before_parsing() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.csv", SALES_CSV);
    let mapping = ws.write("mapping.yml", MAPPING_YAML);

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--max-file-bytes",
            "32",
        ])
        .assert()
        .code(1)
        .stderr(contains("above the upload limit of 32 B"));
}

#[test]
fn check_refuses_unsupported_file_types() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.xlsx", SALES_CSV);
    let mapping = ws.write("mapping.yml", MAPPING_YAML);

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(contains("file extension 'xlsx' is not accepted"));
}

#[test]
fn thresholds_file_can_silence_warnings() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.csv", SALES_CSV);
    let mapping = ws.write("mapping.yml", MAPPING_YAML);
    let thresholds = ws.write(
        "thresholds.yml",
        "min_history_days: 1\nmin_rows_per_product: 1\nmin_unique_products: 1\n",
    );

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "-m",
            mapping.to_str().unwrap(),
            "--delimiter",
            ";",
            "--decimal-separator",
            ",",
            "--thresholds",
            thresholds.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("Warnings:").not());
}

#[test]
fn mapping_template_guesses_columns() {
    let ws = TestWorkspace::new();
    let input = ws.write("sales.csv", SALES_CSV);

    Command::cargo_bin("sales-ingest")
        .expect("binary exists")
        .args([
            "mapping-template",
            "-i",
            input.to_str().unwrap(),
            "--delimiter",
            ";",
        ])
        .assert()
        .success()
        .stdout(
            contains("date: Data")
                .and(contains("product: Produto"))
                .and(contains("stock: Estoque")),
        );
}
