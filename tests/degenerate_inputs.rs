use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gpacalcd");
    let mut child = Command::new(exe)
        .env_remove("GPACALCD_SCALE")
        .env_remove("GPACALCD_SCALE_FILE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gpacalcd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn result_of(value: &serde_json::Value, method: &str) -> serde_json::Value {
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn empty_and_zero_credit_semesters_report_zero_gpa() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let empty = result_of(
        &request(&mut stdin, &mut reader, "1", "gpa.semester", json!({ "rows": [] })),
        "gpa.semester",
    );
    assert_eq!(empty["summary"]["gpa"].as_f64(), Some(0.0));
    assert_eq!(empty["summary"]["totalCredits"].as_f64(), Some(0.0));

    let missing = result_of(
        &request(&mut stdin, &mut reader, "2", "gpa.semester", json!({})),
        "gpa.semester",
    );
    assert_eq!(missing["summary"]["gpa"].as_f64(), Some(0.0));

    let zeroed = result_of(
        &request(
            &mut stdin,
            &mut reader,
            "3",
            "gpa.semester",
            json!({ "rows": [
                { "name": "Audit", "marks": 99, "creditHours": 0 },
                { "name": "Seminar", "marks": 80, "creditHours": -2 }
            ] }),
        ),
        "gpa.semester",
    );
    assert_eq!(zeroed["summary"]["gpa"].as_f64(), Some(0.0));
    assert_eq!(zeroed["summary"]["totalCredits"].as_f64(), Some(0.0));
    assert_eq!(zeroed["rows"][1]["creditHours"].as_f64(), Some(0.0));

    let _ = child.kill();
}

#[test]
fn garbage_numbers_degrade_instead_of_failing() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let report = result_of(
        &request(
            &mut stdin,
            &mut reader,
            "1",
            "gpa.cgpa",
            json!({
                "rows": [
                    { "name": "Math", "marks": "ninety", "creditHours": "3" },
                    { "name": "Art", "marks": 250, "creditHours": null },
                    { "name": "Music", "marks": "88.5", "creditHours": 3 }
                ],
                "prior": { "cgpa": "x", "totalCredits": "12" }
            }),
        ),
        "gpa.cgpa",
    );
    let rows = report["semester"]["rows"].as_array().expect("rows");
    assert_eq!(rows[0]["marks"].as_f64(), Some(0.0));
    assert_eq!(rows[0]["letter"], "F");
    assert_eq!(rows[1]["marks"].as_f64(), Some(100.0));
    assert_eq!(rows[1]["creditHours"].as_f64(), Some(0.0));
    assert_eq!(rows[2]["gradePoint"].as_f64(), Some(4.0));
    assert_eq!(report["semester"]["summary"]["gpa"].as_f64(), Some(2.0));
    assert_eq!(report["updated"]["state"]["totalCredits"].as_f64(), Some(18.0));
    let cgpa = report["updated"]["state"]["cgpa"].as_f64().expect("cgpa");
    assert!((cgpa - 12.0 / 18.0).abs() < 1e-9);

    let _ = child.kill();
}

#[test]
fn structural_errors_are_bad_params() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let not_array = request(
        &mut stdin,
        &mut reader,
        "1",
        "gpa.semester",
        json!({ "rows": "Math,92,3" }),
    );
    assert_eq!(not_array["ok"], false);
    assert_eq!(not_array["error"]["code"], "bad_params");

    let bad_prior = request(
        &mut stdin,
        &mut reader,
        "2",
        "gpa.cgpa",
        json!({ "rows": [], "prior": 3.2 }),
    );
    assert_eq!(bad_prior["error"]["code"], "bad_params");

    let no_current = request(
        &mut stdin,
        &mut reader,
        "3",
        "gpa.combine",
        json!({ "prior": { "cgpa": 3.0, "totalCredits": 30 } }),
    );
    assert_eq!(no_current["error"]["code"], "bad_params");

    let too_many: Vec<serde_json::Value> = (0..65)
        .map(|i| json!({ "name": format!("C{}", i), "marks": 70, "creditHours": 1 }))
        .collect();
    let oversized = request(
        &mut stdin,
        &mut reader,
        "4",
        "gpa.semester",
        json!({ "rows": too_many }),
    );
    assert_eq!(oversized["error"]["code"], "bad_params");

    let _ = child.kill();
}

#[test]
fn huge_credit_values_keep_results_numeric() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let report = result_of(
        &request(
            &mut stdin,
            &mut reader,
            "1",
            "gpa.cgpa",
            json!({
                "rows": [
                    { "name": "Math", "marks": 90, "creditHours": 1e308 },
                    { "name": "Physics", "marks": 90, "creditHours": 1e308 }
                ],
                "prior": { "cgpa": 3.0, "totalCredits": 1e308 }
            }),
        ),
        "gpa.cgpa",
    );
    assert_eq!(report["semester"]["summary"]["gpa"].as_f64(), Some(4.0));
    assert_eq!(report["semester"]["rows"][0]["creditHours"].as_f64(), Some(1000.0));
    assert_eq!(report["semester"]["summary"]["totalCredits"].as_f64(), Some(2000.0));
    let cgpa = report["updated"]["state"]["cgpa"].as_f64().expect("cgpa is a number");
    assert!((cgpa - (3.0 * 1000.0 + 4.0 * 2000.0) / 3000.0).abs() < 1e-9);
    assert_eq!(report["updated"]["state"]["totalCredits"].as_f64(), Some(3000.0));

    let _ = child.kill();
}

#[test]
fn boolean_numbers_count_as_zero() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let report = result_of(
        &request(
            &mut stdin,
            &mut reader,
            "1",
            "gpa.semester",
            json!({ "rows": [
                { "name": "Flagged", "marks": true, "creditHours": true },
                { "name": "Real", "marks": 72, "creditHours": 3 }
            ] }),
        ),
        "gpa.semester",
    );
    assert_eq!(report["rows"][0]["marks"].as_f64(), Some(0.0));
    assert_eq!(report["rows"][0]["creditHours"].as_f64(), Some(0.0));
    assert_eq!(report["summary"]["totalCredits"].as_f64(), Some(3.0));
    assert_eq!(report["summary"]["gpa"].as_f64(), Some(3.0));

    let _ = child.kill();
}
