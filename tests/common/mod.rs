// Shared fixtures for the end-to-end tests.

use dstn_check::config::Config;
use serde_json::{json, Value};
use std::path::Path;

pub const API_PATH: &str = "/api/dstn";

/// Write a JSON config pointing at `server_url` and load it the way the
/// binary does, minus the `DSTN_*` environment overrides.
pub fn write_config(dir: &Path, server_url: &str) -> Config {
    let path = dir.join("config.json");
    let body = json!({
        "api_url": format!("{}{}", server_url, API_PATH),
        "headers": {"User-Agent": "dstn-check-test"},
        "results": {"rows": 10, "page": 1, "sord": "desc"},
        "timeout_secs": 5
    });
    std::fs::write(&path, body.to_string()).unwrap();
    Config::load_with(&path, |_| None).unwrap()
}

/// A complete DSTN row as the upstream returns it.
pub fn student_row(masv: &str, sobang: &str) -> Value {
    json!({
        "masv": masv,
        "ngaysinh": "12/03/2000",
        "hoten": "Nguyễn Văn A",
        "hotenAnh": "Nguyen Van A",
        "Bac": "DH",
        "tenbac": "Đại học",
        "tenbacAnh": "Bachelor of Science",
        "mahe": "CLC",
        "tenhe": "Chất lượng cao",
        "tenheAnh": "High-quality",
        "dotnam": "2022",
        "tennganh": "Khoa học máy tính",
        "tennganhAnh": "Computer Science",
        "loaitotnghiep": "Xuất sắc",
        "loaitotnghiepAnh": "Excellent",
        "sobang": sobang,
        "sovaoso": "QWER/4821",
        "ngayqd": "30/09/2022"
    })
}

pub fn found_body(rows: Vec<Value>) -> String {
    json!({"total": rows.len(), "rows": rows}).to_string()
}

pub fn not_found_body() -> String {
    json!({"total": 0, "rows": []}).to_string()
}
