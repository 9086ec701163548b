// Record formatting: turns one row of the DSTN response into a labelled
// two-column table in Vietnamese or English.

use crate::error::{DstnError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use unicode_width::UnicodeWidthStr;

/// Key under which the display language is stored in `get_info()`.
pub const LANGUAGE_KEY: &str = "language";

/// Display language of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Vn,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Vn => "vn",
            Language::En => "en",
        }
    }

    /// Ordered (label, field) pairs shown for this language.
    pub fn layout(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::Vn => &VN_LAYOUT,
            Language::En => &EN_LAYOUT,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vn" => Ok(Language::Vn),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language '{}' (expected vn or en)", other)),
        }
    }
}

static VN_LAYOUT: [(&str, &str); 13] = [
    ("Mã sinh viên", "masv"),
    ("Ngày sinh", "ngaysinh"),
    ("Họ và tên", "hoten"),
    ("Bậc", "Bac"),
    ("Tên bậc", "tenbac"),
    ("Mã hệ", "mahe"),
    ("Tên hệ", "tenhe"),
    ("Đợt năm", "dotnam"),
    ("Tên ngành", "tennganh"),
    ("Loại tốt nghiệp", "loaitotnghiep"),
    ("Số bằng", "sobang"),
    ("Số vào sổ", "sovaoso"),
    ("Ngày quyết định", "ngayqd"),
];

static EN_LAYOUT: [(&str, &str); 13] = [
    ("Student ID", "masv"),
    ("Birthday", "ngaysinh"),
    ("Name", "hotenAnh"),
    ("Type", "Bac"),
    ("Type name", "tenbacAnh"),
    ("Type code", "mahe"),
    ("Type code name", "tenheAnh"),
    ("Year", "dotnam"),
    ("Major name", "tennganhAnh"),
    ("Graduation rank", "loaitotnghiepAnh"),
    ("Degree ID", "sobang"),
    ("Degree in book ID", "sovaoso"),
    ("Issue date", "ngayqd"),
];

/// One DSTN row plus the language it should be shown in. Fields are kept
/// verbatim; nothing is checked until the record is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
    language: Language,
}

impl Record {
    pub fn new(json: &Map<String, Value>, language: Language) -> Self {
        let fields = json
            .iter()
            .map(|(key, value)| (key.clone(), value_to_string(value)))
            .collect();
        Record { fields, language }
    }

    /// The upstream row as received, without the language tag.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// All fields of the row plus the `language` entry. A row that already
    /// carries a `language` field loses it here (the tag wins); `fields()`
    /// and `get()` still return the upstream value.
    pub fn get_info(&self) -> BTreeMap<String, String> {
        let mut info = self.fields.clone();
        info.insert(LANGUAGE_KEY.to_string(), self.language.as_str().to_string());
        info
    }

    pub fn get_language(&self) -> Language {
        self.language
    }

    /// Exact key first, then a case-insensitive match (`Bac` vs `bac`).
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(field))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    /// The labelled rows for this record's language.
    pub fn rows(&self) -> Result<Vec<(&'static str, &str)>> {
        self.language
            .layout()
            .iter()
            .map(|(label, field)| {
                self.get(field)
                    .map(|value| (*label, value))
                    .ok_or_else(|| DstnError::MissingField(field.to_string()))
            })
            .collect()
    }

    pub fn render(&self) -> Result<String> {
        Ok(render_table(&self.rows()?))
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Two-column ASCII table with a thin rule between every row:
///
/// ```text
/// +------------+----------+
/// | Student ID | 19120001 |
/// +------------+----------+
/// ```
pub fn render_table(rows: &[(&str, &str)]) -> String {
    let label_width = rows.iter().map(|(l, _)| l.width()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, v)| v.width()).max().unwrap_or(0);
    let rule = format!("+{}+{}+", "-".repeat(label_width + 2), "-".repeat(value_width + 2));

    let mut out = String::new();
    out.push_str(&rule);
    for (label, value) in rows {
        out.push('\n');
        out.push_str(&format!(
            "| {}{} | {}{} |",
            label,
            " ".repeat(label_width - label.width()),
            value,
            " ".repeat(value_width - value.width()),
        ));
        out.push('\n');
        out.push_str(&rule);
    }
    out
}
