// Student queries and the header-less two-column CSV file they are read
// from in batch mode.

use crate::error::{DstnError, Result};
use std::io::Read;
use std::path::Path;

/// A single lookup: the student's full name or ID, and the degree number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentQuery {
    pub name: String,
    pub degree_id: String,
}

impl StudentQuery {
    pub fn new(name: impl Into<String>, degree_id: impl Into<String>) -> Self {
        StudentQuery {
            name: name.into(),
            degree_id: degree_id.into(),
        }
    }
}

/// Load the batch file at `path`.
pub fn load_students(path: &Path) -> Result<Vec<StudentQuery>> {
    let file = std::fs::File::open(path).map_err(|source| DstnError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_students(file)
}

/// Parse `name,degree_id` rows. Blank rows are skipped, rows with a
/// single column are rejected, extra columns are ignored.
pub fn read_students<R: Read>(reader: R) -> Result<Vec<StudentQuery>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut students = vec![];
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }
        if row.len() < 2 {
            return Err(DstnError::InvalidRow {
                line,
                reason: format!("expected name and degree ID, found {} column", row.len()),
            });
        }
        if row.len() > 2 {
            log::warn!("Line {}: ignoring {} extra column(s)", line, row.len() - 2);
        }
        students.push(StudentQuery::new(&row[0], &row[1]));
    }
    Ok(students)
}
