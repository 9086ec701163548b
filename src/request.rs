// Request handlers: single lookups that return formatted records, and
// batch lookups that return a status per student. Both recover from
// not-found and HTTP errors locally and never abort the run.

use crate::api::{ApiClient, FetchOutcome, HttpFailure};
use crate::record::{Language, Record};
use crate::students::StudentQuery;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where single-mode HTTP error bodies are written.
pub const SINGLE_LOG: &str = "error_single.html";
/// Where batch-mode HTTP error bodies are written.
pub const MULTIPLE_LOG: &str = "error_multiple.html";

/// Overwrites a fixed file with the body of the latest HTTP failure.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ErrorLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, failure: &HttpFailure) -> std::io::Result<()> {
        std::fs::write(&self.path, &failure.body)
    }
}

/// Receives user-facing diagnostics (not found, HTTP errors). The UI swaps
/// it out so messages do not tear through a spinner or progress bar.
pub type Reporter = Box<dyn Fn(&str)>;

fn stderr_reporter() -> Reporter {
    Box::new(|msg| eprintln!("{}", msg))
}

/// Report an HTTP failure and persist its body. A log that cannot be
/// written is only worth a warning.
fn report_failure(reporter: &Reporter, error_log: &ErrorLog, context: &str, failure: &HttpFailure) {
    reporter(&format!("{}{}", context, failure));
    match error_log.record(failure) {
        Ok(()) => reporter(&format!("Response logged to {}", error_log.path().display())),
        Err(e) => log::warn!("Could not write error log {}: {}", error_log.path().display(), e),
    }
}

/// Looks up one student and formats every matching row.
pub struct SingleRequest {
    client: ApiClient,
    query: StudentQuery,
    language: Language,
    error_log: ErrorLog,
    reporter: Reporter,
}

impl SingleRequest {
    pub fn new(client: ApiClient, query: StudentQuery, language: Language) -> Self {
        SingleRequest {
            client,
            query,
            language,
            error_log: ErrorLog::new(SINGLE_LOG),
            reporter: stderr_reporter(),
        }
    }

    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log = ErrorLog::new(path);
        self
    }

    pub fn with_reporter<F: Fn(&str) + 'static>(mut self, reporter: F) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Empty when nothing matched or the request failed; the reason has
    /// already been reported.
    pub fn process(&self) -> Vec<Record> {
        match self.client.fetch(&self.query) {
            FetchOutcome::Found(rows) => rows
                .iter()
                .map(|row| Record::new(row, self.language))
                .collect(),
            FetchOutcome::NotFound => {
                (self.reporter)("No results found");
                vec![]
            }
            FetchOutcome::HttpError(failure) => {
                report_failure(&self.reporter, &self.error_log, "", &failure);
                vec![]
            }
        }
    }
}

/// Outcome of one batch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Valid,
    Invalid,
    /// The lookup itself failed, so validity is unknown.
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Valid => "VALID",
            Status::Invalid => "INVALID",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    pub name: String,
    pub degree_id: String,
    pub status: Status,
}

impl StatusResult {
    /// `[name, degree_id, status]`, the CSV row layout.
    pub fn to_row(&self) -> [&str; 3] {
        [self.name.as_str(), self.degree_id.as_str(), self.status.as_str()]
    }
}

/// Per-status totals of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub valid: usize,
    pub invalid: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_results(results: &[StatusResult]) -> Self {
        results.iter().fold(Summary::default(), |mut acc, r| {
            match r.status {
                Status::Valid => acc.valid += 1,
                Status::Invalid => acc.invalid += 1,
                Status::Error => acc.errors += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.errors
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checked: {} valid, {} invalid, {} error(s)",
            self.total(),
            self.valid,
            self.invalid,
            self.errors
        )
    }
}

/// Checks a list of students one after another with a shared client.
pub struct ListRequest {
    client: ApiClient,
    students: Vec<StudentQuery>,
    error_log: ErrorLog,
    reporter: Reporter,
}

impl ListRequest {
    pub fn new(client: ApiClient, students: Vec<StudentQuery>) -> Self {
        ListRequest {
            client,
            students,
            error_log: ErrorLog::new(MULTIPLE_LOG),
            reporter: stderr_reporter(),
        }
    }

    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log = ErrorLog::new(path);
        self
    }

    pub fn with_reporter<F: Fn(&str) + 'static>(mut self, reporter: F) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn process(&self) -> Vec<StatusResult> {
        self.process_with(|_| {})
    }

    /// Same as `process`, calling `on_result` as soon as each entry is
    /// resolved. Results keep input order; failed lookups are `ERROR`.
    pub fn process_with<F>(&self, mut on_result: F) -> Vec<StatusResult>
    where
        F: FnMut(&StatusResult),
    {
        let mut results = Vec::with_capacity(self.students.len());
        for (idx, student) in self.students.iter().enumerate() {
            log::debug!("[{}/{}] checking {}", idx + 1, self.students.len(), student.name);
            let status = match self.client.fetch(student) {
                FetchOutcome::Found(_) => Status::Valid,
                FetchOutcome::NotFound => Status::Invalid,
                FetchOutcome::HttpError(failure) => {
                    let context = format!("{}/{}: ", student.name, student.degree_id);
                    report_failure(&self.reporter, &self.error_log, &context, &failure);
                    Status::Error
                }
            };
            let result = StatusResult {
                name: student.name.clone(),
                degree_id: student.degree_id.clone(),
                status,
            };
            on_result(&result);
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FailureKind;
    use crate::config::{Config, ResultParams};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn result(name: &str, status: Status) -> StatusResult {
        StatusResult {
            name: name.to_string(),
            degree_id: format!("{}-ID", name),
            status,
        }
    }

    #[test]
    fn status_text() {
        assert_eq!(Status::Valid.to_string(), "VALID");
        assert_eq!(Status::Invalid.to_string(), "INVALID");
        assert_eq!(Status::Error.to_string(), "ERROR");
    }

    #[test]
    fn row_layout_is_name_degree_status() {
        let r = result("Name1", Status::Valid);
        assert_eq!(r.to_row(), ["Name1", "Name1-ID", "VALID"]);
    }

    #[test]
    fn summary_counts_each_status() {
        let results = vec![
            result("a", Status::Valid),
            result("b", Status::Invalid),
            result("c", Status::Valid),
            result("d", Status::Error),
        ];
        let summary = Summary::from_results(&results);
        assert_eq!(
            summary,
            Summary {
                valid: 2,
                invalid: 1,
                errors: 1
            }
        );
        assert_eq!(summary.to_string(), "4 checked: 2 valid, 1 invalid, 1 error(s)");
    }

    fn client_for(server: &mockito::Server) -> ApiClient {
        let config = Config {
            api_url: format!("{}/api", server.url()),
            headers: Default::default(),
            results: ResultParams {
                rows: 10,
                page: 1,
                sord: "desc".into(),
            },
            timeout_secs: 5,
        };
        ApiClient::new(&config).unwrap()
    }

    fn capture() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) + 'static) {
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = Rc::clone(&seen);
        (seen, move |msg: &str| sink.borrow_mut().push(msg.to_string()))
    }

    #[test]
    fn error_log_overwrites_previous_body() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error.html"));
        log.record(&HttpFailure::new(FailureKind::Status(500), "first body, quite long")).unwrap();
        log.record(&HttpFailure::new(FailureKind::Status(502), "second")).unwrap();
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "second");
    }

    #[test]
    fn unwritable_error_log_is_only_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("missing").join("error.html"));
        let (seen, sink) = capture();
        let reporter: Reporter = Box::new(sink);
        report_failure(&reporter, &log, "", &HttpFailure::new(FailureKind::Timeout, "timed out"));
        assert!(!log.path().exists());
        assert_eq!(*seen.borrow(), vec!["HTTP error: connection timeout".to_string()]);
    }

    #[test]
    fn failures_go_to_the_reporter_not_stderr() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/api")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("down")
            .create();
        let client = client_for(&server);
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("error_multiple.html");
        let (seen, sink) = capture();

        let request = ListRequest::new(client, vec![StudentQuery::new("A", "1")])
            .with_error_log(&log_path)
            .with_reporter(sink);
        let results = request.process();

        assert_eq!(results[0].status, Status::Error);
        assert_eq!(
            *seen.borrow(),
            vec![
                "A/1: HTTP error 500 (Internal Server Error)".to_string(),
                format!("Response logged to {}", log_path.display()),
            ]
        );
    }

    #[test]
    fn not_found_is_reported() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/api")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total": 0, "rows": []}"#)
            .create();
        let client = client_for(&server);
        let (seen, sink) = capture();
        let request =
            SingleRequest::new(client, StudentQuery::new("Nobody", "0"), Language::Vn).with_reporter(sink);

        assert!(request.process().is_empty());
        assert_eq!(*seen.borrow(), vec!["No results found".to_string()]);
    }
}
