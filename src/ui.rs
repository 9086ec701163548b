// UI layer: turns handler results into terminal output or files, and
// fills in missing arguments with `dialoguer` prompts when attached to a
// terminal. Kept synchronous, like the rest of the tool.

use crate::api::ApiClient;
use crate::record::{Language, Record};
use crate::request::{ListRequest, SingleRequest, Status, StatusResult, Summary, MULTIPLE_LOG, SINGLE_LOG};
use crate::students::{load_students, StudentQuery};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Header of the batch CSV output.
pub const STATUS_HEADER: [&str; 3] = ["Name", "Degree ID", "Status"];

/// Terminal front end. Results go to `out`; prompts, spinners and the
/// progress bar only appear when `interactive` is set.
pub struct Ui<W: Write> {
    out: W,
    interactive: bool,
    log_dir: PathBuf,
}

impl Ui<io::Stdout> {
    pub fn stdout() -> Self {
        Ui::new(io::stdout(), io::stdin().is_terminal())
    }
}

impl<W: Write> Ui<W> {
    pub fn new(out: W, interactive: bool) -> Self {
        Ui {
            out,
            interactive,
            log_dir: PathBuf::new(),
        }
    }

    /// Directory for `error_single.html` / `error_multiple.html`. Defaults
    /// to the working directory.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Look up one student, then print or save the formatted records.
    pub fn handle_single(
        &mut self,
        client: ApiClient,
        student_name: Option<String>,
        degree_id: Option<String>,
        language: Language,
        output_file: Option<&Path>,
    ) -> Result<()> {
        let student_name = self.require(student_name, "student_name", "Student full name or student ID")?;
        let degree_id = self.require(degree_id, "degree_id", "Degree ID")?;

        // spinner only; the lookup is a single blocking call
        let spinner = self.progress(ProgressBar::new_spinner());
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner.set_message("Looking up...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let request = SingleRequest::new(client, StudentQuery::new(student_name, degree_id), language)
            .with_error_log(self.log_dir.join(SINGLE_LOG))
            .with_reporter(suspended(&spinner));
        let records = request.process();
        spinner.finish_and_clear();

        let tables = render_records(&records)?;
        match output_file {
            Some(path) => {
                write_tables(path, &tables)?;
                writeln!(self.out, "Results has been written to {}", path.display())?;
            }
            None => {
                for table in &tables {
                    writeln!(self.out, "{}", table)?;
                }
            }
        }
        Ok(())
    }

    /// Check every student in the batch file, then print coloured status
    /// lines or save a CSV. An empty list still produces the CSV header.
    pub fn handle_multiple(&mut self, client: ApiClient, file: Option<PathBuf>, output_file: Option<&Path>) -> Result<()> {
        let file = match file {
            Some(file) => file,
            None => PathBuf::from(self.require(None, "file", "Path to the .csv file to check")?),
        };
        let students =
            load_students(&file).with_context(|| format!("Failed to load student list {}", file.display()))?;
        if students.is_empty() {
            writeln!(self.out, "No students found in {}", file.display())?;
        }

        let bar = match output_file {
            Some(_) => self.progress(ProgressBar::new(students.len() as u64)),
            None => ProgressBar::hidden(),
        };
        bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")?);
        let request = ListRequest::new(client, students)
            .with_error_log(self.log_dir.join(MULTIPLE_LOG))
            .with_reporter(suspended(&bar));

        let results = match output_file {
            None => {
                let out = &mut self.out;
                let mut write_err = None;
                let results = request.process_with(|result| {
                    if write_err.is_none() {
                        write_err = writeln!(out, "{}", status_line(result)).err();
                    }
                });
                if let Some(e) = write_err {
                    return Err(e.into());
                }
                results
            }
            Some(path) => {
                let results = request.process_with(|result| {
                    bar.set_message(result.name.clone());
                    bar.inc(1);
                });
                bar.finish_and_clear();
                write_statuses(path, &results)?;
                writeln!(self.out, "Status has been written to {}", path.display())?;
                results
            }
        };
        writeln!(self.out, "{}", Summary::from_results(&results))?;
        Ok(())
    }

    /// Use the given value, or ask for it when interactive.
    fn require(&self, value: Option<String>, flag: &str, prompt: &str) -> Result<String> {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => Ok(v),
            None if self.interactive => {
                let answer: String = Input::new().with_prompt(prompt).interact_text()?;
                Ok(answer.trim().to_string())
            }
            None => anyhow::bail!("--{} is required", flag),
        }
    }

    fn progress(&self, bar: ProgressBar) -> ProgressBar {
        if self.interactive {
            bar
        } else {
            ProgressBar::hidden()
        }
    }
}

/// Diagnostics printed above the bar instead of through it.
fn suspended(bar: &ProgressBar) -> impl Fn(&str) + 'static {
    let bar = bar.clone();
    move |msg: &str| bar.suspend(|| eprintln!("{}", msg))
}

/// Coloured one-line status for the terminal.
pub fn status_line(result: &StatusResult) -> String {
    match result.status {
        Status::Valid => format!("\u{2714} {}/{} - VALID", result.name, result.degree_id)
            .green()
            .to_string(),
        Status::Invalid => format!("\u{2718} {}/{} - INVALID", result.name, result.degree_id)
            .red()
            .to_string(),
        Status::Error => format!("! {}/{} - ERROR", result.name, result.degree_id)
            .yellow()
            .to_string(),
    }
}

pub fn render_records(records: &[Record]) -> Result<Vec<String>> {
    records
        .iter()
        .map(|record| record.render().context("Unexpected record returned by the lookup service"))
        .collect()
}

/// Write one table per record, each followed by a newline.
pub fn write_tables(path: &Path, tables: &[String]) -> Result<()> {
    let mut file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    for table in tables {
        writeln!(file, "{}", table)?;
    }
    Ok(())
}

/// `Name,Degree ID,Status` followed by one row per result.
pub fn write_statuses(path: &Path, results: &[StatusResult]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(STATUS_HEADER)?;
    for result in results {
        wtr.write_record(result.to_row())?;
    }
    wtr.flush()?;
    Ok(())
}
