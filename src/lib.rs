// Library root
// -----------
// This crate exposes the lookup logic behind the `dstn-check` CLI. The
// binary (`main.rs`) only parses arguments, loads the config and hands
// off to `ui`.
//
// Module responsibilities:
// - `config`: loads the JSON/YAML config into typed structs.
// - `api`: the blocking HTTP client and the fetch outcome type.
// - `record`: one DSTN row and its two-column table rendering.
// - `students`: student queries and the batch CSV loader.
// - `request`: single and batch handlers, error logs, batch statuses.
// - `ui`: terminal/file output and interactive prompts.
// - `cli`: command-line argument model.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod record;
pub mod request;
pub mod students;
pub mod ui;

pub use error::{DstnError, Result};
