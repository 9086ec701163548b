// Command-line arguments. Option names keep the underscore spelling
// (`--student_name`) existing scripts use; hyphenated aliases work too.

use crate::record::Language;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dstn-check")]
#[command(about = "Check graduate degree records against the DSTN lookup service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (config.json/config.yaml) [default: configs/config.json]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to output file (printing to screen by default)
    #[arg(long = "output_file", visible_alias = "output-file", global = true)]
    pub output_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up one student and print the full record
    Single {
        /// Student full name (in Vietnamese) or student ID
        #[arg(long = "student_name", visible_alias = "student-name")]
        student_name: Option<String>,

        /// Degree ID no.
        #[arg(long = "degree_id", visible_alias = "degree-id")]
        degree_id: Option<String>,

        /// Language (en/vn)
        #[arg(long, default_value = "vn")]
        language: Language,
    },

    /// Check every student in a two-column CSV file
    Multiple {
        /// Path to the .csv file to check
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_with_defaults() {
        let cli = Cli::try_parse_from([
            "dstn-check",
            "single",
            "--student_name",
            "Nguyen Van A",
            "--degree_id",
            "SOBANG/12345678",
        ])
        .unwrap();
        assert!(cli.config.is_none());
        assert!(cli.output_file.is_none());
        match cli.command {
            Commands::Single {
                student_name,
                degree_id,
                language,
            } => {
                assert_eq!(student_name.as_deref(), Some("Nguyen Van A"));
                assert_eq!(degree_id.as_deref(), Some("SOBANG/12345678"));
                assert_eq!(language, Language::Vn);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn globals_before_and_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dstn-check",
            "--config",
            "configs/config.yaml",
            "multiple",
            "--file",
            "students.csv",
            "--output-file",
            "out.csv",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("configs/config.yaml")));
        assert_eq!(cli.output_file, Some(PathBuf::from("out.csv")));
        assert!(matches!(cli.command, Commands::Multiple { file: Some(_) }));
    }

    #[test]
    fn english_and_hyphen_aliases() {
        let cli = Cli::try_parse_from([
            "dstn-check",
            "single",
            "--student-name",
            "19120001",
            "--degree-id",
            "X",
            "--language",
            "en",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Single {
                language: Language::En,
                ..
            }
        ));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let res = Cli::try_parse_from(["dstn-check", "single", "--language", "fr"]);
        assert!(res.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["dstn-check"]).is_err());
    }
}
