use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use soal::config::ImportConfig;
use soal::import::{read_document, BulkImportClient, ImportPreview, ParsedQuestion, QuestionType};
use tracing_subscriber::EnvFilter;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DEFAULT_POINTS: u32 = 1;
const USAGE: &str =
    "Usage: import_questions <file.txt|file.docx> [--points N] [--format text|json|yaml] [--remove 1,2,...] [--submit]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
    Yaml,
}

#[derive(Debug)]
struct Config {
    source: PathBuf,
    points: u32,
    format: Format,
    /// 1-based row numbers as shown in the preview
    remove: Vec<usize>,
    submit: bool,
}

fn parse_config(mut args: impl Iterator<Item = String>) -> anyhow::Result<Config> {
    let mut source = None;
    let mut points = DEFAULT_POINTS;
    let mut format = Format::Text;
    let mut remove = Vec::new();
    let mut submit = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--points" => {
                let value = args.next().context("--points needs a value")?;
                points = value
                    .parse()
                    .with_context(|| format!("invalid point value '{}'", value))?;
                if points == 0 {
                    bail!("--points must be a positive number");
                }
            }
            "--format" => {
                format = match args.next().as_deref() {
                    Some("text") => Format::Text,
                    Some("json") => Format::Json,
                    Some("yaml") => Format::Yaml,
                    other => bail!("unknown format {:?}", other.unwrap_or_default()),
                }
            }
            "--remove" => {
                let value = args.next().context("--remove needs a list of row numbers")?;
                for part in value.split(',').filter(|p| !p.trim().is_empty()) {
                    let row: usize = part
                        .trim()
                        .parse()
                        .with_context(|| format!("invalid row number '{}'", part))?;
                    if row == 0 {
                        bail!("row numbers start at 1");
                    }
                    remove.push(row);
                }
            }
            "--submit" => submit = true,
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            path if source.is_none() => source = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {}", extra),
        }
    }

    Ok(Config {
        source: source.context("a source file is required")?,
        points,
        format,
        remove,
        submit,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match parse_config(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", USAGE);
            return Err(e);
        }
    };

    let text = read_document(&config.source)
        .with_context(|| format!("failed to read {}", config.source.display()))?;

    let mut preview = ImportPreview::parse(&text, config.points);
    let positions: Vec<usize> = config.remove.iter().map(|row| row - 1).collect();
    let removed = preview.remove_many(&positions);
    if removed > 0 {
        tracing::info!(removed, "removed rows from preview");
    }

    match config.format {
        Format::Text => print_preview(&preview),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&preview).context("failed to serialize preview")?
        ),
        Format::Yaml => print!(
            "{}",
            serde_yaml_ng::to_string(&preview).context("failed to serialize preview")?
        ),
    }

    if !config.submit {
        return Ok(());
    }

    let summary = preview.summary();
    if summary.invalid > 0 {
        tracing::warn!(invalid = summary.invalid, "skipping invalid questions");
    }

    let api = ImportConfig::from_env().context("import settings are incomplete")?;
    let client = BulkImportClient::with_timeout(&api.api_base_url, &api.api_token, api.timeout);
    let report = client
        .import(&api.exam_id, &preview.valid_questions())
        .context(format!("could not import questions into exam {}", api.exam_id))?;

    println!(
        "imported {BOLD}{}{RESET} questions into exam {BOLD}{}{RESET}",
        report.imported, api.exam_id
    );

    Ok(())
}

fn print_preview(preview: &ImportPreview) {
    for (idx, row) in preview.rows().iter().enumerate() {
        let question = row.question();
        let status = match row {
            ParsedQuestion::Valid(_) => "ok".to_string(),
            ParsedQuestion::Invalid { reason, .. } => format!("invalid: {}", reason),
        };
        let kind = match question.question_type {
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::Essay => "essay",
        };
        println!(
            "{BOLD}{:>3}.{RESET} {} [{}, {} pts] ({})",
            idx + 1,
            question.question_text,
            kind,
            question.points,
            status
        );
        for (letter, option) in ('a'..='e').zip(&question.options) {
            let mark = if option.is_correct { "*" } else { " " };
            println!("      {}{}. {}", mark, letter, option.text);
        }
    }

    let summary = preview.summary();
    println!(
        "\n{BOLD}{}{RESET} questions, {BOLD}{}{RESET} valid, {BOLD}{}{RESET} invalid",
        summary.total, summary.valid, summary.invalid
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn defaults() {
        let config = parse_config(args(&["soal.docx"])).unwrap();
        assert_eq!(config.source, PathBuf::from("soal.docx"));
        assert_eq!(config.points, DEFAULT_POINTS);
        assert_eq!(config.format, Format::Text);
        assert!(!config.submit);
    }

    #[test]
    fn all_options() {
        let config = parse_config(args(&[
            "--points", "5", "soal.txt", "--format", "yaml", "--remove", "2, 4", "--submit",
        ]))
        .unwrap();
        assert_eq!(config.points, 5);
        assert_eq!(config.format, Format::Yaml);
        assert_eq!(config.remove, vec![2, 4]);
        assert!(config.submit);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_config(args(&[])).is_err());
        assert!(parse_config(args(&["a.txt", "--points", "0"])).is_err());
        assert!(parse_config(args(&["a.txt", "--remove", "0"])).is_err());
        assert!(parse_config(args(&["a.txt", "b.txt"])).is_err());
        assert!(parse_config(args(&["a.txt", "--format", "xml"])).is_err());
    }
}
