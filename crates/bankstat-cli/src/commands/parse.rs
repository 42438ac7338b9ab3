use bankstat_core::error::StatementError;
use bankstat_core::extraction::pdftotext::PdftotextExtractor;
use bankstat_core::model::DocumentFormat;
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    input_file: PathBuf,
    format_override: Option<&str>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), StatementError> {
    let format = resolve_format(&input_file, format_override)?;
    let bytes = std::fs::read(&input_file)?;
    let file_name = input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_file.display().to_string());

    let extractor = PdftotextExtractor::new();
    let parsed = bankstat_core::parse_statement(&bytes, &file_name, format, &extractor)?;

    let output_str = match output_format {
        "json" => output::json::render(&parsed)?,
        _ => output::table::format_parsed(&parsed),
    };

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = output::json::render(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} transaction(s), written to {}",
                parsed.transactions.len(),
                path.display()
            );
            if !parsed.skipped_lines.is_empty() {
                eprintln!(
                    "  {} line(s) skipped during parsing",
                    parsed.skipped_lines.len()
                );
            }
        }
        None => {
            println!("{output_str}");
        }
    }

    Ok(())
}

fn resolve_format(path: &Path, format_override: Option<&str>) -> Result<DocumentFormat, StatementError> {
    if let Some(name) = format_override {
        return match name.to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "delimited" | "csv" => Ok(DocumentFormat::Delimited),
            "workbook" | "xlsx" => Ok(DocumentFormat::Workbook),
            other => Err(StatementError::ParseError(format!(
                "unknown format '{other}' (expected pdf, delimited or workbook)"
            ))),
        };
    }

    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DocumentFormat::from_extension)
        .ok_or_else(|| {
            StatementError::ParseError(format!(
                "cannot determine format of {} (use --format)",
                path.display()
            ))
        })
}
