use bankstat_core::error::StatementError;
use bankstat_core::model::ParsedStatement;

pub fn render(parsed: &ParsedStatement) -> Result<String, StatementError> {
    Ok(serde_json::to_string_pretty(parsed)?)
}
