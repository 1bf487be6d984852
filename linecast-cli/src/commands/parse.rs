//! `linecast parse` command handler
//!
//! Reads lines from a file (or stdin) and prints one record per line using
//! the parser configured for the named logfile.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use linecast_core::config::AppConfig;
use linecast_log_pipeline::{LogfileParser, ParserRegistry};

use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `parse` command.
///
/// # Errors
///
/// Returns `CliError::Core` if the configuration cannot be loaded,
/// `CliError::Command` if the logfile has no line parser, or
/// `CliError::Io` if the input cannot be read.
pub async fn execute(
    args: ParseArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = AppConfig::load(config_path).await?;
    let registry = ParserRegistry::from_config(&config);
    let parser = registry.get(&args.logfile)?;

    let summary = match args.input.as_deref() {
        Some(path) => {
            info!(logfile = %args.logfile, input = %path.display(), "parsing file");
            let file = tokio::fs::File::open(path).await?;
            parse_lines(parser, BufReader::new(file), writer).await?
        }
        None => {
            info!(logfile = %args.logfile, "parsing stdin");
            parse_lines(parser, BufReader::new(tokio::io::stdin()), writer).await?
        }
    };

    if writer.is_json() {
        info!(
            logfile = %summary.logfile,
            lines = summary.lines,
            ok = summary.ok,
            failed = summary.failed,
            "parse finished"
        );
    } else {
        writer.render(&summary)?;
    }

    Ok(())
}

/// Parse every line of `reader`, writing one record per line to stdout.
async fn parse_lines<R>(
    parser: &LogfileParser,
    reader: R,
    writer: &OutputWriter,
) -> Result<ParseSummary, CliError>
where
    R: AsyncBufRead + Unpin,
{
    // `Stdout` locks per `write_all`, so no lock is held across an await.
    let mut out = std::io::stdout();
    let summary = parse_into(parser, reader, writer, &mut out).await?;
    out.flush()?;
    Ok(summary)
}

async fn parse_into<R, W>(
    parser: &LogfileParser,
    mut reader: R,
    writer: &OutputWriter,
    out: &mut W,
) -> Result<ParseSummary, CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut summary = ParseSummary::new(parser.logfile());
    let mut raw = Vec::new();
    let mut rendered = Vec::new();
    let mut number = 0u64;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        number += 1;

        let line = decode_line(&raw);
        if let Cow::Owned(_) = line {
            warn!(line = number, "line is not valid UTF-8, invalid bytes replaced");
        }
        let outcome = parser.parse(&line);

        if let Some(ref e) = outcome.error {
            warn!(line = number, error = %e, "line could not be parsed");
            summary.failed += 1;
        } else {
            summary.ok += 1;
        }
        summary.lines += 1;

        let record = RecordLine {
            line: number,
            record: outcome.record,
            error: outcome.error.map(|e| e.to_string()),
        };
        rendered.clear();
        writer.render_line(&mut rendered, &record)?;
        out.write_all(&rendered)?;
    }

    Ok(summary)
}

/// Strip the line terminator and decode, replacing invalid UTF-8.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// One parsed input line.
#[derive(Debug, Serialize)]
pub struct RecordLine {
    /// 1-based input line number
    pub line: u64,
    pub record: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for RecordLine {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match self.error {
            Some(ref e) => writeln!(w, "line {}: {}", self.line, e.red())?,
            None => writeln!(w, "line {}:", self.line.to_string().bold())?,
        }
        for (key, value) in &self.record {
            writeln!(w, "  {:<20} {}", key, value)?;
        }
        Ok(())
    }
}

/// Counts for one parse run.
#[derive(Debug, Serialize)]
pub struct ParseSummary {
    pub logfile: String,
    pub lines: u64,
    pub ok: u64,
    pub failed: u64,
}

impl ParseSummary {
    fn new(logfile: &str) -> Self {
        Self {
            logfile: logfile.to_owned(),
            lines: 0,
            ok: 0,
            failed: 0,
        }
    }
}

impl Render for ParseSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w)?;
        writeln!(w, "Logfile: {}", self.logfile.bold())?;
        writeln!(w, "  Lines:  {}", self.lines)?;
        writeln!(w, "  OK:     {}", self.ok.to_string().green())?;
        if self.failed > 0 {
            writeln!(w, "  Failed: {}", self.failed.to_string().red())?;
        } else {
            writeln!(w, "  Failed: {}", self.failed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use linecast_core::config::ConfigFormat;

    const CONFIG: &str = "\
app = shop
hostname = web-01

[access]
file = access.csv
parse_mode = csv
fields_order = remote_address,,os
csv_options = skipheader=true
";

    fn registry() -> ParserRegistry {
        let config =
            AppConfig::from_bytes(CONFIG.as_bytes(), ConfigFormat::Ini).expect("config loads");
        ParserRegistry::from_config(&config)
    }

    #[tokio::test]
    async fn test_parse_into_counts_ok_and_failed_lines() {
        let registry = registry();
        let parser = registry.get("access").expect("csv parser");
        let writer = OutputWriter::new(OutputFormat::Json);
        let input: &[u8] = b"remote_address,request,os\n10.0.0.1,GET /,linux\n10.0.0.2\n";

        let mut buffer = Vec::new();
        let summary = parse_into(parser, BufReader::new(input), &writer, &mut buffer)
            .await
            .expect("parsing should succeed");

        assert_eq!(summary.lines, 3);
        assert_eq!(summary.ok, 2, "header line is not an error");
        assert_eq!(summary.failed, 1);

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid JSON line"))
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["line"].as_u64(), Some(2));
        assert_eq!(lines[1]["record"]["remote_address"].as_str(), Some("10.0.0.1"));
        assert_eq!(lines[1]["record"]["log_line"].as_str(), Some("GET /"));
        assert!(lines[1].get("error").is_none());
        assert!(lines[2]["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_parse_into_empty_input() {
        let registry = registry();
        let parser = registry.get("access").expect("csv parser");
        let writer = OutputWriter::new(OutputFormat::Text);

        let mut buffer = Vec::new();
        let summary = parse_into(parser, BufReader::new(&b""[..]), &writer, &mut buffer)
            .await
            .expect("parsing should succeed");

        assert_eq!(summary.lines, 0);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_parse_into_keeps_going_after_invalid_utf8() {
        let registry = registry();
        let parser = registry.get("access").expect("csv parser");
        let writer = OutputWriter::new(OutputFormat::Json);
        let input: &[u8] = b"10.0.0.1,\xff\xfe,linux\r\n10.0.0.2,GET /,mac\n";

        let mut buffer = Vec::new();
        let summary = parse_into(parser, BufReader::new(input), &writer, &mut buffer)
            .await
            .expect("invalid bytes must not abort the run");

        assert_eq!(summary.lines, 2);
        assert_eq!(summary.ok, 2);

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid JSON line"))
            .collect();
        assert_eq!(lines[0]["record"]["os"].as_str(), Some("linux"));
        assert_eq!(lines[0]["record"]["log_line"].as_str(), Some("\u{fffd}\u{fffd}"));
        assert_eq!(lines[1]["record"]["remote_address"].as_str(), Some("10.0.0.2"));
    }

    #[test]
    fn test_decode_line_strips_terminators() {
        assert_eq!(decode_line(b"a,b\r\n"), "a,b");
        assert_eq!(decode_line(b"a,b\n"), "a,b");
        assert_eq!(decode_line(b"a,b"), "a,b");
        assert!(matches!(decode_line(b"ok\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_record_line_render_text_shows_error() {
        let record = RecordLine {
            line: 7,
            record: BTreeMap::from([("os".to_owned(), "\\N".to_owned())]),
            error: Some("fields order mismatch: expected 3 fields, got 1".to_owned()),
        };

        let mut buffer = Vec::new();
        record.render_text(&mut buffer).expect("rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("line 7"));
        assert!(output.contains("fields order mismatch"));
        assert!(output.contains("\\N"));
    }

    #[test]
    fn test_parse_summary_render_text() {
        let summary = ParseSummary {
            logfile: "access".to_owned(),
            lines: 3,
            ok: 2,
            failed: 1,
        };

        let mut buffer = Vec::new();
        summary.render_text(&mut buffer).expect("rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("access"));
        assert!(output.contains("Lines:  3"));
    }
}
