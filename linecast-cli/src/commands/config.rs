//! `linecast config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use linecast_core::config::{AppConfig, LogfileConfig, ParseStrategy, StreamConfig};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const REDACTED: &str = "***REDACTED***";

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Execute the config validate subcommand.
///
/// Loads the configuration file through the full loader and reports the first fatal error.
///
/// # Errors
///
/// Returns `CliError::Config` if loading fails.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match AppConfig::load(config_path).await {
        Ok(config) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            streams: config.streams.len(),
            logfiles: config.logfiles.len(),
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            streams: 0,
            logfiles: 0,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Execute the config show subcommand.
///
/// Loads and displays the effective configuration (file + env overrides + resolved hostname).
/// Credentials and stream API keys are redacted.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if section name is invalid.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = AppConfig::load(config_path).await?;
    let view = ConfigView::redacted(&config);

    let value = match section.as_deref() {
        None => serde_json::to_value(&view)?,
        Some("general") => serde_json::to_value(&view.general)?,
        Some("streams") => serde_json::to_value(&view.streams)?,
        Some("files") => serde_json::to_value(&view.files)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: general, streams, files)"
            )));
        }
    };

    let report = ConfigReport {
        source: config_path.display().to_string(),
        section,
        config: value,
    };
    writer.render(&report)?;

    Ok(())
}

/// Replace a non-empty secret with a fixed marker.
fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        REDACTED.to_owned()
    }
}

/// Serializable snapshot of the effective configuration.
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub general: GeneralView,
    pub streams: Vec<StreamConfig>,
    pub files: Vec<LogfileView>,
}

#[derive(Debug, Serialize)]
pub struct GeneralView {
    pub app: String,
    pub app_ver: String,
    pub aws_access_key: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    pub hostname: String,
}

#[derive(Debug, Serialize)]
pub struct LogfileView {
    pub name: String,
    pub file: String,
    pub directory: String,
    pub stream: String,
    pub time_format: String,
    pub parse_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_split_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_mappings: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_options: Option<Vec<String>>,
    pub retry_file_open: bool,
    pub buffer_multi_lines: bool,
}

impl ConfigView {
    pub fn redacted(config: &AppConfig) -> Self {
        Self {
            general: GeneralView {
                app: config.app.clone(),
                app_ver: config.app_ver.clone(),
                aws_access_key: redact(&config.aws_access_key),
                aws_secret_access_key: redact(&config.aws_secret_access_key),
                aws_region: config.aws_region.clone(),
                hostname: config.hostname.clone(),
            },
            streams: config
                .streams
                .iter()
                .map(|s| StreamConfig {
                    api_key: redact(&s.api_key),
                    ..s.clone()
                })
                .collect(),
            files: config.logfiles.iter().map(LogfileView::from).collect(),
        }
    }
}

impl From<&LogfileConfig> for LogfileView {
    fn from(l: &LogfileConfig) -> Self {
        let mut view = Self {
            name: l.name.clone(),
            file: l.filename.clone(),
            directory: l.directory.clone(),
            stream: l.stream_name.clone(),
            time_format: l.time_format.clone(),
            parse_mode: l.parse_mode().to_string(),
            line_regex: None,
            front_split_regex: l.front_split.as_ref().map(|re| re.as_str().to_owned()),
            field_mappings: None,
            fields_order: None,
            csv_options: None,
            retry_file_open: l.retry_file_open,
            buffer_multi_lines: l.buffer_multi_lines,
        };
        match &l.strategy {
            ParseStrategy::Regex(re) => view.line_regex = Some(re.as_str().to_owned()),
            ParseStrategy::Json(m) | ParseStrategy::DateKeyValue(m) => {
                view.field_mappings = Some(m.clone());
            }
            ParseStrategy::Csv(csv) => {
                view.fields_order = Some(csv.fields_order.clone());
                view.csv_options = Some(csv.options.clone());
            }
        }
        view
    }
}

/// Configuration display report.
///
/// Text rendering prints the selected part as YAML; JSON output embeds it as-is.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: serde_json::Value,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        let body = serde_yaml::to_string(&self.config)
            .unwrap_or_else(|e| format!("(serialization error: {})\n", e));
        write!(w, "{}", body)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    pub streams: usize,
    pub logfiles: usize,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            writeln!(w, "  Streams: {}", self.streams)?;
            writeln!(w, "  Logfiles: {}", self.logfiles)?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecast_core::config::ConfigFormat;

    const CONFIG: &str = "\
app = shop
aws_access_key = AKIAEXAMPLE
aws_secret_access_key = s3cr3t
hostname = web-01

[stream.web]
type = firehose
stream_api_key = key-123

[access]
stream = web
parse_mode = csv
fields_order = a,,c
csv_options = skipheader=true

[legacy]
parse_mode = regex
line_regex = ^(\\S+)$
";

    fn view() -> ConfigView {
        let config = AppConfig::from_bytes(CONFIG.as_bytes(), ConfigFormat::Ini)
            .expect("config should load");
        ConfigView::redacted(&config)
    }

    #[test]
    fn test_redact_hides_non_empty_secrets() {
        assert_eq!(redact("secret"), REDACTED);
        assert_eq!(redact(""), "");
    }

    #[test]
    fn test_config_view_redacts_credentials() {
        let view = view();
        assert_eq!(view.general.aws_access_key, REDACTED);
        assert_eq!(view.general.aws_secret_access_key, REDACTED);
        assert_eq!(view.streams[0].api_key, REDACTED);
        assert_eq!(view.general.app, "shop");

        let json = serde_json::to_string(&view).expect("serializable");
        assert!(!json.contains("s3cr3t"), "secret must not leak");
        assert!(!json.contains("key-123"), "api key must not leak");
    }

    #[test]
    fn test_logfile_view_carries_mode_artifacts() {
        let view = view();
        let access = &view.files[0];
        assert_eq!(access.parse_mode, "csv");
        assert_eq!(
            access.fields_order,
            Some(vec!["a".to_owned(), String::new(), "c".to_owned()])
        );
        assert!(access.line_regex.is_none());

        let legacy = &view.files[1];
        assert_eq!(legacy.line_regex.as_deref(), Some("^(\\S+)$"));
        assert!(legacy.fields_order.is_none());
    }

    #[test]
    fn test_stream_view_serializes_record_format() {
        let view = view();
        let json = serde_json::to_value(&view.streams).expect("serializable");
        assert_eq!(json[0]["type"].as_str(), Some("firehose"));
        assert_eq!(
            json[0]["record_format"].as_array().map(Vec::len),
            Some(20),
            "stream without record_format uses the built-in schema"
        );
    }

    #[test]
    fn test_config_report_render_text_specific_section() {
        let report = ConfigReport {
            source: "/etc/linecast.ini".to_owned(),
            section: Some("general".to_owned()),
            config: serde_json::json!({ "app": "shop" }),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[general]"), "should show section name");
        assert!(output.contains("app: shop"), "should render YAML body");
    }

    #[test]
    fn test_config_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.ini".to_owned(),
            valid: false,
            streams: 0,
            logfiles: 0,
            errors: vec!["stream not found: ghost".to_owned()],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("stream not found: ghost"));
    }
}
