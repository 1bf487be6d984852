//! YAML 설정 문서 로더
//!
//! INI와 같은 필드 이름을 사용하며, 최상위 스칼라는 문서 루트에 둡니다.
//!
//! ```yaml
//! app: shop
//! app_ver: "2.1"
//! streams:
//!   - name: web
//!     type: firehose
//!     record_format:
//!       app: string,16
//!       event_datetime: timestamp
//! files:
//!   - name: access
//!     file: access.log
//!     stream: web
//!     parse_mode: csv
//!     fields_order: event_datetime,,remote_address
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::error::ConfigError;

use super::logfile::{LogfileConfigurator, RawLogfile};
use super::schema::SchemaResolver;
use super::{AppConfig, StreamConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlDocument {
    app: String,
    app_ver: String,
    aws_access_key: String,
    aws_secret_access_key: String,
    aws_region: String,
    hostname: String,
    streams: Vec<YamlStream>,
    files: Vec<YamlLogfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlStream {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
    stream_api_key: String,
    record_format: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlLogfile {
    name: String,
    file: String,
    directory: String,
    stream: String,
    time_format: String,
    line_regex: String,
    front_split_regex: String,
    parse_mode: String,
    retry_file_open: bool,
    buffer_multi_lines: bool,
    fields_order: Option<FieldsOrder>,
    csv_options: String,
    field_mappings: Option<Mapping>,
}

/// `fields_order`는 쉼표 문자열 또는 문자열 목록
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldsOrder {
    Joined(String),
    List(Vec<String>),
}

impl FieldsOrder {
    fn joined(self) -> String {
        match self {
            Self::Joined(s) => s,
            Self::List(list) => list.join(","),
        }
    }
}

/// YAML 문서를 해석합니다. 호스트명 보정은 호출자가 수행합니다.
pub(crate) fn parse_yaml(text: &str) -> Result<AppConfig, ConfigError> {
    let doc: YamlDocument = if text.trim().is_empty() {
        YamlDocument::default()
    } else {
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?
    };

    let mut config = AppConfig {
        app: doc.app,
        app_ver: doc.app_ver,
        aws_access_key: doc.aws_access_key,
        aws_secret_access_key: doc.aws_secret_access_key,
        aws_region: doc.aws_region,
        hostname: doc.hostname,
        ..AppConfig::default()
    };

    let mut names = HashSet::new();
    for (i, stream) in doc.streams.into_iter().enumerate() {
        if stream.name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("streams[{i}].name"),
                reason: "stream name must not be empty".to_owned(),
            });
        }
        if !names.insert(stream.name.clone()) {
            return Err(ConfigError::InvalidValue {
                field: format!("streams[{i}].name"),
                reason: format!("duplicate stream '{}'", stream.name),
            });
        }

        let section = format!("streams.{}.record_format", stream.name);
        let entries = stream
            .record_format
            .as_ref()
            .map(|m| mapping_entries(&section, m))
            .transpose()?;
        let record_format = SchemaResolver::resolve(
            &section,
            entries
                .as_ref()
                .map(|e| e.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        )?;
        info!(
            stream = %stream.name,
            attributes = record_format.len(),
            "resolved stream record format"
        );

        config.streams.push(StreamConfig {
            name: stream.name,
            kind: stream.kind,
            url: stream.url,
            api_key: stream.stream_api_key,
            record_format,
        });
    }

    for (i, file) in doc.files.into_iter().enumerate() {
        let name = if !file.name.is_empty() {
            file.name
        } else if !file.file.is_empty() {
            file.file.clone()
        } else {
            format!("files[{i}]")
        };
        debug!(logfile = %name, "resolving logfile");

        let field_mappings = file
            .field_mappings
            .as_ref()
            .map(|m| mapping_entries(&format!("{name}.field_mappings"), m))
            .transpose()?;

        let raw = RawLogfile {
            name,
            filename: file.file,
            directory: file.directory,
            stream_name: file.stream,
            time_format: file.time_format,
            line_regex: file.line_regex,
            front_split_regex: file.front_split_regex,
            parse_mode: file.parse_mode,
            retry_file_open: file.retry_file_open,
            buffer_multi_lines: file.buffer_multi_lines,
            fields_order: file.fields_order.map(FieldsOrder::joined).unwrap_or_default(),
            csv_options: file.csv_options,
            field_mappings,
        };
        config.logfiles.push(LogfileConfigurator::configure(raw)?);
    }

    Ok(config)
}

/// 순서가 보존된 매핑을 `(키, 값)` 문자열 목록으로 바꿉니다.
fn mapping_entries(section: &str, mapping: &Mapping) -> Result<Vec<(String, String)>, ConfigError> {
    mapping
        .iter()
        .map(|(k, v)| {
            let key = scalar(k).ok_or_else(|| ConfigError::InvalidValue {
                field: section.to_owned(),
                reason: "keys must be scalars".to_owned(),
            })?;
            let value = scalar(v).ok_or_else(|| ConfigError::InvalidValue {
                field: format!("{section}.{key}"),
                reason: "value must be a scalar".to_owned(),
            })?;
            Ok((key, value))
        })
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseStrategy;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_yaml("").unwrap();
        assert!(config.streams.is_empty());
        assert!(config.logfiles.is_empty());
    }

    #[test]
    fn stream_without_record_format_gets_builtin() {
        let config = parse_yaml("streams:\n  - name: web\n").unwrap();
        assert_eq!(config.streams[0].record_format.len(), 20);
    }

    #[test]
    fn fields_order_accepts_list() {
        let text = r#"
files:
  - name: access
    parse_mode: csv
    fields_order: [a, "", c]
"#;
        let config = parse_yaml(text).unwrap();
        match &config.logfiles[0].strategy {
            ParseStrategy::Csv(csv) => assert_eq!(csv.fields_order, vec!["a", "", "c"]),
            other => panic!("expected csv, got {other:?}"),
        }
    }

    #[test]
    fn logfile_name_falls_back_to_file() {
        let text = "files:\n  - file: app.csv\n    parse_mode: csv\n    fields_order: a\n";
        let config = parse_yaml(text).unwrap();
        assert_eq!(config.logfiles[0].name, "app.csv");
    }

    #[test]
    fn duplicate_stream_is_fatal() {
        let text = "streams:\n  - name: web\n  - name: web\n";
        let err = parse_yaml(text).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn nested_mapping_value_is_rejected() {
        let text = "streams:\n  - name: web\n    record_format:\n      app: {type: string}\n";
        assert!(parse_yaml(text).is_err());
    }

    #[test]
    fn malformed_yaml_is_parse_failure() {
        let err = parse_yaml("streams: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }
}
