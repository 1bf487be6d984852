//! INI 설정 문서 로더
//!
//! 섹션을 [`SectionKind`]로 분류한 뒤 다음 순서로 해석합니다.
//!
//! 1. `DEFAULT` → 최상위 스칼라 설정
//! 2. `stream.<name>` → 스트림 등록
//! 3. `stream.<name>.record_format` → 등록된 스트림에 스키마 부착
//! 4. `<logfile>` → [`LogfileConfigurator`]로 위임
//!
//! 2단계가 끝나야 3단계가 시작되며, 로그 파일은 마지막에 처리합니다.
//! 섹션의 선언 순서는 단계 안에서만 의미가 있습니다.

use std::collections::HashSet;

use ini::{Ini, ParseOption, Properties};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::types::Schema;

use super::logfile::{LogfileConfigurator, RawLogfile};
use super::schema::SchemaResolver;
use super::section::{DEFAULT_SECTION, SectionKind};
use super::{AppConfig, StreamConfig};

/// INI 문서를 해석합니다. 호스트명 보정은 호출자가 수행합니다.
pub(crate) fn parse_ini(text: &str) -> Result<AppConfig, ConfigError> {
    // 정규식 값의 역슬래시와 따옴표를 그대로 유지
    let opt = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let doc = Ini::load_from_str_opt(text, opt).map_err(|e| ConfigError::ParseFailed {
        reason: e.to_string(),
    })?;

    let defaults = Defaults::collect(&doc);

    let mut config = AppConfig {
        app: defaults.get("app"),
        app_ver: defaults.get("app_ver"),
        aws_access_key: defaults.get("aws_access_key"),
        aws_secret_access_key: defaults.get("aws_secret_access_key"),
        aws_region: defaults.get("aws_region"),
        hostname: defaults.get("hostname"),
        ..AppConfig::default()
    };

    // 중복 섹션은 첫 번째 선언만 사용
    let mut seen = HashSet::new();
    let sections: Vec<(&str, &Properties)> = doc
        .iter()
        .filter_map(|(name, props)| name.map(|n| (n, props)))
        .filter(|(name, _)| {
            let first = seen.insert(*name);
            if !first {
                warn!(section = name, "duplicate section, ignoring later declaration");
            }
            first
        })
        .collect();

    // 1단계: 스트림 등록
    let mut formatted = HashSet::new();
    for (name, props) in &sections {
        if let SectionKind::StreamBase(stream) = SectionKind::classify(name) {
            debug!(section = name, "registering stream");
            config.streams.push(StreamConfig {
                name: stream.to_owned(),
                kind: lookup(props, &defaults, "type").unwrap_or_default(),
                url: lookup(props, &defaults, "url").unwrap_or_default(),
                api_key: lookup(props, &defaults, "stream_api_key").unwrap_or_default(),
                record_format: Schema::default(),
            });
        }
    }

    // 2단계: 레코드 스키마 부착
    for (name, props) in &sections {
        if let SectionKind::StreamSchema(stream) = SectionKind::classify(name) {
            let index = config
                .stream_index(stream)
                .ok_or_else(|| ConfigError::StreamNotFound {
                    stream: stream.to_owned(),
                })?;
            let schema = SchemaResolver::resolve(name, Some(props.iter()))?;
            info!(
                stream,
                attributes = schema.len(),
                "resolved stream record format"
            );
            for attribute in &schema {
                debug!(stream, attribute = %attribute, "record format attribute");
            }
            config.streams[index].record_format = schema;
            formatted.insert(index);
        }
    }

    for (index, stream) in config.streams.iter_mut().enumerate() {
        if !formatted.contains(&index) {
            debug!(stream = %stream.name, "no record_format section, using built-in schema");
            stream.record_format = SchemaResolver::resolve(
                &format!("stream.{}.record_format", stream.name),
                None::<Vec<(&str, &str)>>,
            )?;
        }
    }

    // 3단계: 로그 파일
    for (name, props) in &sections {
        match SectionKind::classify(name) {
            SectionKind::Logfile(logfile) => {
                let raw = raw_logfile(&doc, logfile, props, &defaults)?;
                config.logfiles.push(LogfileConfigurator::configure(raw)?);
            }
            SectionKind::Skip => debug!(section = name, "skipping unrecognised section"),
            _ => {}
        }
    }

    Ok(config)
}

/// `DEFAULT` 섹션 값
///
/// 섹션 헤더 이전의 키와 명시적인 `[DEFAULT]` 섹션을 합칩니다.
/// 명시적인 섹션이 우선합니다.
struct Defaults<'a> {
    general: Option<&'a Properties>,
    explicit: Option<&'a Properties>,
}

impl<'a> Defaults<'a> {
    fn collect(doc: &'a Ini) -> Self {
        Self {
            general: doc.section(None::<String>),
            explicit: doc.section(Some(DEFAULT_SECTION)),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'a str> {
        self.explicit
            .and_then(|p| p.get(key))
            .or_else(|| self.general.and_then(|p| p.get(key)))
    }

    fn get(&self, key: &str) -> String {
        self.lookup(key).map(str::to_owned).unwrap_or_default()
    }
}

/// 섹션에서 키를 찾고, 없으면 `DEFAULT` 값을 상속합니다.
fn lookup(props: &Properties, defaults: &Defaults<'_>, key: &str) -> Option<String> {
    props
        .get(key)
        .or_else(|| defaults.lookup(key))
        .map(str::to_owned)
}

fn lookup_bool(
    section: &str,
    props: &Properties,
    defaults: &Defaults<'_>,
    key: &str,
) -> Result<bool, ConfigError> {
    match lookup(props, defaults, key) {
        None => Ok(false),
        Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::InvalidValue {
            field: format!("{section}.{key}"),
            reason: format!("expected a boolean, got '{value}'"),
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "" | "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn raw_logfile(
    doc: &Ini,
    name: &str,
    props: &Properties,
    defaults: &Defaults<'_>,
) -> Result<RawLogfile, ConfigError> {
    let text = |key: &str| lookup(props, defaults, key).unwrap_or_default();

    let field_mappings = doc
        .section(Some(SectionKind::field_mappings_section(name)))
        .map(|sub| {
            sub.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect()
        });

    Ok(RawLogfile {
        name: name.to_owned(),
        filename: text("file"),
        directory: text("directory"),
        stream_name: text("stream"),
        time_format: text("time_format"),
        line_regex: text("line_regex"),
        front_split_regex: text("front_split_regex"),
        parse_mode: text("parse_mode"),
        retry_file_open: lookup_bool(name, props, defaults, "retry_file_open")?,
        buffer_multi_lines: lookup_bool(name, props, defaults, "buffer_multi_lines")?,
        fields_order: text("fields_order"),
        csv_options: text("csv_options"),
        field_mappings,
    })
}
