//! 로그 파일 정의와 파싱 전략 해석
//!
//! [`LogfileConfigurator`]는 로그 파일 섹션 하나를 받아 `parse_mode`를 결정하고,
//! 그 모드가 요구하는 산출물(정규식, 필드 매핑, 필드 순서)을 컴파일/검증합니다.
//! 모든 실패는 치명적인 [`ConfigError`]입니다.

use std::fmt;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::ConfigError;

use super::section::SectionKind;

/// 출력 필드 → 원본 키 매핑 (선언 순서 보존)
pub type FieldMappings = Vec<(String, String)>;

/// 라인 파싱 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseMode {
    Regex,
    Json,
    DateKeyValue,
    Csv,
}

impl ParseMode {
    /// 설정 문자열에서 파싱 모드를 결정합니다.
    ///
    /// 대소문자와 앞뒤 공백을 무시합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "regex" => Some(Self::Regex),
            "json" => Some(Self::Json),
            "date_keyvalue" => Some(Self::DateKeyValue),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Json => "json",
            Self::DateKeyValue => "date_keyvalue",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSV 모드 산출물
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvStrategy {
    /// 위치별 출력 필드명 (빈 문자열 = 오버플로우로 보낼 위치)
    pub fields_order: Vec<String>,
    /// 파서 옵션 (`key=value`)
    pub options: Vec<String>,
}

/// 모드별로 컴파일된 파싱 전략
#[derive(Debug, Clone)]
pub enum ParseStrategy {
    /// 컴파일된 라인 정규식
    Regex(Regex),
    /// JSON 필드 매핑
    Json(FieldMappings),
    /// 날짜 + key=value 필드 매핑
    DateKeyValue(FieldMappings),
    /// CSV 필드 순서와 옵션
    Csv(CsvStrategy),
}

impl ParseStrategy {
    pub fn mode(&self) -> ParseMode {
        match self {
            Self::Regex(_) => ParseMode::Regex,
            Self::Json(_) => ParseMode::Json,
            Self::DateKeyValue(_) => ParseMode::DateKeyValue,
            Self::Csv(_) => ParseMode::Csv,
        }
    }
}

/// 감시 대상 로그 파일 하나의 설정
#[derive(Debug, Clone)]
pub struct LogfileConfig {
    /// 정의 이름 (INI 섹션 이름)
    pub name: String,
    pub filename: String,
    pub directory: String,
    /// 발행 대상 스트림 이름 (논리적 참조)
    pub stream_name: String,
    pub time_format: String,
    pub strategy: ParseStrategy,
    /// 주 전략 적용 전에 라인 앞부분을 잘라내는 정규식
    pub front_split: Option<Regex>,
    pub retry_file_open: bool,
    pub buffer_multi_lines: bool,
    /// 마지막으로 처리한 이벤트 시각. tailer만 갱신합니다.
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl LogfileConfig {
    pub fn parse_mode(&self) -> ParseMode {
        self.strategy.mode()
    }
}

/// 해석 전 로그 파일 정의
///
/// INI 섹션과 YAML `files` 항목 모두 이 형태로 모인 뒤
/// [`LogfileConfigurator`]로 전달됩니다.
#[derive(Debug, Clone, Default)]
pub struct RawLogfile {
    pub name: String,
    pub filename: String,
    pub directory: String,
    pub stream_name: String,
    pub time_format: String,
    pub line_regex: String,
    pub front_split_regex: String,
    pub parse_mode: String,
    pub retry_file_open: bool,
    pub buffer_multi_lines: bool,
    pub fields_order: String,
    pub csv_options: String,
    /// `<name>.field_mappings` 하위 섹션 (없으면 `None`)
    pub field_mappings: Option<FieldMappings>,
}

/// 로그 파일 정의 해석기
pub struct LogfileConfigurator;

impl LogfileConfigurator {
    /// 로그 파일 정의를 해석합니다.
    ///
    /// # Errors
    /// - 알 수 없는/누락된 `parse_mode`
    /// - `regex` 모드: 비었거나 잘못된 `line_regex`
    /// - `json`/`date_keyvalue` 모드: `<name>.field_mappings` 하위 섹션 누락
    /// - `csv` 모드: 빈 `fields_order`
    /// - 잘못된 `front_split_regex`
    pub fn configure(raw: RawLogfile) -> Result<LogfileConfig, ConfigError> {
        let mode =
            ParseMode::from_str_loose(&raw.parse_mode).ok_or_else(|| {
                ConfigError::UnknownParseMode {
                    section: raw.name.clone(),
                    mode: raw.parse_mode.clone(),
                }
            })?;

        let front_split = if raw.front_split_regex.is_empty() {
            None
        } else {
            Some(compile(&raw.name, "front_split_regex", &raw.front_split_regex)?)
        };

        let strategy = match mode {
            ParseMode::Regex => {
                if raw.line_regex.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.line_regex", raw.name),
                        reason: "line_regex is required for regex mode".to_owned(),
                    });
                }
                ParseStrategy::Regex(compile(&raw.name, "line_regex", &raw.line_regex)?)
            }
            ParseMode::Json | ParseMode::DateKeyValue => {
                let mappings =
                    raw.field_mappings
                        .ok_or_else(|| ConfigError::MissingSubsection {
                            section: raw.name.clone(),
                            subsection: SectionKind::field_mappings_section(&raw.name),
                        })?;
                if mode == ParseMode::Json {
                    ParseStrategy::Json(mappings)
                } else {
                    ParseStrategy::DateKeyValue(mappings)
                }
            }
            ParseMode::Csv => {
                let fields_order = split_fields_order(&raw.fields_order);
                if fields_order.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.fields_order", raw.name),
                        reason: "csv mode requires a non-empty fields_order".to_owned(),
                    });
                }
                ParseStrategy::Csv(CsvStrategy {
                    fields_order,
                    options: raw
                        .csv_options
                        .split_whitespace()
                        .map(str::to_owned)
                        .collect(),
                })
            }
        };

        tracing::debug!(
            logfile = %raw.name,
            mode = %mode,
            front_split = front_split.is_some(),
            "resolved logfile strategy"
        );

        Ok(LogfileConfig {
            name: raw.name,
            filename: raw.filename,
            directory: raw.directory,
            stream_name: raw.stream_name,
            time_format: raw.time_format,
            strategy,
            front_split,
            retry_file_open: raw.retry_file_open,
            buffer_multi_lines: raw.buffer_multi_lines,
            last_timestamp: None,
        })
    }
}

/// 쉼표로 구분된 필드 순서를 나눕니다.
///
/// 토큰은 원문 그대로 유지하며(공백 포함), 빈 토큰(`a,,c`)도 위치를 유지합니다.
/// 공백뿐인 입력은 빈 목록입니다.
pub fn split_fields_order(fields_order: &str) -> Vec<String> {
    if fields_order.trim().is_empty() {
        return Vec::new();
    }
    fields_order
        .split(',')
        .map(str::to_owned)
        .collect()
}

fn compile(section: &str, field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
        field: format!("{section}.{field}"),
        reason: e.to_string(),
    })
}
