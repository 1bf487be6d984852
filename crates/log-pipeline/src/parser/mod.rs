//! 로그 파싱 모듈 -- 로그 파일별 라인 파서
//!
//! [`ParserRegistry`]는 [`AppConfig`]의 로그 파일 정의마다 파서를 하나씩 만듭니다.
//! 각 파서는 core의 [`LineParser`] trait을 구현합니다.
//!
//! # 지원 형식
//! - CSV ([`CsvParser`])
//!
//! `regex`, `json`, `date_keyvalue` 모드는 설정 해석까지만 지원하며,
//! 해당 로그 파일의 파서를 요청하면 `UnsupportedFormat` 에러를 반환합니다.
//!
//! # 사용 예시
//! ```ignore
//! use linecast_log_pipeline::parser::ParserRegistry;
//!
//! let registry = ParserRegistry::from_config(&config);
//! let outcome = registry.get("nginx_access")?.parse("2024-01-15,10.0.0.1,GET /");
//! ```

pub mod csv;

pub use self::csv::{CsvOptions, CsvParser};

use regex::Regex;
use tracing::{info, warn};

use linecast_core::config::{AppConfig, LogfileConfig, ParseMode, ParseStrategy};
use linecast_core::error::ParseError;
use linecast_core::pipeline::{LineParser, ParseOutcome};
use linecast_core::types::Schema;

/// 로그 파일 하나에 묶인 파서
///
/// 설정된 앞부분 분리 패턴(`front_split_regex`)을 라인에 먼저 적용합니다.
pub struct LogfileParser {
    logfile: String,
    front_split: Option<Regex>,
    parser: Box<dyn LineParser>,
}

impl LogfileParser {
    /// 로그 파일 설정으로 파서를 만듭니다.
    ///
    /// CSV 파서의 스키마는 로그 파일이 참조하는 스트림의 스키마이며,
    /// 스트림이 없으면 내장 기본 스키마를 사용합니다.
    ///
    /// # Errors
    /// CSV 외의 모드는 `UnsupportedFormat`
    pub fn build(config: &AppConfig, logfile: &LogfileConfig) -> Result<Self, ParseError> {
        let ParseStrategy::Csv(strategy) = &logfile.strategy else {
            return Err(ParseError::UnsupportedFormat(
                logfile.parse_mode().to_string(),
            ));
        };

        let schema = config
            .stream(&logfile.stream_name)
            .map(|s| s.record_format.clone())
            .unwrap_or_else(Schema::builtin);

        let parser = CsvParser::new(
            config.app.as_str(),
            config.app_ver.as_str(),
            logfile.filename.as_str(),
            config.hostname.as_str(),
            strategy.fields_order.clone(),
            schema,
            &strategy.options,
        );

        Ok(Self {
            logfile: logfile.name.clone(),
            front_split: logfile.front_split.clone(),
            parser: Box::new(parser),
        })
    }

    /// 로그 파일 이름
    pub fn logfile(&self) -> &str {
        &self.logfile
    }

    pub fn format_name(&self) -> &str {
        self.parser.format_name()
    }

    pub fn schema(&self) -> &Schema {
        self.parser.schema()
    }

    /// 라인 하나를 파싱합니다.
    ///
    /// 앞부분 분리 패턴이 일치하면 첫 번째 일치 구간 뒤의 나머지만 파싱합니다.
    pub fn parse(&self, line: &str) -> ParseOutcome {
        self.parser.parse(split_front(self.front_split.as_ref(), line))
    }
}

impl std::fmt::Debug for LogfileParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogfileParser")
            .field("logfile", &self.logfile)
            .field("format", &self.parser.format_name())
            .field("front_split", &self.front_split.as_ref().map(Regex::as_str))
            .finish()
    }
}

fn split_front<'a>(pattern: Option<&Regex>, line: &'a str) -> &'a str {
    match pattern.and_then(|re| re.find(line)) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// 로그 파일 이름별 파서 목록
#[derive(Debug, Default)]
pub struct ParserRegistry {
    parsers: Vec<LogfileParser>,
    /// 파서가 없는 로그 파일과 그 모드
    unsupported: Vec<(String, ParseMode)>,
}

impl ParserRegistry {
    /// 설정의 모든 로그 파일에 대해 파서를 만듭니다.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::default();

        for logfile in &config.logfiles {
            match LogfileParser::build(config, logfile) {
                Ok(parser) => registry.parsers.push(parser),
                Err(e) => {
                    warn!(
                        logfile = %logfile.name,
                        mode = %logfile.parse_mode(),
                        error = %e,
                        "no line parser for logfile"
                    );
                    registry
                        .unsupported
                        .push((logfile.name.clone(), logfile.parse_mode()));
                }
            }
        }

        info!(
            parsers = registry.parsers.len(),
            unsupported = registry.unsupported.len(),
            "parser registry built"
        );
        registry
    }

    /// 로그 파일 이름으로 파서를 찾습니다.
    ///
    /// # Errors
    /// 파서가 없는 모드이거나 등록되지 않은 이름이면 `UnsupportedFormat`
    pub fn get(&self, logfile: &str) -> Result<&LogfileParser, ParseError> {
        if let Some(parser) = self.parsers.iter().find(|p| p.logfile == logfile) {
            return Ok(parser);
        }
        match self.unsupported.iter().find(|(name, _)| name == logfile) {
            Some((_, mode)) => Err(ParseError::UnsupportedFormat(mode.to_string())),
            None => Err(ParseError::UnsupportedFormat(format!(
                "no parser registered for logfile '{logfile}'"
            ))),
        }
    }

    /// 파서가 있는 로그 파일 이름 목록
    pub fn registered(&self) -> Vec<&str> {
        self.parsers.iter().map(LogfileParser::logfile).collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
