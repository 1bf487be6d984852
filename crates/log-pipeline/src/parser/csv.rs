//! CSV 로그 파서
//!
//! 구분자로 나뉜 라인 하나를 필드 순서 목록(`fields_order`)에 따라 레코드로 변환합니다.
//!
//! # 처리 순서
//! 1. 스키마의 모든 키를 `"\N"`으로 채운 기본값 레코드 생성
//! 2. 따옴표를 인식하는 토큰화
//! 3. 토큰 수 검사 (`fields_order` 길이와 다르면 기본값 + 에러)
//! 4. `skipheader`가 켜져 있으면 헤더 라인 판정
//! 5. 위치별 필드 할당. 이름 없는 위치나 알 수 없는 키는 overflow로 보냄
//! 6. overflow를 정리하여 `log_line`에 저장
//!
//! # 옵션
//! `key=value` 토큰 목록이며 키는 대소문자를 구분하지 않습니다.
//!
//! | 키              | 기본값 | 설명                                     |
//! |-----------------|--------|------------------------------------------|
//! | `delimiter`     | `,`    | 단일 ASCII 문자, `tab`, `\t`, `space`    |
//! | `skipheader`    | false  | 헤더 라인 건너뛰기                       |
//! | `checknheaders` | 2      | 헤더 판정에 사용할 앞쪽 필드 수          |
//!
//! 잘못된 옵션은 경고 로그만 남기고 기본값을 유지합니다.
//!
//! # 사용 예시
//! ```ignore
//! use linecast_core::{LineParser, Schema};
//! use linecast_log_pipeline::parser::CsvParser;
//!
//! let parser = CsvParser::new(
//!     "shop", "2.1", "access.csv", "web-01",
//!     vec!["event_datetime".into(), "".into(), "remote_address".into()],
//!     Schema::builtin(),
//!     &["skipheader=true".into()],
//! );
//! let outcome = parser.parse("2024-01-15T12:00:00Z,GET /,10.0.0.1");
//! assert_eq!(outcome.record["remote_address"], "10.0.0.1");
//! ```

use std::sync::LazyLock;

use chrono::Utc;
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use tracing::{debug, warn};

use linecast_core::error::ParseError;
use linecast_core::metrics as m;
use linecast_core::pipeline::{LineParser, ParseOutcome};
use linecast_core::types::{NULL_SENTINEL, Record, Schema, keys};

/// 수집 시각 포맷 (밀리초 정밀도 ISO-8601, UTC)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const FORMAT_NAME: &str = "csv";
const DEFAULT_DELIMITER: u8 = b',';
const DEFAULT_CHECK_N_HEADERS: usize = 2;

/// 빈 괄호/따옴표 쌍
static EMPTY_PAIRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\(\)|\[\]|\{\}|""|''"#).expect("valid empty-pair pattern"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// 해석된 CSV 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub skip_header: bool,
    pub check_n_headers: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            skip_header: false,
            check_n_headers: DEFAULT_CHECK_N_HEADERS,
        }
    }
}

impl CsvOptions {
    /// `key=value` 토큰 목록을 해석합니다.
    ///
    /// 알 수 없는 키, `=`이 없는 토큰, 잘못된 값은 경고 후 무시합니다.
    pub fn parse(options: &[String]) -> Self {
        let mut parsed = Self::default();

        for token in options {
            let Some((key, value)) = token.split_once('=') else {
                warn!(option = %token, "csv option is not key=value, ignoring");
                continue;
            };

            match key.trim().to_ascii_lowercase().as_str() {
                "delimiter" => match parse_delimiter(value) {
                    Some(d) => parsed.delimiter = d,
                    None => warn!(
                        value,
                        "csv delimiter must be a single ASCII character, keeping ','"
                    ),
                },
                "skipheader" => match parse_bool(value) {
                    Some(b) => parsed.skip_header = b,
                    None => warn!(value, "invalid skipheader value, keeping false"),
                },
                "checknheaders" => match value.trim().parse::<usize>() {
                    Ok(n) if n > 0 => parsed.check_n_headers = n,
                    _ => warn!(
                        value,
                        default = DEFAULT_CHECK_N_HEADERS,
                        "checknheaders must be a positive integer, keeping default"
                    ),
                },
                other => warn!(option = other, "unknown csv option, ignoring"),
            }
        }

        parsed
    }
}

fn parse_delimiter(value: &str) -> Option<u8> {
    match value {
        "tab" | "\\t" | "\t" => return Some(b'\t'),
        "space" => return Some(b' '),
        _ => {}
    }
    match value.as_bytes() {
        [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Some(*b),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" => Some(true),
        "0" | "f" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// 널 표현: 빈 값, `-`, `\N`, `null` (앞뒤 공백 제거 후, 대소문자 무시)
pub fn is_null(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value == "-"
        || value == NULL_SENTINEL
        || value.eq_ignore_ascii_case("null")
}

/// overflow 버퍼를 정리합니다.
///
/// 빈 괄호/따옴표 쌍을 지우고, 연속 공백을 하나로 줄인 뒤 앞뒤 공백을 제거합니다.
pub fn clean_overflow(raw: &str) -> String {
    let stripped = EMPTY_PAIRS.replace_all(raw, "");
    WHITESPACE_RUNS
        .replace_all(&stripped, " ")
        .trim()
        .to_owned()
}

/// 따옴표 구조를 검사합니다.
///
/// `csv` 리더는 잘못된 따옴표를 그대로 받아들이므로 토큰화 전에 먼저 확인합니다.
/// 따옴표 없는 필드 안의 `"`, 닫는 따옴표 뒤의 구분자 외 문자,
/// 닫히지 않은 따옴표는 모두 에러입니다. 따옴표 필드 안의 `""`는 이스케이프입니다.
fn check_quotes(line: &str, delimiter: u8) -> Result<(), ParseError> {
    let bytes = line.as_bytes();
    let mut i = 0;
    let mut column = 1;

    loop {
        if bytes.get(i).copied() == Some(b'"') {
            i += 1;
            loop {
                match bytes.get(i).copied() {
                    None => return Err(quote_error(column, "unterminated quoted field")),
                    Some(b'"') => match bytes.get(i + 1).copied() {
                        Some(b'"') => i += 2,
                        None | Some(b'\r' | b'\n') => return Ok(()),
                        Some(b) if b == delimiter => {
                            i += 2;
                            break;
                        }
                        Some(_) => {
                            return Err(quote_error(
                                column,
                                "unexpected character after closing quote",
                            ));
                        }
                    },
                    Some(_) => i += 1,
                }
            }
        } else {
            loop {
                match bytes.get(i).copied() {
                    None | Some(b'\r' | b'\n') => return Ok(()),
                    Some(b'"') => return Err(quote_error(column, "bare quote in unquoted field")),
                    Some(b) if b == delimiter => {
                        i += 1;
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
        }
        column += 1;
    }
}

fn quote_error(column: usize, reason: &str) -> ParseError {
    ParseError::Tokenize {
        reason: format!("{reason} (field {column})"),
    }
}

/// CSV 로그 파서
///
/// 생성 후 변경되지 않으며 여러 스레드에서 공유할 수 있습니다.
#[derive(Debug)]
pub struct CsvParser {
    app: String,
    app_ver: String,
    filename: String,
    hostname: String,
    fields_order: Vec<String>,
    schema: Schema,
    options: CsvOptions,
    reader: ReaderBuilder,
}

impl CsvParser {
    /// 새 CSV 파서를 생성합니다.
    ///
    /// `checknheaders`는 `fields_order` 길이를 넘지 않도록 잘립니다.
    pub fn new(
        app: impl Into<String>,
        app_ver: impl Into<String>,
        filename: impl Into<String>,
        hostname: impl Into<String>,
        fields_order: Vec<String>,
        schema: Schema,
        options: &[String],
    ) -> Self {
        let mut options = CsvOptions::parse(options);
        if options.check_n_headers > fields_order.len() {
            warn!(
                requested = options.check_n_headers,
                fields = fields_order.len(),
                "clamping checknheaders to fields_order length"
            );
            options.check_n_headers = fields_order.len();
        }

        let mut reader = ReaderBuilder::new();
        reader
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter);

        Self {
            app: app.into(),
            app_ver: app_ver.into(),
            filename: filename.into(),
            hostname: hostname.into(),
            fields_order,
            schema,
            options,
            reader,
        }
    }

    /// 해석된 옵션
    pub fn options(&self) -> CsvOptions {
        self.options
    }

    pub fn fields_order(&self) -> &[String] {
        &self.fields_order
    }

    /// 기본값 레코드를 만듭니다.
    ///
    /// 스키마의 모든 키는 `"\N"`이며, 메타데이터 키와 수집 시각이 채워집니다.
    /// `event_datetime`은 `ingest_datetime`과 같은 값으로 시작합니다.
    pub fn defaults(&self) -> Record {
        let mut record: Record = self
            .schema
            .keys()
            .map(|k| (k.to_owned(), NULL_SENTINEL.to_owned()))
            .collect();

        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        record.insert(keys::APP.to_owned(), self.app.clone());
        record.insert(keys::APP_VER.to_owned(), self.app_ver.clone());
        record.insert(keys::FILENAME.to_owned(), self.filename.clone());
        record.insert(keys::HOSTNAME.to_owned(), self.hostname.clone());
        record.insert(keys::EVENT_DATETIME.to_owned(), now.clone());
        record.insert(keys::INGEST_DATETIME.to_owned(), now);
        record
    }

    fn tokenize(&self, line: &str) -> Result<StringRecord, ParseError> {
        check_quotes(line, self.options.delimiter)?;

        let mut rdr = self.reader.from_reader(line.as_bytes());
        let mut tokens = StringRecord::new();
        match rdr.read_record(&mut tokens) {
            Ok(true) => Ok(tokens),
            Ok(false) => Err(ParseError::Tokenize {
                reason: "line contains no fields".to_owned(),
            }),
            Err(e) => Err(ParseError::Tokenize {
                reason: e.to_string(),
            }),
        }
    }

    /// 라인이 헤더인지 판정합니다.
    ///
    /// 앞쪽 `checknheaders`개 필드 이름을 구분자로 이어 붙인 문자열과,
    /// 따옴표를 제거한 라인의 같은 길이 접두어를 대소문자 무시로 비교합니다.
    fn is_header(&self, line: &str) -> bool {
        let n = self.options.check_n_headers;
        if n == 0 {
            return false;
        }

        let delimiter = char::from(self.options.delimiter).to_string();
        let expected = self.fields_order[..n].join(&delimiter).to_lowercase();
        let unquoted = line.replace('"', "").to_lowercase();

        unquoted
            .get(..expected.len())
            .is_some_and(|prefix| prefix == expected)
    }

    fn fail(&self, record: Record, error: ParseError) -> ParseOutcome {
        metrics::counter!(
            m::PARSER_ERRORS_TOTAL,
            m::LABEL_PARSER_FORMAT => FORMAT_NAME,
            m::LABEL_ERROR_KIND => error.kind()
        )
        .increment(1);
        debug!(filename = %self.filename, error = %error, "csv line rejected");
        ParseOutcome::with_error(record, error)
    }
}

impl LineParser for CsvParser {
    fn format_name(&self) -> &str {
        FORMAT_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn parse(&self, line: &str) -> ParseOutcome {
        metrics::counter!(m::PARSER_LINES_TOTAL, m::LABEL_PARSER_FORMAT => FORMAT_NAME)
            .increment(1);

        let mut record = self.defaults();

        let tokens = match self.tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => return self.fail(record, e),
        };

        if tokens.len() != self.fields_order.len() {
            let error = ParseError::FieldsOrderMismatch {
                expected: self.fields_order.len(),
                actual: tokens.len(),
            };
            return self.fail(record, error);
        }

        if self.options.skip_header && self.is_header(line) {
            metrics::counter!(
                m::PARSER_HEADERS_SKIPPED_TOTAL,
                m::LABEL_PARSER_FORMAT => FORMAT_NAME
            )
            .increment(1);
            debug!(filename = %self.filename, "skipping csv header line");
            return ParseOutcome::ok(record);
        }

        let mut overflow = String::new();
        for (field, value) in self.fields_order.iter().zip(tokens.iter()) {
            match record.get_mut(field.as_str()) {
                Some(slot) if !field.is_empty() => {
                    *slot = if is_null(value) {
                        NULL_SENTINEL.to_owned()
                    } else {
                        value.to_owned()
                    };
                }
                _ => {
                    overflow.push_str(value);
                    overflow.push(' ');
                }
            }
        }

        let overflow = clean_overflow(&overflow);
        if !overflow.is_empty() {
            record.insert(keys::LOG_LINE.to_owned(), overflow);
        }

        ParseOutcome::ok(record)
    }
}
