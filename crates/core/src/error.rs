//! 에러 타입 — 도메인별 에러 정의
//!
//! - [`ConfigError`]: 설정 로딩 실패. 항상 치명적이며 부분 설정은 노출되지 않습니다.
//! - [`ParseError`]: 라인 단위 파싱 실패. 기본값 레코드와 함께 값으로 반환됩니다.

/// linecast 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LinecastError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 문서 파싱 실패 (INI/YAML 문법 오류, 타입 불일치 등)
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// `stream.<name>.record_format`이 등록되지 않은 스트림을 참조
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },

    /// 파싱 모드가 요구하는 하위 섹션이 없음
    #[error("section '{section}' requires subsection '{subsection}'")]
    MissingSubsection { section: String, subsection: String },

    /// 알 수 없는 parse_mode
    #[error("section '{section}': unknown parse_mode '{mode}'")]
    UnknownParseMode { section: String, mode: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 로컬 호스트명 조회 실패
    #[error("failed to resolve hostname: {reason}")]
    Hostname { reason: String },
}

/// 라인 파싱 에러
///
/// 프로세스를 중단시키지 않으며, 호출자가 로그/스킵/카운트 여부를 결정합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 토큰 수가 필드 순서 목록 길이와 다름
    #[error("fields order mismatch: expected {expected} fields, got {actual}")]
    FieldsOrderMismatch { expected: usize, actual: usize },

    /// 따옴표 처리 오류 등 토큰화 실패
    #[error("failed to tokenize line: {reason}")]
    Tokenize { reason: String },

    /// 라인 단위 파서가 없는 형식
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl ParseError {
    /// 메트릭 레이블용 에러 종류 이름
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FieldsOrderMismatch { .. } => "fields_order_mismatch",
            Self::Tokenize { .. } => "tokenize",
            Self::UnsupportedFormat(_) => "unsupported_format",
        }
    }
}
