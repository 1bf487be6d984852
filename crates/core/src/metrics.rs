//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `linecast_`
//! - 모듈명: `config_`, `parser_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(linecast_core::metrics::PARSER_LINES_TOTAL, "format" => "csv").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 파서 형식 레이블 키 (csv 등)
pub const LABEL_PARSER_FORMAT: &str = "format";

/// 에러 종류 레이블 키 (fields_order_mismatch, tokenize)
pub const LABEL_ERROR_KIND: &str = "kind";

// ─── Config 메트릭 ─────────────────────────────────────────────────

/// Config: 설정 로딩 성공 횟수 (counter)
pub const CONFIG_LOADS_TOTAL: &str = "linecast_config_loads_total";

/// Config: 로딩된 로그 파일 정의 수 (gauge)
pub const CONFIG_LOGFILES: &str = "linecast_config_logfiles";

// ─── Parser 메트릭 ─────────────────────────────────────────────────

/// Parser: 입력된 라인 수 (counter, label: format)
pub const PARSER_LINES_TOTAL: &str = "linecast_parser_lines_total";

/// Parser: 파싱 에러 수 (counter, labels: format, kind)
pub const PARSER_ERRORS_TOTAL: &str = "linecast_parser_errors_total";

/// Parser: 헤더로 판정되어 건너뛴 라인 수 (counter, label: format)
pub const PARSER_HEADERS_SKIPPED_TOTAL: &str = "linecast_parser_headers_skipped_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        CONFIG_LOADS_TOTAL,
        "Total number of successfully resolved configuration documents"
    );
    describe_gauge!(
        CONFIG_LOGFILES,
        "Number of logfile definitions in the active configuration"
    );

    describe_counter!(
        PARSER_LINES_TOTAL,
        "Total number of raw lines handed to a line parser"
    );
    describe_counter!(
        PARSER_ERRORS_TOTAL,
        "Total number of lines returned with a parse error"
    );
    describe_counter!(
        PARSER_HEADERS_SKIPPED_TOTAL,
        "Total number of lines recognised as a header and skipped"
    );
}
