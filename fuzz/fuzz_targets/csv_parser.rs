#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use linecast_core::pipeline::LineParser;
use linecast_core::types::{NULL_SENTINEL, Schema};
use linecast_log_pipeline::CsvParser;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 필드 순서 (빈 이름은 overflow)
    fields_order: Vec<String>,
    /// `key=value` 형태의 CSV 옵션
    options: Vec<String>,
    line: String,
}

fuzz_target!(|input: FuzzInput| {
    // 필드 수 제한 (성능)
    let fields_order: Vec<String> = input.fields_order.into_iter().take(16).collect();
    let options: Vec<String> = input.options.into_iter().take(4).collect();

    let parser = CsvParser::new(
        "fuzz",
        "0",
        "fuzz.csv",
        "fuzz-host",
        fields_order,
        Schema::builtin(),
        &options,
    );

    let outcome = parser.parse(&input.line);

    // 실패한 라인은 기본값 레코드 그대로
    if outcome.error.is_some() {
        assert_eq!(outcome.record.get("app").map(String::as_str), Some("fuzz"));
        if let Some(log_line) = outcome.record.get("log_line") {
            assert_eq!(log_line, NULL_SENTINEL);
        }
    }
});
