//! 통합 테스트 -- 설정 로딩부터 레코드 생성까지의 흐름 검증
//!
//! 설정 문서 → ParserRegistry → CSV 파싱 순서로 실제 사용 경로를 검증합니다.

use linecast_core::config::{AppConfig, ConfigFormat};
use linecast_core::error::ParseError;
use linecast_core::pipeline::LineParser;
use linecast_core::types::Schema;
use linecast_log_pipeline::{CsvParser, ParserRegistry};

const CONFIG: &str = r#"
app = shop
app_ver = 2.1.0
hostname = web-01

[stream.web]
type = firehose

[stream.web.record_format]
event_datetime = timestamp
remote_address = string,64
response_bytes = integer
log_line = string

[nginx_access]
file = access.csv
stream = web
parse_mode = csv
fields_order = event_datetime,remote_address,,response_bytes
csv_options = skipheader=true checknheaders=2

[tsv]
file = export.tsv
stream = web
parse_mode = csv
fields_order = remote_address,response_bytes
csv_options = delimiter=tab
"#;

fn registry() -> ParserRegistry {
    let config = AppConfig::parse(CONFIG, ConfigFormat::Ini).expect("config should parse");
    ParserRegistry::from_config(&config)
}

/// 설정 → 파서 → 레코드 흐름 테스트
#[test]
fn test_config_to_record_flow() {
    let registry = registry();
    let parser = registry.get("nginx_access").expect("csv parser");

    let lines = [
        "event_datetime,remote_address,request,response_bytes",
        "2024-01-15T12:00:00Z,10.0.0.1,GET /index.html,512",
        "2024-01-15T12:00:01Z,10.0.0.2,\"POST /api (v2)\",-",
        "2024-01-15T12:00:02Z,10.0.0.3",
    ];
    let outcomes: Vec<_> = lines.iter().map(|l| parser.parse(l)).collect();

    // 헤더: 기본값만, 에러 없음
    assert!(outcomes[0].is_ok());
    assert_eq!(outcomes[0].record["remote_address"], "\\N");

    // 정상 라인
    let first = &outcomes[1];
    assert!(first.is_ok());
    assert_eq!(first.record["event_datetime"], "2024-01-15T12:00:00Z");
    assert_eq!(first.record["remote_address"], "10.0.0.1");
    assert_eq!(first.record["response_bytes"], "512");
    assert_eq!(first.record["log_line"], "GET /index.html");
    assert_eq!(first.record["app"], "shop");
    assert_eq!(first.record["app_ver"], "2.1.0");
    assert_eq!(first.record["filename"], "access.csv");

    // 널 표현
    assert_eq!(outcomes[2].record["response_bytes"], "\\N");
    assert_eq!(outcomes[2].record["log_line"], "POST /api (v2)");

    // 필드 수 불일치
    assert_eq!(
        outcomes[3].error,
        Some(ParseError::FieldsOrderMismatch {
            expected: 4,
            actual: 2
        })
    );
    assert_eq!(outcomes[3].record["remote_address"], "\\N");
}

#[test]
fn test_tab_delimited_logfile() {
    let registry = registry();
    let parser = registry.get("tsv").expect("tsv parser");

    let outcome = parser.parse("192.168.0.7\t2048");
    assert!(outcome.is_ok());
    assert_eq!(outcome.record["remote_address"], "192.168.0.7");
    assert_eq!(outcome.record["response_bytes"], "2048");
}

#[test]
fn test_parser_is_shareable_across_threads() {
    let parser = std::sync::Arc::new(CsvParser::new(
        "shop",
        "1",
        "a.csv",
        "h",
        vec!["remote_address".to_owned(), "os".to_owned()],
        Schema::builtin(),
        &[],
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let parser = std::sync::Arc::clone(&parser);
            std::thread::spawn(move || parser.parse(&format!("10.0.0.{i},linux")))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let outcome = handle.join().expect("thread should not panic");
        assert_eq!(outcome.record["remote_address"], format!("10.0.0.{i}"));
    }
}

// Property-based tests using proptest
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn parser(options: &[&str]) -> CsvParser {
        CsvParser::new(
            "shop",
            "1",
            "f.csv",
            "h",
            vec!["remote_address".to_owned(), String::new(), "os".to_owned()],
            Schema::builtin(),
            &options.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>(),
        )
    }

    proptest! {
        #[test]
        fn parse_arbitrary_line_is_total(line in ".{0,512}") {
            let parser = parser(&["skipheader=true", "checknheaders=3"]);
            let outcome = parser.parse(&line);
            // 기본값 키는 항상 존재
            prop_assert!(outcome.record.contains_key("app"));
            prop_assert!(outcome.record.contains_key("ingest_datetime"));
        }

        #[test]
        fn parse_arbitrary_bytes_does_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let parser = parser(&["delimiter=;"]);
            let line = String::from_utf8_lossy(&bytes);
            let _ = parser.parse(&line);
        }

        #[test]
        fn failed_line_has_no_partial_assignment(a in "[a-z0-9]{1,16}", extra in 1usize..5) {
            let parser = parser(&[]);
            let line = std::iter::repeat_n(a.as_str(), 3 + extra).collect::<Vec<_>>().join(",");
            let outcome = parser.parse(&line);
            prop_assert!(outcome.error.is_some());
            prop_assert_eq!(outcome.record.get("os").map(String::as_str), Some("\\N"));
            prop_assert_eq!(outcome.record.get("remote_address").map(String::as_str), Some("\\N"));
        }

        #[test]
        fn well_formed_line_assigns_named_fields(a in "[0-9]{1,16}", c in "[a-z]{1,3}[0-9]{1,8}") {
            let parser = parser(&[]);
            let outcome = parser.parse(&format!("{a},mid,{c}"));
            prop_assert!(outcome.is_ok());
            prop_assert_eq!(outcome.record.get("remote_address"), Some(&a));
            prop_assert_eq!(outcome.record.get("os"), Some(&c));
            prop_assert_eq!(outcome.record.get("log_line").map(String::as_str), Some("mid"));
        }
    }
}
