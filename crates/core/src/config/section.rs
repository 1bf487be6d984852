//! 섹션 이름 문법
//!
//! INI 섹션 이름을 점(`.`)으로 구분된 구조로 파싱하여 역할을 결정합니다.
//!
//! | 섹션 이름                     | 분류                 |
//! |-------------------------------|----------------------|
//! | `DEFAULT`                     | 최상위 스칼라 설정   |
//! | `stream.<name>`               | 스트림 기본 필드     |
//! | `stream.<name>.record_format` | 스트림 레코드 스키마 |
//! | `<logfile>.field_mappings`    | 필드 매핑 하위 섹션  |
//! | `<logfile>` (점 없음)         | 로그 파일 정의       |
//! | 그 외                         | 무시                 |

/// 최상위 스칼라 설정 섹션 이름
pub const DEFAULT_SECTION: &str = "DEFAULT";

const STREAM_PREFIX: &str = "stream";
const RECORD_FORMAT: &str = "record_format";
const FIELD_MAPPINGS: &str = "field_mappings";

/// 섹션 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind<'a> {
    /// `DEFAULT`
    Default,
    /// `stream.<name>`
    StreamBase(&'a str),
    /// `stream.<name>.record_format`
    StreamSchema(&'a str),
    /// `<logfile>.field_mappings`
    FieldMappings(&'a str),
    /// `<logfile>`
    Logfile(&'a str),
    /// 역할이 없는 섹션
    Skip,
}

impl<'a> SectionKind<'a> {
    /// 섹션 이름을 분류합니다.
    pub fn classify(name: &'a str) -> Self {
        if name == DEFAULT_SECTION {
            return Self::Default;
        }

        let parts: Vec<&str> = name.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Self::Skip;
        }

        match *parts.as_slice() {
            [STREAM_PREFIX, RECORD_FORMAT] | [RECORD_FORMAT] => Self::Skip,
            [STREAM_PREFIX, stream] => Self::StreamBase(stream),
            [STREAM_PREFIX, stream, RECORD_FORMAT] => Self::StreamSchema(stream),
            [logfile, FIELD_MAPPINGS] => Self::FieldMappings(logfile),
            [logfile] => Self::Logfile(logfile),
            _ => Self::Skip,
        }
    }

    /// `<logfile>.field_mappings` 하위 섹션 이름을 만듭니다.
    pub fn field_mappings_section(logfile: &str) -> String {
        format!("{logfile}.{FIELD_MAPPINGS}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_default() {
        assert_eq!(SectionKind::classify("DEFAULT"), SectionKind::Default);
    }

    #[test]
    fn classify_stream_sections() {
        assert_eq!(
            SectionKind::classify("stream.web"),
            SectionKind::StreamBase("web")
        );
        assert_eq!(
            SectionKind::classify("stream.web.record_format"),
            SectionKind::StreamSchema("web")
        );
    }

    #[test]
    fn classify_field_mappings() {
        assert_eq!(
            SectionKind::classify("nginx.field_mappings"),
            SectionKind::FieldMappings("nginx")
        );
    }

    #[test]
    fn classify_logfile() {
        assert_eq!(
            SectionKind::classify("nginx_access"),
            SectionKind::Logfile("nginx_access")
        );
        // 접두어 없는 단독 "stream"도 로그 파일로 취급
        assert_eq!(
            SectionKind::classify("stream"),
            SectionKind::Logfile("stream")
        );
    }

    #[test]
    fn classify_skip() {
        assert_eq!(SectionKind::classify("record_format"), SectionKind::Skip);
        assert_eq!(SectionKind::classify("stream.record_format"), SectionKind::Skip);
        assert_eq!(SectionKind::classify("nginx.options"), SectionKind::Skip);
        assert_eq!(SectionKind::classify("stream."), SectionKind::Skip);
        assert_eq!(SectionKind::classify("stream..record_format"), SectionKind::Skip);
        assert_eq!(SectionKind::classify("a.b.c.d"), SectionKind::Skip);
        assert_eq!(SectionKind::classify(""), SectionKind::Skip);
    }

    #[test]
    fn field_mappings_section_name() {
        assert_eq!(
            SectionKind::field_mappings_section("app_json"),
            "app_json.field_mappings"
        );
    }
}
