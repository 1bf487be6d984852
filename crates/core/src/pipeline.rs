//! 파이프라인 trait — 라인 파서 확장 포인트 정의

use crate::error::ParseError;
use crate::types::{Record, Schema};

/// 라인 단위 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 파서는 생성 후 변경되지 않으므로 여러 스레드에서 공유할 수 있습니다.
pub trait LineParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 레코드 기본값을 채우는 데 쓰는 스키마
    fn schema(&self) -> &Schema;

    /// 원시 라인 하나를 레코드로 변환
    ///
    /// 실패해도 레코드는 항상 반환됩니다. 실패한 라인의 레코드는 기본값만 담습니다.
    fn parse(&self, line: &str) -> ParseOutcome;
}

/// 라인 하나의 파싱 결과
///
/// 레코드와 함께 최대 하나의 에러를 담습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub record: Record,
    pub error: Option<ParseError>,
}

impl ParseOutcome {
    /// 성공 결과
    pub fn ok(record: Record) -> Self {
        Self {
            record,
            error: None,
        }
    }

    /// 기본값 레코드와 에러
    pub fn with_error(record: Record, error: ParseError) -> Self {
        Self {
            record,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// 에러가 있으면 레코드를 버리고 에러를 반환합니다.
    pub fn into_result(self) -> Result<Record, ParseError> {
        match self.error {
            None => Ok(self.record),
            Some(err) => Err(err),
        }
    }
}
