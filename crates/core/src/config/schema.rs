//! 레코드 스키마 해석기
//!
//! `stream.<name>.record_format` 하위 섹션(또는 YAML의 `record_format` 매핑)을
//! 선언 순서가 보존된 [`Schema`]로 변환합니다. 각 값은 `<type>[,<length>]`
//! 형식입니다.
//!
//! ```text
//! [stream.web.record_format]
//! app = string,16
//! event_datetime = timestamp
//! response_ms = double
//! ```

use std::collections::HashSet;

use tracing::warn;

use crate::error::ConfigError;
use crate::types::{Attribute, AttributeType, Schema};

/// 레코드 스키마 해석기
pub struct SchemaResolver;

impl SchemaResolver {
    /// 하위 섹션의 `(키, 값)` 목록으로 스키마를 만듭니다.
    ///
    /// 하위 섹션이 아예 없으면(`None`) 내장 기본 스키마를 그대로 반환합니다.
    /// 이는 에러가 아닌 구조적 대체입니다.
    ///
    /// # Errors
    /// - 알 수 없는 타입 토큰
    /// - 같은 하위 섹션 안에서 중복된 필드명
    pub fn resolve<'a, I>(section: &str, entries: Option<I>) -> Result<Schema, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let Some(entries) = entries else {
            return Ok(Schema::builtin());
        };

        let mut seen = HashSet::new();
        let mut attributes = Vec::new();

        for (key, value) in entries {
            if !seen.insert(key) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{section}.{key}"),
                    reason: "duplicate attribute name".to_owned(),
                });
            }
            attributes.push(Self::parse_attribute(section, key, value)?);
        }

        Ok(Schema::new(attributes))
    }

    /// `<type>[,<length>]` 값 하나를 해석합니다.
    ///
    /// 길이가 숫자가 아니면 0으로 대체하고 경고 로그만 남깁니다.
    pub fn parse_attribute(section: &str, key: &str, value: &str) -> Result<Attribute, ConfigError> {
        let (type_token, length_token) = match value.split_once(',') {
            Some((t, l)) => (t, Some(l.trim())),
            None => (value, None),
        };

        let kind =
            AttributeType::from_str_loose(type_token).ok_or_else(|| ConfigError::InvalidValue {
                field: format!("{section}.{key}"),
                reason: format!(
                    "unknown attribute type '{}', expected one of: string, integer, double, timestamp",
                    type_token.trim()
                ),
            })?;

        let length = match length_token {
            None | Some("") => 0,
            Some(token) => token.parse::<usize>().unwrap_or_else(|e| {
                warn!(
                    section,
                    key,
                    length = token,
                    error = %e,
                    "invalid attribute length, defaulting to 0"
                );
                0
            }),
        };

        Ok(Attribute::new(key, kind, length))
    }
}
