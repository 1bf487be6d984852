//! 도메인 타입 — 레코드 스키마와 레코드
//!
//! 스트림 목적지마다 [`Schema`]가 하나씩 있으며, 파서는 이 스키마의 키로
//! 출력 레코드를 채웁니다. 레코드의 모든 값은 문자열이며 타입 변환은
//! 하위 소비자(publisher)의 몫입니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 값이 없거나 알 수 없음을 나타내는 null 센티널
pub const NULL_SENTINEL: &str = "\\N";

/// 파서가 직접 채우는 예약 키
pub mod keys {
    pub const APP: &str = "app";
    pub const APP_VER: &str = "app_ver";
    pub const INGEST_DATETIME: &str = "ingest_datetime";
    pub const EVENT_DATETIME: &str = "event_datetime";
    pub const HOSTNAME: &str = "hostname";
    pub const FILENAME: &str = "filename";
    /// 스키마 필드에 매핑되지 않은 입력을 재구성한 오버플로우 필드
    pub const LOG_LINE: &str = "log_line";
}

/// 파싱된 레코드 (필드명 → 문자열 값)
pub type Record = BTreeMap<String, String>;

/// 스키마 필드 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// 문자열 (길이 제한은 [`Attribute::length`])
    String,
    /// 정수
    Integer,
    /// 배정밀도 실수
    Double,
    /// 타임스탬프
    Timestamp,
}

impl AttributeType {
    /// 문자열에서 타입을 파싱합니다.
    ///
    /// 대소문자와 앞뒤 공백을 무시합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "double" => Some(Self::Double),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Double => write!(f, "double"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// 스키마 필드 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// 필드명 (스키마 내에서 유일)
    pub key: String,
    /// 필드 타입
    #[serde(rename = "type")]
    pub kind: AttributeType,
    /// 표시 길이 (0 = 제한 없음)
    pub length: usize,
}

impl Attribute {
    /// 새 필드를 생성합니다.
    pub fn new(key: impl Into<String>, kind: AttributeType, length: usize) -> Self {
        Self {
            key: key.into(),
            kind,
            length,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.length > 0 {
            write!(f, "{} {}({})", self.key, self.kind, self.length)
        } else {
            write!(f, "{} {}", self.key, self.kind)
        }
    }
}

/// 레코드 스키마
///
/// 필드 순서가 의미를 가집니다 (하위 소비자의 출력 컬럼 순서).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    /// 필드 목록으로 스키마를 생성합니다.
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// 내장 기본 스키마를 반환합니다.
    pub fn builtin() -> Self {
        use AttributeType::{Double, Integer, String, Timestamp};

        let attributes = [
            ("app", String, 16),
            ("app_ver", String, 16),
            ("ingest_datetime", Timestamp, 0),
            ("event_datetime", Timestamp, 0),
            ("hostname", String, 64),
            ("filename", String, 256),
            ("log_level", String, 16),
            ("device_tag", String, 64),
            ("user_tag", String, 64),
            ("remote_address", String, 64),
            ("response_bytes", Integer, 0),
            ("response_ms", Double, 0),
            ("device_type", String, 32),
            ("os", String, 16),
            ("os_ver", String, 16),
            ("browser", String, 32),
            ("browser_ver", String, 16),
            ("country", String, 64),
            ("language", String, 16),
            ("log_line", String, 0),
        ]
        .into_iter()
        .map(|(key, kind, length)| Attribute::new(key, kind, length))
        .collect();

        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// 선언 순서대로 필드명을 반환합니다.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key == key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}
