//! 설정 관리 — INI/YAML 설정 문서 로딩
//!
//! [`AppConfig`]는 설정 문서 하나에서 한 번 만들어지며 이후 변경되지 않습니다.
//! 어떤 단계에서든 실패하면 부분 설정 없이 에러를 반환합니다.
//!
//! # 설정 로딩 순서
//! 1. 설정 문서 파싱 (INI 또는 YAML)
//! 2. 스트림 등록 → 레코드 스키마 부착 → 로그 파일 해석
//! 3. 환경변수 오버라이드 (`LINECAST_APP`, `LINECAST_HOSTNAME` 등)
//! 4. 호스트명이 비어 있으면 로컬 호스트명으로 채움

mod ini;
mod logfile;
mod schema;
mod section;
mod yaml;

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ConfigError, LinecastError};
use crate::metrics as m;
use crate::types::Schema;

pub use logfile::{
    CsvStrategy, FieldMappings, LogfileConfig, LogfileConfigurator, ParseMode, ParseStrategy,
    RawLogfile, split_fields_order,
};
pub use schema::SchemaResolver;
pub use section::{DEFAULT_SECTION, SectionKind};

/// 레코드 전송 대상 스트림
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamConfig {
    /// 스트림 이름 (`stream.<name>` 섹션의 `<name>`)
    pub name: String,
    /// 스트림 종류 (예: `firehose`)
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub api_key: String,
    /// 이 스트림으로 보내는 레코드의 스키마
    pub record_format: Schema,
}

/// 애플리케이션 전체 설정
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub app: String,
    pub app_ver: String,
    pub aws_access_key: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    /// 비어 있으면 로딩 시 로컬 호스트명으로 채워집니다.
    pub hostname: String,
    /// 선언 순서대로 등록된 스트림
    pub streams: Vec<StreamConfig>,
    /// 선언 순서대로 해석된 로그 파일
    pub logfiles: Vec<LogfileConfig>,
}

/// 설정 문서 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Ini,
    Yaml,
}

impl ConfigFormat {
    /// 파일 확장자로 형식을 고릅니다. `.yml`/`.yaml` 외에는 INI입니다.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yml" | "yaml") => Self::Yaml,
            _ => Self::Ini,
        }
    }
}

impl AppConfig {
    /// 파일에서 설정을 로드합니다.
    ///
    /// 파일 형식은 확장자로 결정하며, 파싱 후 환경변수 오버라이드와
    /// 호스트명 보정을 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LinecastError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LinecastError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LinecastError::Io(e)
            }
        })?;

        let format = ConfigFormat::from_path(path);
        let mut config = Self::parse(decode(&bytes)?, format)?;
        config.apply_env_overrides();
        config.resolve_hostname()?;

        metrics::counter!(m::CONFIG_LOADS_TOTAL).increment(1);
        metrics::gauge!(m::CONFIG_LOGFILES).set(config.logfiles.len() as f64);
        info!(
            path = %path.display(),
            ?format,
            streams = config.streams.len(),
            logfiles = config.logfiles.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// 메모리 상의 설정 문서를 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_bytes(bytes: &[u8], format: ConfigFormat) -> Result<Self, ConfigError> {
        let mut config = Self::parse(decode(bytes)?, format)?;
        config.resolve_hostname()?;
        Ok(config)
    }

    /// 설정 문서를 해석합니다 (환경변수, 호스트명 보정 없음).
    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config = match format {
            ConfigFormat::Ini => ini::parse_ini(text)?,
            ConfigFormat::Yaml => yaml::parse_yaml(text)?,
        };
        config.check_stream_references();
        Ok(config)
    }

    /// 이름으로 스트림을 찾습니다.
    pub fn stream(&self, name: &str) -> Option<&StreamConfig> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// 이름으로 로그 파일 설정을 찾습니다.
    pub fn logfile(&self, name: &str) -> Option<&LogfileConfig> {
        self.logfiles.iter().find(|l| l.name == name)
    }

    pub(crate) fn stream_index(&self, name: &str) -> Option<usize> {
        self.streams.iter().position(|s| s.name == name)
    }

    /// 환경변수로 최상위 스칼라 설정을 오버라이드합니다.
    ///
    /// 환경변수 이름 규칙: `LINECAST_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.app, "LINECAST_APP");
        override_string(&mut self.app_ver, "LINECAST_APP_VER");
        override_string(&mut self.hostname, "LINECAST_HOSTNAME");
        override_string(&mut self.aws_region, "LINECAST_AWS_REGION");
    }

    /// 호스트명이 비어 있으면 로컬 호스트명으로 채웁니다.
    pub fn resolve_hostname(&mut self) -> Result<(), ConfigError> {
        if !self.hostname.is_empty() {
            return Ok(());
        }
        let name = hostname::get().map_err(|e| ConfigError::Hostname {
            reason: e.to_string(),
        })?;
        self.hostname = name.into_string().map_err(|raw| ConfigError::Hostname {
            reason: format!("host name is not valid UTF-8: {raw:?}"),
        })?;
        Ok(())
    }

    // 로그 파일의 스트림 참조는 강제하지 않습니다.
    fn check_stream_references(&self) {
        for logfile in &self.logfiles {
            if !logfile.stream_name.is_empty() && self.stream(&logfile.stream_name).is_none() {
                warn!(
                    logfile = %logfile.name,
                    stream = %logfile.stream_name,
                    "logfile references an unknown stream"
                );
            }
        }
    }
}

fn decode(bytes: &[u8]) -> Result<&str, ConfigError> {
    std::str::from_utf8(bytes).map_err(|e| ConfigError::ParseFailed {
        reason: format!("config is not valid UTF-8: {e}"),
    })
}

fn override_string(target: &mut String, env_key: &str) {
    match std::env::var(env_key) {
        Ok(val) => *target = val,
        Err(std::env::VarError::NotUnicode(_)) => {
            warn!(env_key, "env var is not valid UTF-8, ignoring");
        }
        Err(std::env::VarError::NotPresent) => {}
    }
}
