#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: CSV 라인 파서와 로그 파일별 파서 레지스트리
//!
//! # 아키텍처
//!
//! ```text
//! AppConfig -> ParserRegistry -> LogfileParser -> (front split) -> CsvParser -> Record
//!                                    |                                 |
//!                              logfile + stream                 defaults / overflow
//! ```

pub mod parser;

// --- 주요 타입 re-export ---

// 파서
pub use parser::{CsvOptions, CsvParser, LogfileParser, ParserRegistry};
