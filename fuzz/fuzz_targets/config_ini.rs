#![no_main]

use libfuzzer_sys::fuzz_target;
use linecast_core::config::{AppConfig, ConfigFormat};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = AppConfig::parse(text, ConfigFormat::Ini);
    }
});
