#![allow(dead_code)]

pub mod header_server;

use url_enquiry::EnquiryConfig;

/// Local-only settings: never route test traffic through an environment proxy.
pub fn test_config() -> EnquiryConfig {
    EnquiryConfig {
        timeout_secs: Some(10),
        use_env_proxy: false,
        ..EnquiryConfig::default()
    }
}
