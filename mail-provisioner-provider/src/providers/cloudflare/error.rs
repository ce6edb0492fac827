//! Cloudflare error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareProvider;

/// Cloudflare error code mapping
/// Reference: <https://api.cloudflare.com/#getting-started-responses>
impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // Authentication error
            // 6003: Invalid request headers
            // 6111: Invalid format for Authorization header
            // 9109: Unauthorized to access requested resource
            // 1000: Invalid API token
            // 10000: Authentication error
            Some("6003" | "6111" | "9109" | "1000" | "10000") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // Invalid parameter
            // 1004: DNS Validation Error
            // 9000: Invalid or missing name
            // 9005: Content for A record is invalid. Must be a valid IPv4 address
            // 9009: Content for MX record must be a hostname
            // 9021: Invalid TTL
            Some(code @ ("1004" | "9000" | "9005" | "9009" | "9021")) => {
                let param = match code {
                    "9000" => "name",
                    "9005" | "9009" => "content",
                    "9021" => "ttl",
                    _ => "general",
                };
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: param.to_string(),
                    detail: raw.message,
                }
            }

            // record already exists
            // 81053: An A, AAAA or CNAME record already exists with that host
            // 81057: The record already exists
            // 81058: A record with those settings already exists
            Some("81053" | "81057" | "81058") => ProviderError::RecordExists {
                provider: self.provider_name().to_string(),
                record_name: context
                    .record_name
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 81045: The record quota has been exceeded
            Some("81045") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Zone does not exist
            // 7003: Could not route to /path, perhaps your object identifier is invalid?
            Some("7003") => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // 未命中的错误码按 HTTP 状态兜底
            _ => self.map_status(raw, context),
        }
    }
}
