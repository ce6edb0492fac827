//! GoDaddy error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::GodaddyProvider;

/// GoDaddy error code mapping
/// Reference: <https://developer.godaddy.com/doc/endpoint/domains>
impl ProviderErrorMapper for GodaddyProvider {
    fn provider_name(&self) -> &'static str {
        "godaddy"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            Some("UNABLE_TO_AUTHENTICATE" | "MISSING_CREDENTIALS" | "MALFORMED_CREDENTIALS") => {
                ProviderError::InvalidCredentials {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            Some("ACCESS_DENIED" | "NOT_AUTHORIZED") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("NOT_FOUND" | "UNKNOWN_DOMAIN") => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            Some("DUPLICATE_RECORD") => ProviderError::RecordExists {
                provider: self.provider_name().to_string(),
                record_name: context
                    .record_name
                    .unwrap_or_else(|| "<records>".to_string()),
                raw_message: Some(raw.message),
            },

            Some("INVALID_BODY" | "INVALID_VALUE_ENUM" | "UNEXPECTED_FORMAT" | "INVALID_RECORD") => {
                ProviderError::InvalidParameter {
                    provider: self.provider_name().to_string(),
                    param: "records".to_string(),
                    detail: raw.message,
                }
            }

            Some("TOO_MANY_RECORDS") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ => self.map_status(raw, context),
        }
    }
}
