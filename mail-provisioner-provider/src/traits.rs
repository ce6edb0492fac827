use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{DnsRecordSpec, ProviderMetadata, ReconciliationResult};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: u16,
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录名称（用于 `RecordExists` 等错误）
    pub record_name: Option<String>,
    /// 域名（用于 `DomainNotFound` 等错误）
    pub domain: Option<String>,
}

impl ErrorContext {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            record_name: None,
            domain: Some(domain.to_string()),
        }
    }

    pub fn for_record(domain: &str, record: &DnsRecordSpec) -> Self {
        Self {
            record_name: Some(record.name.clone()),
            domain: Some(domain.to_string()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback），保留 HTTP 状态便于排查
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code.or_else(|| Some(format!("HTTP {}", raw.status))),
            raw_message: raw.message,
        }
    }

    /// 按 HTTP 状态码的通用映射（各 Provider 的错误码未命中时使用）
    fn map_status(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        match raw.status {
            401 => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            403 => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },
            404 => ProviderError::DomainNotFound {
                provider,
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            _ => self.unknown_error(raw),
        }
    }
}

/// DNS provider gateway.
///
/// One implementation per provider; the record planner and the provisioning
/// orchestrator only ever see this trait.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 获取 Provider 元数据（类型级别）
    fn metadata() -> ProviderMetadata
    where
        Self: Sized;

    /// Lightweight authenticated call.
    ///
    /// Returns `Ok(false)` when the provider rejects the credentials (401/403);
    /// transport failures (timeout, unreachable API host) are `Err`.
    async fn validate_credentials(&self) -> Result<bool>;

    /// All domain names visible to the credentialed account.
    async fn list_domains(&self) -> Result<Vec<String>>;

    /// Create or replace a single record under `domain`.
    async fn upsert_record(&self, domain: &str, record: &DnsRecordSpec) -> Result<()>;

    /// Push a whole record set.
    ///
    /// 默认实现逐条调用 `upsert_record()`，遇到第一个失败即终止，
    /// 已写入的记录不会回滚。支持原生批量 API 的 Provider 应覆写为单次原子调用。
    async fn upsert_records(
        &self,
        domain: &str,
        records: &[DnsRecordSpec],
    ) -> Result<ReconciliationResult> {
        let mut applied = Vec::with_capacity(records.len());

        for record in records {
            match self.upsert_record(domain, record).await {
                Ok(()) => {
                    log::debug!("[{}] {} applied on {domain}", self.id(), record.label());
                    applied.push(record.label());
                }
                Err(e) => {
                    log::warn!(
                        "[{}] push to {domain} stopped at {}: {e} ({} record(s) already written)",
                        self.id(),
                        record.label(),
                        applied.len()
                    );
                    return Ok(ReconciliationResult::failed(
                        applied,
                        Some(record.label()),
                        e,
                    ));
                }
            }
        }

        Ok(ReconciliationResult::applied(domain, applied))
    }
}
