//! Provider 公共工具函数

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::types::{DnsRecordSpec, GatewayOptions};

// ============ HTTP Client ============

/// 创建带超时配置的 HTTP Client
///
/// 每个网络调用都有硬性截止时间，避免挂起的 Provider API 拖住管理请求。
pub fn create_http_client(options: &GatewayOptions, provider: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .timeout(options.request_timeout)
        .build()
        .map_err(|e| ProviderError::SerializationError {
            provider: provider.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// 选择 API 基础地址（允许配置覆盖）
pub fn resolve_base_url(options: &GatewayOptions, default_base: &str) -> String {
    options
        .base_url
        .clone()
        .unwrap_or_else(|| default_base.to_string())
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// 将相对名称转换为完整域名
/// 如: "mail" + "example.com" -> "mail.example.com"
/// 如: "@" + "example.com" -> "example.com"
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}

/// 比较 TXT 值时去掉两端引号
pub fn unquote_txt(value: &str) -> &str {
    value.trim().trim_matches('"')
}

/// 已有 TXT 值是否会被 `record` 覆盖（调用方已保证同 type + name）
///
/// `_domainkey` / `_dmarc` 名下只有一条策略记录，同名即覆盖；其它名称（如 `@`）
/// 上可能并存站点验证等记录，按 `v=` 标签匹配，无标签时按值匹配。
pub fn txt_supersedes(record: &DnsRecordSpec, existing_value: &str) -> bool {
    let name = record.name.as_str();
    if name == "_dmarc" || name == "_domainkey" || name.ends_with("._domainkey") {
        return true;
    }
    let existing = unquote_txt(existing_value);
    match record.txt_tag() {
        Some(tag) => existing.starts_with(tag),
        None => existing == unquote_txt(&record.value),
    }
}
