//! Cloudflare API 类型定义

use serde::{Deserialize, Serialize};

/// Cloudflare API 通用响应
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    pub errors: Option<Vec<CloudflareError>>,
    pub result_info: Option<CloudflareResultInfo>,
}

impl<T> CloudflareResponse<T> {
    /// 第一个错误的 (code, message)
    pub fn first_error(&self) -> (Option<String>, String) {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map_or_else(
                || (None, "Unknown error".to_string()),
                |e| (Some(e.code.to_string()), e.message.clone()),
            )
    }
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareResultInfo {
    pub page: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Cloudflare Zone 结构
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
}

/// Cloudflare DNS Record 结构（响应）
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
}

/// 创建/覆盖记录的请求体（POST 与 PUT 共用）
#[derive(Debug, Serialize)]
pub struct CloudflareRecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: String,
    pub content: &'a str,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// `/user/tokens/verify` 的 result
#[derive(Debug, Deserialize)]
pub struct TokenVerification {
    pub status: String,
}
