//! GoDaddy API 类型定义

use serde::{Deserialize, Serialize};

use crate::types::DnsRecordSpec;

/// 错误响应体
#[derive(Debug, Deserialize)]
pub struct GodaddyErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub fields: Vec<GodaddyErrorField>,
}

/// 字段级校验错误
#[derive(Debug, Deserialize)]
pub struct GodaddyErrorField {
    pub path: Option<String>,
    pub message: Option<String>,
}

impl GodaddyErrorBody {
    /// 拼出带字段路径的错误消息
    pub fn describe(&self) -> String {
        let base = self
            .message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string());
        match self.fields.first() {
            Some(GodaddyErrorField {
                path: Some(path),
                message,
            }) => format!(
                "{base} ({path}: {})",
                message.as_deref().unwrap_or("invalid")
            ),
            _ => base,
        }
    }
}

/// `GET /v1/domains` 的单个条目
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GodaddyDomain {
    pub domain: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// `/v1/domains/{domain}/records/{type}/{name}` 下的单条记录
///
/// GET 响应里的 `type` / `name` 由路径决定，这里不保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GodaddyRecord {
    pub data: String,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl From<&DnsRecordSpec> for GodaddyRecord {
    fn from(record: &DnsRecordSpec) -> Self {
        Self {
            data: record.value.clone(),
            ttl: record.ttl,
            priority: record.priority,
        }
    }
}
