//! GoDaddy HTTP 请求方法

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::GodaddyProvider;
use super::types::GodaddyErrorBody;

impl GodaddyProvider {
    /// 发送请求，非 2xx 时解析 `{code, message}` 错误体
    async fn send(
        &self,
        builder: RequestBuilder,
        method: &str,
        path: &str,
        ctx: ErrorContext,
    ) -> Result<String> {
        let builder = builder
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json");
        let (status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), method, path).await?;

        if HttpUtils::is_success(status) {
            return Ok(text);
        }

        let raw = match serde_json::from_str::<GodaddyErrorBody>(&text) {
            Ok(body) => match body.code.clone() {
                Some(code) => RawApiError::with_code(status, code, body.describe()),
                None => RawApiError::new(status, body.describe()),
            },
            Err(_) => RawApiError::new(status, truncate_for_log(&text)),
        };
        let err = self.map_error(raw, ctx);
        log_api_error(method, path, &err);
        Err(err)
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let text = self.send(self.client.get(&url), "GET", path, ctx).await?;
        HttpUtils::parse_json(&text, self.provider_name())
    }

    /// 执行 PUT 请求（GoDaddy 整体替换同 type + name 的记录，成功时响应体为空）
    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let builder = self.client.put(&url).json(body);
        self.send(builder, "PUT", path, ctx).await.map(|_| ())
    }
}

fn log_api_error(method: &str, path: &str, err: &ProviderError) {
    if err.is_expected() {
        log::warn!("[godaddy] {method} {path}: {err}");
    } else {
        log::error!("[godaddy] {method} {path}: {err}");
    }
}
