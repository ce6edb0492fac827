//! Cloudflare HTTP 请求方法

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// 发送请求并解包 Cloudflare 响应信封
    ///
    /// `success: false` 与非 2xx 状态都会映射为 `ProviderError`。
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &str,
        path: &str,
        ctx: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let builder = builder.header("Authorization", format!("Bearer {}", self.api_token));
        let (status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), method, path).await?;

        let response: CloudflareResponse<T> =
            match HttpUtils::parse_json(&text, self.provider_name()) {
                Ok(response) => response,
                // 非 JSON 的错误页（网关、WAF 等）按状态码映射
                Err(_) if !HttpUtils::is_success(status) => {
                    return Err(
                        self.map_status(RawApiError::new(status, truncate_for_log(&text)), ctx)
                    );
                }
                Err(e) => return Err(e),
            };

        if !response.success || !HttpUtils::is_success(status) {
            let (code, message) = response.first_error();
            let raw = match code {
                Some(code) => RawApiError::with_code(status, code, message),
                None => RawApiError::new(status, message),
            };
            let err = self.map_error(raw, ctx);
            if err.is_expected() {
                log::warn!("[cloudflare] {method} {path}: {err}");
            } else {
                log::error!("[cloudflare] {method} {path}: {err}");
            }
            return Err(err);
        }

        Ok(response)
    }

    /// GET 请求，返回完整信封（分页需要 `result_info`）
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        ctx: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let url = format!("{}{path}", self.base_url);
        self.send(self.client.get(&url), "GET", path, ctx).await
    }

    /// GET 请求，只取 `result`
    pub(crate) async fn get_result<T: DeserializeOwned>(
        &self,
        path: &str,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.get::<T>(path, ctx)
            .await?
            .result
            .ok_or_else(|| self.parse_error("missing `result` in response"))
    }

    /// 带 JSON 请求体的写操作（POST 创建 / PUT 覆盖）
    pub(crate) async fn write<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let method_name = method.as_str().to_string();
        let builder = self.client.request(method, &url).json(body);
        self.send::<serde_json::Value>(builder, &method_name, path, ctx)
            .await
            .map(|_| ())
    }
}
