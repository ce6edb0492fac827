//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use mail_provisioner_provider::{
    DnsRecordSpec, GatewayOptions, ProviderCredentials, ProviderGateway, create_provider,
};
use wiremock::MockServer;

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

pub const GODADDY_KEY: &str = "test-key";
pub const GODADDY_SECRET: &str = "test-secret";
pub const CLOUDFLARE_TOKEN: &str = "test_token_12345";

/// 指向 mock server 的网关选项（超时调短，便于测试超时分支）
pub fn options_for(server: &MockServer) -> GatewayOptions {
    GatewayOptions::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(2))
}

pub fn godaddy_gateway(server: &MockServer) -> Arc<dyn ProviderGateway> {
    create_provider(
        ProviderCredentials::Godaddy {
            api_key: GODADDY_KEY.to_string(),
            api_secret: GODADDY_SECRET.to_string(),
        },
        &options_for(server),
    )
    .expect("gateway builds")
}

pub fn cloudflare_gateway(server: &MockServer) -> Arc<dyn ProviderGateway> {
    create_provider(
        ProviderCredentials::Cloudflare {
            api_token: CLOUDFLARE_TOKEN.to_string(),
        },
        &options_for(server),
    )
    .expect("gateway builds")
}

/// example.com / 203.0.113.10 的完整邮件记录集
pub fn mail_records() -> Vec<DnsRecordSpec> {
    vec![
        DnsRecordSpec::mx("@", "mail.example.com", 10),
        DnsRecordSpec::a("mail", "203.0.113.10"),
        DnsRecordSpec::txt("@", "v=spf1 mx ip4:203.0.113.10 ~all"),
        DnsRecordSpec::txt("default._domainkey", "v=DKIM1; k=rsa; p=MIIBIjANBgkq"),
        DnsRecordSpec::txt(
            "_dmarc",
            "v=DMARC1; p=quarantine; rua=mailto:postmaster@example.com; pct=100",
        ),
    ]
}
