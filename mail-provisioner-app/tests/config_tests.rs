#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `AppConfig` loading and environment overrides.

use std::collections::HashMap;
use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Duration;

use mail_provisioner_app::config::{
    ENV_CLOUDFLARE_API_TOKEN, ENV_GODADDY_API_KEY, ENV_GODADDY_API_SECRET, ENV_PROVIDER,
    ENV_PROVIDER_URL,
};
use mail_provisioner_app::{AppConfig, ConfigError};
use mail_provisioner_provider::{ProviderCredentials, ProviderType};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn full_file_is_parsed() {
    let file = write_config(
        r#"
[provider]
kind = "godaddy"
api_key = "key"
api_secret = "secret"
base_url = "http://127.0.0.1:8080/"
timeout_secs = 20

[discovery]
endpoint = "https://ip.example.net"
timeout_secs = 3
static_address = "198.51.100.7"

[dkim]
default_selector = "mail2024"
"#,
    );

    let config = AppConfig::from_file(file.path()).unwrap();

    assert_eq!(config.provider.kind, Some(ProviderType::Godaddy));
    assert_eq!(config.discovery.endpoint, "https://ip.example.net");
    assert_eq!(config.discovery_timeout(), Duration::from_secs(3));
    assert_eq!(
        config.discovery.static_address,
        Some(Ipv4Addr::new(198, 51, 100, 7))
    );
    assert_eq!(config.dkim.default_selector, "mail2024");

    let options = config.gateway_options();
    assert_eq!(options.request_timeout, Duration::from_secs(20));
    assert_eq!(options.base_url.as_deref(), Some("http://127.0.0.1:8080"));

    match config.credentials() {
        Some(ProviderCredentials::Godaddy {
            api_key,
            api_secret,
        }) => {
            assert_eq!(api_key, "key");
            assert_eq!(api_secret, "secret");
        }
        other => panic!("unexpected credentials: {other:?}"),
    }
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_config("");
    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(config.credentials().is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = AppConfig::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[provider\nkind = ");
    assert!(matches!(
        AppConfig::from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn unknown_provider_kind_is_rejected() {
    let result = AppConfig::from_toml_str("[provider]\nkind = \"route53\"\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));

    let mut config = AppConfig::default();
    let result = config.apply_env(env(&[(ENV_PROVIDER, "route53")]));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn zero_timeout_is_rejected() {
    let result = AppConfig::from_toml_str("[discovery]\ntimeout_secs = 0\n");
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn environment_overrides_file_values() {
    let mut config = AppConfig::from_toml_str(
        "[provider]\nkind = \"godaddy\"\napi_key = \"file-key\"\napi_secret = \"file-secret\"\n",
    )
    .unwrap();

    config
        .apply_env(env(&[
            (ENV_PROVIDER, "cloudflare"),
            (ENV_CLOUDFLARE_API_TOKEN, "env-token"),
            (ENV_PROVIDER_URL, "http://localhost:9999"),
            (ENV_GODADDY_API_KEY, "  "),
        ]))
        .unwrap();

    assert_eq!(config.provider.kind, Some(ProviderType::Cloudflare));
    // 空白值不覆盖
    assert_eq!(config.provider.api_key.as_deref(), Some("file-key"));
    assert_eq!(
        config.gateway_options().base_url.as_deref(),
        Some("http://localhost:9999")
    );
    assert!(matches!(
        config.credentials(),
        Some(ProviderCredentials::Cloudflare { api_token }) if api_token == "env-token"
    ));
}

#[test]
fn provider_inferred_from_credentials() {
    let mut godaddy_only = AppConfig::default();
    godaddy_only
        .apply_env(env(&[
            (ENV_GODADDY_API_KEY, "k"),
            (ENV_GODADDY_API_SECRET, "s"),
        ]))
        .unwrap();
    assert!(matches!(
        godaddy_only.credentials(),
        Some(ProviderCredentials::Godaddy { .. })
    ));

    let mut half = AppConfig::default();
    half.apply_env(env(&[(ENV_GODADDY_API_KEY, "k")])).unwrap();
    assert!(half.credentials().is_none());
}

#[test]
fn selected_provider_without_credentials_is_unconfigured() {
    let mut config = AppConfig::default();
    config
        .apply_env(env(&[
            (ENV_PROVIDER, "godaddy"),
            (ENV_CLOUDFLARE_API_TOKEN, "token"),
        ]))
        .unwrap();
    assert!(config.credentials().is_none());
}
