//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use secrecy::SecretString;
use yandex_dns_provider::{
    ClientConfig, CredentialSource, RecordSet, UpsertRequest, YandexDnsClient,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

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
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
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

/// 测试用 service account key
pub const FIXTURE_KEY_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/authorized_key.json"
);

/// 静态 IAM token，指向 mock server
pub fn mock_config(server_uri: &str) -> ClientConfig {
    ClientConfig::new(
        "b1gtestfolder",
        CredentialSource::IamToken(SecretString::from("t1.mock-token".to_string())),
    )
    .endpoint(format!("{server_uri}/dns/v1"))
}

/// 生成唯一的测试记录名称
pub fn generate_test_record_name(zone_name: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}.{zone_name}", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装 client 和测试 zone
pub struct TestContext {
    pub client: YandexDnsClient,
    pub zone_name: String,
    pub zone_id: Option<String>,
}

impl TestContext {
    /// 从环境变量创建（`YC_*` + `TEST_ZONE`）
    pub async fn from_env() -> Option<Self> {
        let zone_name = env::var("TEST_ZONE").ok()?;
        let config = ClientConfig::from_env().ok()?;
        let client = YandexDnsClient::connect(&config).await.ok()?;

        Some(Self {
            client,
            zone_name,
            zone_id: None,
        })
    }

    /// 查找测试 zone 的 ID（只匹配公共 zone）
    pub async fn find_zone_id(&mut self) -> Option<String> {
        if self.zone_id.is_some() {
            return self.zone_id.clone();
        }

        let zones = self.client.list_zones().await.ok()?;
        let zone = zones
            .into_iter()
            .find(|z| z.name == self.zone_name && !z.is_private)?;

        self.zone_id = Some(zone.id.clone());
        Some(zone.id)
    }

    /// 查找并清理所有测试记录（以 _test- 开头的记录）
    pub async fn cleanup_all_test_records(&self, zone_id: &str) {
        let Ok(record_sets) = self.client.list_record_sets(zone_id).await else {
            return;
        };

        let deletions: Vec<RecordSet> = record_sets
            .into_iter()
            .filter(|r| r.name.starts_with("_test-"))
            .collect();
        if deletions.is_empty() {
            return;
        }

        let request = UpsertRequest {
            zone_id: zone_id.to_string(),
            deletions,
            ..Default::default()
        };
        let _ = self.client.upsert_record_sets(&request).await;
    }
}
