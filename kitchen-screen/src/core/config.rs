use std::time::Duration;

/// 厨房屏幕配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | SHOP_ID | 0 | 当前 POS 配置 (店铺) ID |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 日志目录，未设置时只输出到控制台 |
/// | BUS_CAPACITY | 1024 | 消息总线通道容量 |
/// | API_ENABLED | false | 是否转发订单到外部 API |
/// | API_ENDPOINT | https://a.com/api | 外部 API 地址 |
/// | API_TIMEOUT_SECS | 30 | 外部 API 超时(秒) |
///
/// # 示例
///
/// ```ignore
/// SHOP_ID=3 LOG_LEVEL=debug cargo run -p kitchen-screen
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 当前店铺 ID，只接收 `config_id` 相同的消息
    pub shop_id: i64,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 消息总线广播通道容量
    pub bus_capacity: usize,
    /// 是否启用外部 API 转发
    pub api_enabled: bool,
    /// 外部 API 地址
    pub api_endpoint: String,
    /// 外部 API 超时 (秒)
    pub api_timeout_secs: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            shop_id: std::env::var("SHOP_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            bus_capacity: std::env::var("BUS_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(1024),
            api_enabled: std::env::var("API_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            api_endpoint: std::env::var("API_ENDPOINT")
                .unwrap_or_else(|_| "https://a.com/api".into()),
            api_timeout_secs: std::env::var("API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|t| *t > 0)
                .unwrap_or(30),
        }
    }

    /// 使用指定店铺 ID 覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_shop_id(shop_id: i64) -> Self {
        let mut config = Self::from_env();
        config.shop_id = shop_id;
        config
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
