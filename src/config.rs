use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub mall: MallConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
    #[serde(default = "default_mall_token_expires_in")]
    pub mall_token_expires_in: i64, // seconds
}

fn default_mall_token_expires_in() -> i64 {
    7 * 24 * 3600
}

/// 商城结算参数（金额单位：원）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MallConfig {
    pub shipping_fee: i64,
    pub free_shipping_threshold: i64,
}

impl Default for MallConfig {
    fn default() -> Self {
        Self {
            shipping_fee: 3000,
            free_shipping_threshold: 50000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerConfig {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub partners: Vec<PartnerConfig>,
    /// 订单来源不属于任何已知合作方时归入此合作方
    pub default_partner: String,
    pub vat_rate: f64,
    pub default_commission_rate: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            partners: vec![
                PartnerConfig {
                    code: "coupang".to_string(),
                    name: "Coupang".to_string(),
                },
                PartnerConfig {
                    code: "rocket_growth".to_string(),
                    name: "Rocket Growth".to_string(),
                },
                PartnerConfig {
                    code: "smartstore".to_string(),
                    name: "Smart Store".to_string(),
                },
                PartnerConfig {
                    code: "mall".to_string(),
                    name: "Own Mall".to_string(),
                },
            ],
            default_partner: "coupang".to_string(),
            vat_rate: 0.1,
            default_commission_rate: 0.02585,
        }
    }
}

impl PerformanceConfig {
    pub fn partner_name(&self, code: &str) -> Option<&str> {
        self.partners
            .iter()
            .find(|p| p.code == code)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub retention_sweep_interval_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            retention_sweep_interval_secs: 6 * 3600,
        }
    }
}

/// 首次启动时创建的管理员账号，邮箱为空则跳过
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                        mall_token_expires_in: get_env_parse(
                            "JWT_MALL_EXPIRES_IN",
                            default_mall_token_expires_in(),
                        ),
                    },
                    mall: MallConfig::default(),
                    performance: PerformanceConfig::default(),
                    chat: ChatConfig::default(),
                    bootstrap: BootstrapConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(toml::from_str(config_str).map_err(|e| format!("解析配置文件失败: {e}"))?)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_MALL_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.mall_token_expires_in = n;
        }
        if let Ok(v) = env::var("MALL_SHIPPING_FEE")
            && let Ok(n) = v.parse()
        {
            self.mall.shipping_fee = n;
        }
        if let Ok(v) = env::var("MALL_FREE_SHIPPING_THRESHOLD")
            && let Ok(n) = v.parse()
        {
            self.mall.free_shipping_threshold = n;
        }
        if let Ok(v) = env::var("CHAT_RETENTION_SWEEP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.chat.retention_sweep_interval_secs = n;
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.bootstrap.admin_email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.bootstrap.admin_password = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_file_fills_defaults() {
        let raw = r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
url = "postgres://localhost/crm"
max_connections = 5

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120
"#;
        let config = Config::parse(raw).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.jwt.mall_token_expires_in, 7 * 24 * 3600);
        assert_eq!(config.mall.shipping_fee, 3000);
        assert_eq!(config.performance.default_partner, "coupang");
        assert!((config.performance.default_commission_rate - 0.02585).abs() < 1e-9);
        assert!(config.bootstrap.admin_email.is_none());
    }

    #[test]
    fn test_parse_custom_partners() {
        let raw = r#"
[server]
host = "0.0.0.0"
port = 8080

[database]
url = "postgres://localhost/crm"
max_connections = 5

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120

[performance]
default_partner = "a"
vat_rate = 0.1
default_commission_rate = 0.03
partners = [{ code = "a", name = "Alpha" }, { code = "b", name = "Beta" }]
"#;
        let config = Config::parse(raw).unwrap();
        assert_eq!(config.performance.partners.len(), 2);
        assert_eq!(config.performance.partner_name("b"), Some("Beta"));
        assert_eq!(config.performance.partner_name("zzz"), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Config::parse("not = [valid").is_err());
    }
}
