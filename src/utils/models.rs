use chrono::{ DateTime, Utc };
use clap::ValueEnum;
use serde::{ Deserialize, Serialize };
use std::time::Duration;

// 一条服务器记录（来自服务器列表页面的一行）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerRecord {
    pub country: String,
    pub country_code: String,
    #[serde(default)]
    pub city: String,
    pub url: String,
    #[serde(default)]
    pub port_tap: String,
    #[serde(default)]
    pub port_tun: String,
    #[serde(default)]
    pub proxy_socks: String,
    #[serde(default)]
    pub proxy_http: String,
    // 以下字段页面中没有，只会出现在其它工具写入的缓存里
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ServerRecord {
    pub fn new(country: &str, country_code: &str, city: &str, url: &str) -> Self {
        ServerRecord {
            country: country.to_string(),
            country_code: country_code.to_string(),
            city: city.to_string(),
            url: url.to_string(),
            port_tap: String::new(),
            port_tun: String::new(),
            proxy_socks: String::new(),
            proxy_http: String::new(),
            protocol: None,
            last_sync: None,
            delay: None,
            score: None,
        }
    }

    /// The `protocol` field when present, otherwise the scheme of `url`.
    pub fn protocol(&self) -> Option<&str> {
        if let Some(protocol) = &self.protocol {
            return Some(protocol.as_str());
        }
        self.url.split_once("://").map(|(scheme, _)| scheme)
    }
}

// 一次获取的完整结果（网络或缓存）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegistrySnapshot {
    pub title: String,
    pub version: u32,
    pub headers: Vec<String>,
    pub last_check: DateTime<Utc>,
    pub total: usize,
    pub servers: Vec<ServerRecord>,
}

impl RegistrySnapshot {
    pub fn new(headers: Vec<String>, servers: Vec<ServerRecord>) -> Self {
        RegistrySnapshot {
            title: "PrivateVPN Server list".to_string(),
            version: 1,
            headers,
            last_check: Utc::now(),
            total: servers.len(),
            servers,
        }
    }
}

// 单次测速的结果，rate为0表示失败或超时，duration为None表示未知
#[derive(Debug, Clone, PartialEq)]
pub struct RateResult {
    pub url: String,
    pub rate: f64,
    pub duration: Option<Duration>,
}

impl RateResult {
    pub fn failed(url: &str) -> Self {
        RateResult { url: url.to_string(), rate: 0.0, duration: None }
    }

    pub fn measured(url: &str, bytes: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { (bytes as f64) / secs } else { 0.0 };
        RateResult { url: url.to_string(), rate, duration: Some(elapsed) }
    }

    pub fn kibps(&self) -> f64 {
        self.rate / 1024.0
    }

    pub fn seconds(&self) -> f64 {
        self.duration.map(|d| d.as_secs_f64()).unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    Age,
    Rate,
    Country,
    CountryCode,
    Score,
    Delay,
}

impl SortKey {
    pub fn description(&self) -> &'static str {
        match self {
            SortKey::Age => "last server synchronization",
            SortKey::Rate => "download rate",
            SortKey::Country => "server's location",
            SortKey::CountryCode => "server's country code",
            SortKey::Score => "MirrorStatus score",
            SortKey::Delay => "MirrorStatus delay",
        }
    }

    pub fn help_text() -> String {
        SortKey::value_variants()
            .iter()
            .filter_map(|key| {
                key.to_possible_value().map(|v| format!("\"{}\": {}", v.get_name(), key.description()))
            })
            .collect::<Vec<String>>()
            .join("; ")
    }
}
