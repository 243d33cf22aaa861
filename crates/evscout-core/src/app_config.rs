use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub tomtom_api_key: String,
    pub tomtom_base_url: String,
    pub request_timeout_secs: u64,
    pub poll_max_wait_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_status_timeout_secs: u64,
    pub poll_backoff_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("tomtom_api_key", &"[redacted]")
            .field("tomtom_base_url", &self.tomtom_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_max_wait_secs", &self.poll_max_wait_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_status_timeout_secs", &self.poll_status_timeout_secs)
            .field("poll_backoff_ms", &self.poll_backoff_ms)
            .finish()
    }
}
