use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct HostingConfig {
    pub url: String,
    pub token: Option<String>,
}

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub public_url: String,
    pub max_batch: i64,
    pub hosting: Option<HostingConfig>,
    pub hosting_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(39100);

        let public_url = std::env::var("RSVP_PUBLIC_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let max_batch = std::env::var("RSVP_MAX_BATCH")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(100);

        let hosting = std::env::var("RSVP_HOSTING_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(|url| HostingConfig {
                url: url.trim().to_string(),
                token: std::env::var("RSVP_HOSTING_TOKEN")
                    .ok()
                    .filter(|t| !t.is_empty()),
            });

        let hosting_timeout = std::env::var("RSVP_HOSTING_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(5));

        Self {
            port,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:rsvp.db?mode=rwc".to_string()),
            public_url,
            max_batch,
            hosting,
            hosting_timeout,
        }
    }
}
