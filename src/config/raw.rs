use duration_str::{deserialize_duration, deserialize_option_duration};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = include_str!("tsync.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub api: Option<Api>,
    pub optimistic: Option<Optimistic>,
    pub tree: Option<Tree>,
    pub rate_limits: Option<RateLimits>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg: Self = toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration");
        cfg
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Api {
    pub url: String,
    pub token: Option<String>,
    pub page_size: Option<u32>,
}

impl Default for Api {
    fn default() -> Self {
        Config::default().api.expect("API configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Optimistic {
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub rollback_timeout: Option<Duration>,
}

impl Default for Optimistic {
    fn default() -> Self {
        Config::default()
            .optimistic
            .expect("Optimistic update configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Tree {
    pub max_depth: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Config::default().tree.expect("Tree configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimits {
    pub comments: Option<RateLimit>,
    pub replies: Option<RateLimit>,
    pub likes: Option<RateLimit>,
}

impl Default for RateLimits {
    fn default() -> Self {
        Config::default()
            .rate_limits
            .expect("Rate limit configuration")
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimit {
    pub max: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub window: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_config_from_file() {
        let cfg: Config = toml::from_str(DEFAULT_CONFIG_FILE).unwrap();
        assert!(cfg.api.is_some());
        assert!(cfg.optimistic.is_some());
        assert!(cfg.tree.is_some());
        assert!(cfg.rate_limits.is_some());
    }

    #[test]
    fn default_rate_limits() {
        let RateLimits {
            comments,
            replies,
            likes,
        } = RateLimits::default();
        let comments = comments.unwrap();
        assert_eq!(comments.max, 10);
        assert_eq!(comments.window, Duration::from_secs(60));
        assert_eq!(replies.unwrap().max, 20);
        assert_eq!(likes.unwrap().max, 50);
    }

    #[test]
    fn default_rollback_timeout() {
        assert_eq!(
            Optimistic::default().rollback_timeout,
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn parse_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
            [api]
            url = "https://comments.example.com"
            token = "secret"

            [optimistic]
            "#,
        )
        .unwrap();
        let api = cfg.api.unwrap();
        assert_eq!(api.token.as_deref(), Some("secret"));
        assert!(api.page_size.is_none());
        assert!(cfg.optimistic.unwrap().rollback_timeout.is_none());
        assert!(cfg.rate_limits.is_none());
    }
}
