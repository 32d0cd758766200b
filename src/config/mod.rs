use anyhow::{anyhow, Result};
use std::{env, fs, io::ErrorKind, path::Path, time::Duration};
use tsync_core::{
    usecases::{DiscussionConfig, DEFAULT_PAGE_SIZE},
    util::rate_limit::RateLimitConfig,
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "tsync.toml";

const ENV_NAME_API_URL: &str = "TSYNC_API_URL";
const ENV_NAME_API_TOKEN: &str = "TSYNC_API_TOKEN";

pub struct Config {
    pub api: Api,
    pub optimistic: Optimistic,
    pub tree: Tree,
    pub rate_limits: RateLimits,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration.",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(url) = env::var(ENV_NAME_API_URL) {
            cfg.api.url = url;
        }
        if let Ok(token) = env::var(ENV_NAME_API_TOKEN) {
            cfg.api.token = Some(token);
        }
        Ok(cfg)
    }

    pub fn discussion(&self) -> DiscussionConfig {
        DiscussionConfig {
            page_size: self.api.page_size,
            max_depth: self.tree.max_depth,
            rollback_timeout: self.optimistic.rollback_timeout,
        }
    }
}

pub struct Api {
    /// Base URL of the comment service
    pub url: String,
    /// Bearer token of the current user
    pub token: Option<String>,
    pub page_size: u32,
}

pub struct Optimistic {
    /// Disabled if `None`
    pub rollback_timeout: Option<Duration>,
}

pub struct Tree {
    pub max_depth: usize,
}

pub struct RateLimits {
    pub comments: RateLimitConfig,
    pub replies: RateLimitConfig,
    pub likes: RateLimitConfig,
}

impl TryFrom<raw::RateLimit> for RateLimitConfig {
    type Error = anyhow::Error;
    fn try_from(from: raw::RateLimit) -> Result<Self> {
        let raw::RateLimit { max, window } = from;
        if max == 0 || window.is_zero() {
            return Err(anyhow!("Rate limits must allow at least one request per window"));
        }
        Ok(RateLimitConfig::new(max, window))
    }
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            api,
            optimistic,
            tree,
            rate_limits,
        } = from;

        let raw::Api {
            url,
            token,
            page_size,
        } = api.unwrap_or_default();
        if url.trim().is_empty() {
            return Err(anyhow!("Missing API URL"));
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(anyhow!("Invalid page size"));
        }
        let api = Api {
            url,
            token,
            page_size,
        };

        let raw::Optimistic { rollback_timeout } = optimistic.unwrap_or_default();
        let optimistic = Optimistic {
            rollback_timeout: rollback_timeout.filter(|timeout| !timeout.is_zero()),
        };

        let raw::Tree { max_depth } = tree.unwrap_or_default();
        let tree = Tree { max_depth };

        let raw::RateLimits {
            comments,
            replies,
            likes,
        } = rate_limits.unwrap_or_default();
        let defaults = raw::RateLimits::default();
        let rate_limits = RateLimits {
            comments: comments
                .or(defaults.comments)
                .map(RateLimitConfig::try_from)
                .transpose()?
                .unwrap_or_else(RateLimitConfig::comments),
            replies: replies
                .or(defaults.replies)
                .map(RateLimitConfig::try_from)
                .transpose()?
                .unwrap_or_else(RateLimitConfig::replies),
            likes: likes
                .or(defaults.likes)
                .map(RateLimitConfig::try_from)
                .transpose()?
                .unwrap_or_else(RateLimitConfig::likes),
        };

        Ok(Self {
            api,
            optimistic,
            tree,
            rate_limits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_default_config() {
        let file: Option<&Path> = None;
        let cfg: Config = Config::try_load_from_file_or_default(file).unwrap();
        assert_eq!(cfg.rate_limits.comments, RateLimitConfig::comments());
        assert_eq!(cfg.rate_limits.replies, RateLimitConfig::replies());
        assert_eq!(cfg.rate_limits.likes, RateLimitConfig::likes());
        assert_eq!(cfg.tree.max_depth, 8);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let raw: raw::Config = toml::from_str(
            r#"
            [api]
            url = "https://comments.example.com"

            [rate-limits.likes]
            max = 5
            window = "10s"
            "#,
        )
        .unwrap();
        let cfg = Config::try_from(raw).unwrap();
        assert_eq!(cfg.api.page_size, DEFAULT_PAGE_SIZE);
        assert!(cfg.api.token.is_none());
        assert_eq!(cfg.optimistic.rollback_timeout, Some(Duration::from_secs(10)));
        assert_eq!(
            cfg.rate_limits.likes,
            RateLimitConfig::new(5, Duration::from_secs(10))
        );
        assert_eq!(cfg.rate_limits.comments, RateLimitConfig::comments());
    }

    #[test]
    fn zero_timeout_disables_rollback() {
        let raw: raw::Config = toml::from_str(
            r#"
            [optimistic]
            rollback-timeout = "0s"
            "#,
        )
        .unwrap();
        let cfg = Config::try_from(raw).unwrap();
        assert!(cfg.discussion().rollback_timeout.is_none());
    }

    #[test]
    fn reject_invalid_values() {
        let raw: raw::Config = toml::from_str(
            r#"
            [api]
            url = "http://localhost"
            page-size = 0
            "#,
        )
        .unwrap();
        assert!(Config::try_from(raw).is_err());

        let raw: raw::Config = toml::from_str(
            r#"
            [rate-limits.comments]
            max = 0
            window = "1m"
            "#,
        )
        .unwrap();
        assert!(Config::try_from(raw).is_err());
    }
}
