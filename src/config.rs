use std::env;
use std::time::Duration;
use anyhow::{Context, Result};

/// Largest batch SQS hands out per receive call
pub const MAX_BATCH_SIZE: i32 = 10;
/// Longest long-poll SQS supports
pub const MAX_WAIT_SECONDS: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub request_timeout: Duration,
    pub queue: QueueConfig,
    pub search: SearchConfig,
    pub consumer: ConsumerConfig,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub queue_url: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Domain host, optionally with a scheme (`https://` when omitted)
    pub endpoint: String,
    pub region: String,
    pub index_name: String,
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub enabled: bool,
    pub batch_size: i32,
    pub wait_time: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let timeout_secs = env::var("REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("REQUEST_TIMEOUT_SECONDS must be a valid number of seconds")?;

        let config = Config {
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            queue: QueueConfig::from_env()?,
            search: SearchConfig::from_env()?,
            consumer: ConsumerConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        if self.request_timeout.as_secs() == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be greater than 0");
        }

        self.queue.validate()?;
        self.search.validate()?;
        self.consumer.validate()?;

        Ok(())
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} environment variable is required", name))
}

impl QueueConfig {
    pub fn from_env() -> Result<Self> {
        Ok(QueueConfig {
            queue_url: required("QUEUE_URL")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_url.trim().is_empty() {
            anyhow::bail!("QUEUE_URL cannot be empty");
        }
        Ok(())
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self> {
        Ok(SearchConfig {
            endpoint: required("OPENSEARCH_ENDPOINT")?,
            region: required("AWS_REGION")?,
            index_name: required("INDEX_NAME")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            anyhow::bail!("OPENSEARCH_ENDPOINT cannot be empty");
        }

        if self.region.trim().is_empty() {
            anyhow::bail!("AWS_REGION cannot be empty");
        }

        if self.index_name.trim().is_empty() {
            anyhow::bail!("INDEX_NAME cannot be empty");
        }

        if self.index_name.contains('/') {
            anyhow::bail!("INDEX_NAME cannot contain '/'");
        }

        Ok(())
    }

    /// Endpoint as a URL prefix without a trailing slash
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        }
    }
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self> {
        let enabled = match env::var("CONSUMER_ENABLED").unwrap_or_else(|_| "true".to_string()).as_str() {
            "false" | "0" | "no" => false,
            _ => true,
        };

        let batch_size = env::var("CONSUMER_BATCH_SIZE")
            .unwrap_or_else(|_| MAX_BATCH_SIZE.to_string())
            .parse::<i32>()
            .context("CONSUMER_BATCH_SIZE must be a valid number")?;

        let wait_secs = env::var("CONSUMER_WAIT_SECONDS")
            .unwrap_or_else(|_| MAX_WAIT_SECONDS.to_string())
            .parse::<u64>()
            .context("CONSUMER_WAIT_SECONDS must be a valid number of seconds")?;

        Ok(ConsumerConfig {
            enabled,
            batch_size,
            wait_time: Duration::from_secs(wait_secs),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            anyhow::bail!("CONSUMER_BATCH_SIZE must be between 1 and {}", MAX_BATCH_SIZE);
        }

        if self.wait_time.as_secs() > MAX_WAIT_SECONDS {
            anyhow::bail!("CONSUMER_WAIT_SECONDS cannot exceed {}", MAX_WAIT_SECONDS);
        }

        Ok(())
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfig {
            enabled: true,
            batch_size: MAX_BATCH_SIZE,
            wait_time: Duration::from_secs(MAX_WAIT_SECONDS),
        }
    }
}
