use anyhow::Result;

/// Runtime configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection string for the shared metadata cache. When absent the
    /// cache falls back to a process-local in-memory store.
    pub redis_url: Option<String>,

    /// Path to the yt-dlp binary.
    pub ytdlp_path: String,

    /// Socket timeout in seconds passed to the extractor.
    pub socket_timeout: u64,

    /// Cap on how many entries a single playlist expansion may enqueue.
    /// 0 means unlimited.
    pub max_playlist_size: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            redis_url: std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            ytdlp_path: std::env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
            socket_timeout: std::env::var("SOCKET_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            max_playlist_size: std::env::var("MAX_PLAYLIST_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ytdlp_path.trim().is_empty() {
            anyhow::bail!("yt-dlp path must not be empty");
        }

        if self.socket_timeout == 0 {
            anyhow::bail!("Socket timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            ytdlp_path: "yt-dlp".to_string(),
            socket_timeout: 30,
            max_playlist_size: 100,
        }
    }
}
