use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{ExtractedTrack, MediaExtractor};
use crate::config::Config;

/// Output template for full extraction. The title goes last because it is
/// the only field that can itself contain the delimiter; the URL and number
/// fields never do, so parsing splits off exactly three fields and keeps the
/// remainder intact.
const FULL_PRINT: &str = "%(webpage_url)s|%(url)s|%(duration)s|%(title)s";

/// yt-dlp prints this for fields it could not fill.
const MISSING: &str = "NA";

/// Extractor that shells out to yt-dlp.
///
/// Full extraction resolves a stream URL; expansion uses `--flat-playlist`
/// so nothing is downloaded or stream-resolved per entry. Both run as child
/// processes via tokio, keeping the slow work off the session path.
pub struct YtDlpExtractor {
    binary: String,
    socket_timeout: u64,
}

impl YtDlpExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            binary: config.ytdlp_path.clone(),
            socket_timeout: config.socket_timeout,
        }
    }

    /// Verifica que yt-dlp esté disponible.
    pub async fn verify_available(&self) -> anyhow::Result<()> {
        let output = tokio::process::Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .context("failed to run yt-dlp")?;

        if !output.status.success() {
            anyhow::bail!("yt-dlp exited with {}", output.status);
        }

        let version = String::from_utf8_lossy(&output.stdout);
        info!("✅ yt-dlp versión: {}", version.trim());
        Ok(())
    }

    /// Runs yt-dlp and returns stdout, or `None` when the extractor found
    /// nothing for the URL (non-zero exit).
    async fn run(&self, args: &[&str], url: &str) -> anyhow::Result<Option<String>> {
        let timeout = self.socket_timeout.to_string();

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.args(args);
        cmd.args(["--socket-timeout", &timeout]);
        cmd.arg(url);

        let output = cmd.output().await.context("failed to spawn yt-dlp")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("⚠️ yt-dlp failed for {url}: {}", stderr.trim());
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(&self, url: &str) -> anyhow::Result<Option<ExtractedTrack>> {
        debug!("🔍 Extracting metadata for {url}");

        let stdout = self
            .run(
                &[
                    "--print",
                    FULL_PRINT,
                    "--format",
                    "bestaudio/best",
                    "--no-playlist",
                    "--default-search",
                    "auto",
                    "--quiet",
                    "--no-warnings",
                    "--retries",
                    "3",
                ],
                url,
            )
            .await?;

        let Some(stdout) = stdout else {
            return Ok(None);
        };

        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(parse_print_line))
    }

    async fn expand(&self, url: &str) -> anyhow::Result<Option<Vec<String>>> {
        debug!("🔍 Expanding listing for {url}");

        let stdout = self
            .run(
                &[
                    "--print",
                    "%(url)s",
                    "--flat-playlist",
                    "--quiet",
                    "--no-warnings",
                    "--retries",
                    "2",
                ],
                url,
            )
            .await?;

        let Some(stdout) = stdout else {
            return Ok(None);
        };

        // Entries yt-dlp reports as unavailable print as "NA"; skip them.
        let urls: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && *line != MISSING)
            .map(str::to_string)
            .collect();

        if urls.is_empty() {
            return Ok(None);
        }

        info!("🎵 Listing for {url} expanded to {} entries", urls.len());
        Ok(Some(urls))
    }
}

/// Splits one `--print` output line into raw fields. `NA` means the field
/// was unavailable. The final split keeps the whole rest of the line, so a
/// title containing `|` survives unmangled.
fn parse_print_line(line: &str) -> ExtractedTrack {
    let mut parts = line.splitn(4, '|');
    let mut next = || {
        parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != MISSING)
            .map(str::to_string)
    };

    ExtractedTrack {
        webpage_url: next(),
        stream_url: next(),
        duration: next().and_then(|d| d.parse().ok()),
        title: next(),
    }
}
