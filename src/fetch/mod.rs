use anyhow::Result;

use crate::config::Config;
use crate::providers::youtube::YoutubeProvider;
use crate::providers::{TranscriptList, TranscriptProvider, TranscriptSegment};
use crate::utils::normalize_video_id;

/// Main transcript pipeline
pub struct TranscriptFetcher {
    config: Config,
    provider: Box<dyn TranscriptProvider>,
}

impl TranscriptFetcher {
    /// Create a fetcher backed by YouTube
    pub fn new(config: Config) -> Result<Self> {
        let provider = YoutubeProvider::new(&config)?;
        Ok(Self::with_provider(config, Box::new(provider)))
    }

    /// Create a fetcher backed by an arbitrary provider
    pub fn with_provider(config: Config, provider: Box<dyn TranscriptProvider>) -> Self {
        Self { config, provider }
    }

    /// Languages to request, falling back to the provider's default ordering
    fn languages(&self) -> Vec<String> {
        if self.config.languages.is_empty() {
            self.provider.default_languages()
        } else {
            self.config.languages.clone()
        }
    }

    /// Fetch the transcript for a video id or YouTube URL
    pub async fn fetch(&self, input: &str) -> Result<Vec<TranscriptSegment>> {
        let video_id = normalize_video_id(input);
        let languages = self.languages();

        tracing::info!(
            "Fetching transcript for {} from {} (languages: {})",
            video_id,
            self.provider.provider_name(),
            languages.join(", ")
        );

        let segments = self.provider.get_transcript(&video_id, &languages).await?;

        tracing::info!("Fetched {} segments for {}", segments.len(), video_id);
        Ok(segments)
    }

    /// List the caption tracks available for a video id or YouTube URL
    pub async fn list(&self, input: &str) -> Result<TranscriptList> {
        let video_id = normalize_video_id(input);
        self.provider.list_transcripts(&video_id).await
    }
}
