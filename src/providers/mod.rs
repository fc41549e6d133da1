use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod youtube;

use crate::{Result, TranscriptError};

/// One timed caption unit of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// A single caption track available for a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    /// Video the track belongs to
    pub video_id: String,

    /// Human readable language name, e.g. "English (auto-generated)"
    pub language: String,

    /// Language tag, e.g. "en" or "en-US"
    pub language_code: String,

    /// Whether the track was produced by speech recognition
    pub is_generated: bool,

    /// Whether the provider can translate this track
    pub is_translatable: bool,

    /// Location of the timed text for this track
    pub url: String,
}

impl fmt::Display for TranscriptTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (\"{}\"){}",
            self.language_code,
            self.language,
            if self.is_translatable { "[TRANSLATABLE]" } else { "" }
        )
    }
}

/// All caption tracks of one video, split by origin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptList {
    pub video_id: String,
    pub manually_created: Vec<TranscriptTrack>,
    pub generated: Vec<TranscriptTrack>,
}

impl TranscriptList {
    /// Build a list from tracks in provider order
    pub fn from_tracks(video_id: impl Into<String>, tracks: Vec<TranscriptTrack>) -> Self {
        let (generated, manually_created): (Vec<_>, Vec<_>) = tracks.into_iter().partition(|t| t.is_generated);
        Self {
            video_id: video_id.into(),
            manually_created,
            generated,
        }
    }

    /// Iterate over every track, manually created ones first
    pub fn tracks(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.manually_created.iter().chain(self.generated.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.tracks().next().is_none()
    }

    /// Find the best track for an ordered list of language codes.
    ///
    /// Codes are tried in order; for each code a manually created track wins
    /// over a generated one.
    pub fn find_transcript(&self, languages: &[String]) -> Result<&TranscriptTrack> {
        self.find_in(languages, &[&self.manually_created, &self.generated])
    }

    /// Like [`find_transcript`](Self::find_transcript) but only considers manually created tracks
    pub fn find_manually_created_transcript(&self, languages: &[String]) -> Result<&TranscriptTrack> {
        self.find_in(languages, &[&self.manually_created])
    }

    /// Like [`find_transcript`](Self::find_transcript) but only considers generated tracks
    pub fn find_generated_transcript(&self, languages: &[String]) -> Result<&TranscriptTrack> {
        self.find_in(languages, &[&self.generated])
    }

    fn find_in<'a>(
        &'a self,
        languages: &[String],
        groups: &[&'a Vec<TranscriptTrack>],
    ) -> Result<&'a TranscriptTrack> {
        for code in languages {
            for group in groups {
                if let Some(track) = group.iter().find(|t| &t.language_code == code) {
                    return Ok(track);
                }
            }
        }

        Err(TranscriptError::NoTranscriptFound {
            video_id: self.video_id.clone(),
            requested: languages.to_vec(),
            available: self.describe(),
        }
        .into())
    }

    /// Human readable summary of the available tracks
    pub fn describe(&self) -> String {
        fn section(tracks: &[TranscriptTrack]) -> String {
            if tracks.is_empty() {
                return "None".to_string();
            }
            tracks
                .iter()
                .map(|t| format!(" - {}", t))
                .collect::<Vec<_>>()
                .join("\n")
        }

        format!(
            "For this video ({}) transcripts are available in the following languages:\n\n(MANUALLY CREATED)\n{}\n\n(GENERATED)\n{}",
            self.video_id,
            section(&self.manually_created),
            section(&self.generated)
        )
    }
}

/// Trait for sources that can supply video transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript of a video in the first available preferred language
    async fn get_transcript(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>>;

    /// List the caption tracks available for a video
    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;

    /// Languages to ask for when the caller has no preference
    fn default_languages(&self) -> Vec<String> {
        vec!["en".to_string()]
    }
}

/// Join the text of all segments into a single line of prose
pub fn plain_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
