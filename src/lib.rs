//! yt-transcript - fetch YouTube video transcripts and print them as JSON
//!
//! This library provides the pieces behind the `get-transcript` binary: a provider
//! abstraction for transcript sources, a YouTube implementation of it, and JSON
//! rendering that matches the output of the original scripts byte for byte.
//!
//! Beyond what the binary uses, library callers can inspect the available
//! caption tracks with [`TranscriptFetcher::list`], pick one by origin with
//! [`TranscriptList::find_manually_created_transcript`] or
//! [`TranscriptList::find_generated_transcript`], and flatten a transcript into
//! prose with [`plain_text`].

pub mod cli;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod providers;
pub mod utils;

pub use cli::{Cli, Outcome};
pub use config::Config;
pub use fetch::TranscriptFetcher;
pub use providers::{plain_text, TranscriptList, TranscriptProvider, TranscriptSegment, TranscriptTrack};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Error types specific to transcript retrieval
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Missing video id")]
    MissingVideoId,

    #[error("{}", retrieval_failure(.0, "The video is no longer available"))]
    VideoUnavailable(String),

    #[error("{}", retrieval_failure(.0, "You provided an invalid video id. Make sure you are using the video id and NOT the url!\n\nDo NOT run: `get-transcript \"https://www.youtube.com/watch?v=1234\"`\nInstead run: `get-transcript 1234`"))]
    InvalidVideoId(String),

    #[error("{}", retrieval_failure(.0, "Subtitles are disabled for this video"))]
    TranscriptsDisabled(String),

    #[error("{}", retrieval_failure(.video_id, &no_transcript_cause(.requested, .available)))]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: String,
    },

    #[error("{}", retrieval_failure(.0, "YouTube is receiving too many requests from this IP and now requires solving a captcha to continue"))]
    TooManyRequests(String),

    #[error("{}", retrieval_failure(.0, "YouTube is blocking requests from your IP. This usually is due to one of the following reasons:\n- You have done too many requests and your IP has been blocked by YouTube\n- You are doing requests from an IP belonging to a cloud provider (like AWS, Google Cloud Platform, Azure, etc.)"))]
    RequestBlocked(String),

    #[error("{}", retrieval_failure(.0, "YouTube is blocking requests from your IP because it is asking to solve a captcha"))]
    IpBlocked(String),

    #[error("{}", retrieval_failure(.0, "This video is age-restricted. Therefore, you are unable to retrieve transcripts for it without authenticating yourself"))]
    AgeRestricted(String),

    #[error("{}", retrieval_failure(.video_id, &unplayable_cause(.reason.as_deref(), .sub_reasons)))]
    VideoUnplayable {
        video_id: String,
        reason: Option<String>,
        sub_reasons: Vec<String>,
    },

    #[error("{}", retrieval_failure(.0, "The requested video cannot be retrieved without a PO Token"))]
    PoTokenRequired(String),

    #[error("{}", retrieval_failure(.0, "Failed to automatically give consent to saving cookies"))]
    FailedToCreateConsentCookie(String),

    #[error("{}", retrieval_failure(.0, "The data required to fetch the transcript is not parsable. This should not happen, please open an issue"))]
    YoutubeDataUnparsable(String),
}

fn retrieval_failure(video_id: &str, cause: &str) -> String {
    format!(
        "Could not retrieve a transcript for the video {}{}! This is most likely caused by:\n\n{}",
        WATCH_URL, video_id, cause
    )
}

fn no_transcript_cause(requested: &[String], available: &str) -> String {
    format!(
        "No transcripts were found for any of the requested language codes: {:?}\n\n{}",
        requested, available
    )
}

fn unplayable_cause(reason: Option<&str>, sub_reasons: &[String]) -> String {
    let mut cause = format!(
        "The video is unplayable for the following reason: {}",
        reason.unwrap_or("No reason specified!")
    );
    if !sub_reasons.is_empty() {
        cause.push_str("\n\nAdditional Details:");
        for sub_reason in sub_reasons {
            cause.push_str("\n - ");
            cause.push_str(sub_reason);
        }
    }
    cause
}
