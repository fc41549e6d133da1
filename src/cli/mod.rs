use clap::Parser;
use std::ffi::OsString;
use std::process::ExitCode;

use crate::config::Config;
use crate::fetch::TranscriptFetcher;
use crate::output::{error_message, render_error, render_segments};
use crate::TranscriptError;

/// Fetch the transcript of a YouTube video and print it as JSON
#[derive(Parser, Debug, Default, PartialEq)]
#[command(
    name = "get-transcript",
    version,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Video id, or a YouTube URL containing one
    #[arg(value_name = "VIDEO_ID", allow_hyphen_values = true)]
    pub video_id: Option<String>,

    /// Anything after the video id is ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

impl Cli {
    /// Parse the process arguments
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::parse_from_args(std::env::args_os())
    }

    /// Parse an explicit argument list; the first item is the program name
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        // clap reads a bare `--` as end of options; as the first argument it is the id
        if args.get(1).is_some_and(|arg| arg == "--") {
            args.insert(1, OsString::from("--"));
        }

        Self::try_parse_from(args)
    }
}

/// The single JSON document a run produces, plus whether it succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub document: String,
    pub success: bool,
}

impl Outcome {
    pub fn success(document: String) -> Self {
        Self {
            document,
            success: true,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            document: render_error(message),
            success: false,
        }
    }

    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::failure(&error_message(err))
    }

    /// Exit status: 0 on success, 1 on any error
    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Run one fetch and turn the result into the document to print.
///
/// The argument is checked before configuration is loaded, so a missing video
/// id is reported as such even when the config file is broken.
pub async fn execute<F>(cli: Cli, load_config: F) -> Outcome
where
    F: FnOnce() -> anyhow::Result<Config>,
{
    let Some(video_id) = cli.video_id else {
        return Outcome::failure(&TranscriptError::MissingVideoId.to_string());
    };

    let fetcher = match load_config().and_then(TranscriptFetcher::new) {
        Ok(fetcher) => fetcher,
        Err(err) => return Outcome::from_error(&err),
    };

    run(&fetcher, &video_id).await
}

/// Fetch with an already built fetcher
pub async fn run(fetcher: &TranscriptFetcher, video_id: &str) -> Outcome {
    let rendered = match fetcher.fetch(video_id).await {
        Ok(segments) => render_segments(&segments),
        Err(err) => {
            tracing::warn!("Transcript fetch failed: {:#}", err);
            return Outcome::from_error(&err);
        }
    };

    match rendered {
        Ok(document) => Outcome::success(document),
        Err(err) => Outcome::from_error(&err),
    }
}
