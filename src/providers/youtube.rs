use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::OnceLock;

use super::{TranscriptList, TranscriptProvider, TranscriptSegment, TranscriptTrack};
use crate::config::Config;
use crate::utils::{decode_html_entities, strip_tags, FORMATTING_TAGS};
use crate::{Result, TranscriptError};

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PO_TOKEN_MARKER: &str = "&exp=xpe";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const BOT_DETECTED: &str = "Sign in to confirm you\u{2019}re not a bot";
const AGE_RESTRICTED: &str = "This video may be inappropriate for some users.";
const VIDEO_UNAVAILABLE: &str = "This video is unavailable";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("must be valid regex"))
}

/// YouTube transcript provider talking to the web player endpoints
pub struct YoutubeProvider {
    client: Client,
    base_url: String,
    accept_language: String,
    preserve_formatting: bool,
}

impl YoutubeProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.http.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            accept_language: config.http.accept_language.clone(),
            preserve_formatting: config.preserve_formatting,
        })
    }

    /// Fetch the watch page, accepting the cookie consent form if YouTube shows one
    async fn fetch_video_html(&self, video_id: &str) -> Result<String> {
        let html = self.fetch_html(video_id, None).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        tracing::debug!("Consent form detected for {}, retrying with consent cookie", video_id);

        static CONSENT_VALUE: OnceLock<Regex> = OnceLock::new();
        let token = regex(&CONSENT_VALUE, r#"name="v" value="(.*?)""#)
            .captures(&html)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| TranscriptError::FailedToCreateConsentCookie(video_id.to_string()))?;

        let html = self.fetch_html(video_id, Some(&token)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(TranscriptError::FailedToCreateConsentCookie(video_id.to_string()).into());
        }
        Ok(html)
    }

    async fn fetch_html(&self, video_id: &str, consent: Option<&str>) -> Result<String> {
        let url = format!("{}/watch", self.base_url);
        tracing::debug!("Fetching watch page for {}", video_id);

        let mut request = self
            .client
            .get(&url)
            .query(&[("v", video_id)])
            .header(header::ACCEPT_LANGUAGE, self.accept_language.as_str());
        if let Some(token) = consent {
            request = request.header(header::COOKIE, format!("CONSENT=YES+{}", token));
        }

        let response = request
            .send()
            .await
            .context("Failed to fetch video page")?;
        let response = check_status(response, video_id, "Failed to fetch video page")?;

        let html = response.text().await.context("Failed to read video page")?;
        Ok(decode_html_entities(&html))
    }

    /// Ask the innertube player endpoint for the video's metadata
    async fn fetch_innertube_data(&self, video_id: &str, api_key: &str) -> Result<Value> {
        let url = format!("{}/youtubei/v1/player", self.base_url);
        tracing::debug!("Requesting player data for {}", video_id);

        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header(header::ACCEPT_LANGUAGE, self.accept_language.as_str())
            .json(&body)
            .send()
            .await
            .context("Failed to fetch player data")?;
        let response = check_status(response, video_id, "Failed to fetch player data")?;

        response
            .json::<Value>()
            .await
            .context("Failed to parse player data")
    }

    /// Download and parse the timed text of one caption track
    pub async fn fetch_track(&self, track: &TranscriptTrack) -> Result<Vec<TranscriptSegment>> {
        if track.url.contains(PO_TOKEN_MARKER) {
            return Err(TranscriptError::PoTokenRequired(track.video_id.clone()).into());
        }

        tracing::info!(
            "Fetching {} transcript ({}) for {}",
            track.language_code,
            if track.is_generated { "generated" } else { "manual" },
            track.video_id
        );

        let response = self
            .client
            .get(&track.url)
            .header(header::ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await
            .context("Failed to fetch transcript")?;
        let response = check_status(response, &track.video_id, "Failed to fetch transcript")?;

        let xml = response.text().await.context("Failed to read transcript")?;
        parse_timedtext(&xml, self.preserve_formatting)
    }
}

/// Map HTTP failures to errors, treating 429 as rate limiting
fn check_status(response: Response, video_id: &str, action: &'static str) -> Result<Response> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranscriptError::TooManyRequests(video_id.to_string()).into());
    }
    response.error_for_status().context(action)
}

fn extract_innertube_api_key(html: &str, video_id: &str) -> Result<String> {
    static API_KEY: OnceLock<Regex> = OnceLock::new();
    if let Some(caps) = regex(&API_KEY, r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).captures(html) {
        return Ok(caps[1].to_string());
    }

    if html.contains(RECAPTCHA_MARKER) {
        return Err(TranscriptError::IpBlocked(video_id.to_string()).into());
    }
    Err(TranscriptError::YoutubeDataUnparsable(video_id.to_string()).into())
}

fn assert_playability(status: &Value, video_id: &str) -> Result<()> {
    let playability = match status["status"].as_str() {
        None | Some("OK") => return Ok(()),
        Some(s) => s,
    };
    let reason = status["reason"].as_str();

    if playability == "LOGIN_REQUIRED" {
        match reason {
            Some(BOT_DETECTED) => return Err(TranscriptError::RequestBlocked(video_id.to_string()).into()),
            Some(AGE_RESTRICTED) => return Err(TranscriptError::AgeRestricted(video_id.to_string()).into()),
            _ => {}
        }
    }

    if playability == "ERROR" && reason == Some(VIDEO_UNAVAILABLE) {
        if video_id.starts_with("http://") || video_id.starts_with("https://") {
            return Err(TranscriptError::InvalidVideoId(video_id.to_string()).into());
        }
        return Err(TranscriptError::VideoUnavailable(video_id.to_string()).into());
    }

    let sub_reasons: Vec<String> = status["errorScreen"]["playerErrorMessageRenderer"]["subreason"]["runs"]
        .as_array()
        .map(|runs| {
            runs.iter()
                .map(|run| run["text"].as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();

    Err(TranscriptError::VideoUnplayable {
        video_id: video_id.to_string(),
        reason: reason.map(str::to_string),
        sub_reasons,
    }
    .into())
}

/// Turn the player response into the list of caption tracks
fn build_transcript_list(data: &Value, video_id: &str) -> Result<TranscriptList> {
    assert_playability(&data["playabilityStatus"], video_id)?;

    let caption_tracks = data["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .filter(|tracks| !tracks.is_empty())
        .ok_or_else(|| TranscriptError::TranscriptsDisabled(video_id.to_string()))?;

    let tracks = caption_tracks
        .iter()
        .map(|caption| -> Result<TranscriptTrack> {
            let base_url = caption["baseUrl"]
                .as_str()
                .ok_or_else(|| TranscriptError::YoutubeDataUnparsable(video_id.to_string()))?;
            let language_code = caption["languageCode"]
                .as_str()
                .ok_or_else(|| TranscriptError::YoutubeDataUnparsable(video_id.to_string()))?;
            let language = caption["name"]["runs"][0]["text"]
                .as_str()
                .or_else(|| caption["name"]["simpleText"].as_str())
                .unwrap_or(language_code);

            Ok(TranscriptTrack {
                video_id: video_id.to_string(),
                language: language.to_string(),
                language_code: language_code.to_string(),
                is_generated: caption["kind"].as_str() == Some("asr"),
                is_translatable: caption["isTranslatable"].as_bool().unwrap_or(false),
                url: base_url.replace("&fmt=srv3", ""),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TranscriptList::from_tracks(video_id, tracks))
}

/// Parse timed text XML into segments.
///
/// Elements without text are skipped. Bodies are entity-decoded twice (XML,
/// then the HTML escaping YouTube applies inside it) and stripped of markup.
fn parse_timedtext(xml: &str, preserve_formatting: bool) -> Result<Vec<TranscriptSegment>> {
    static TEXT: OnceLock<Regex> = OnceLock::new();
    static ATTR: OnceLock<Regex> = OnceLock::new();
    let text_re = regex(&TEXT, r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)");
    let attr_re = regex(&ATTR, r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*"([^"]*)""#);

    let keep: &[&str] = if preserve_formatting { FORMATTING_TAGS } else { &[] };
    let mut segments = Vec::new();

    for caps in text_re.captures_iter(xml) {
        let body = match caps.get(2) {
            Some(m) if !m.as_str().is_empty() => m.as_str(),
            _ => continue,
        };

        let mut start = None;
        let mut duration = None;
        for attr in attr_re.captures_iter(&caps[1]) {
            match &attr[1] {
                "start" => start = Some(attr[2].to_string()),
                "dur" => duration = Some(attr[2].to_string()),
                _ => {}
            }
        }

        let start: f64 = start
            .context("Transcript element is missing a start time")?
            .parse::<f64>()
            .context("Transcript start time is not a number")?;
        let duration: f64 = duration
            .as_deref()
            .unwrap_or("0.0")
            .parse::<f64>()
            .context("Transcript duration is not a number")?;

        let text = decode_html_entities(&decode_html_entities(body));
        segments.push(TranscriptSegment {
            text: strip_tags(&text, keep),
            start,
            duration,
        });
    }

    Ok(segments)
}

#[async_trait]
impl TranscriptProvider for YoutubeProvider {
    async fn get_transcript(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>> {
        let list = self.list_transcripts(video_id).await?;
        let track = list.find_transcript(languages)?;
        self.fetch_track(track).await
    }

    async fn list_transcripts(&self, video_id: &str) -> Result<TranscriptList> {
        let html = self.fetch_video_html(video_id).await?;
        let api_key = extract_innertube_api_key(&html, video_id)?;
        let data = self.fetch_innertube_data(video_id, &api_key).await?;
        let list = build_transcript_list(&data, video_id)?;

        tracing::debug!(
            "Found {} manual and {} generated tracks for {}",
            list.manually_created.len(),
            list.generated.len(),
            video_id
        );
        Ok(list)
    }

    fn provider_name(&self) -> &'static str {
        "YouTube"
    }
}
