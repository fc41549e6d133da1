use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yt_transcript::{plain_text, Config, TranscriptFetcher};

async fn youtube_stub() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "vid123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<script>{"INNERTUBE_API_KEY": "k3y"}</script>"#),
        )
        .mount(&server)
        .await;

    let track = |code: &str, name: &str, asr: bool| {
        let mut track = json!({
            "baseUrl": format!("{}/api/timedtext?v=vid123&lang={}&fmt=srv3", server.uri(), code),
            "name": { "runs": [{ "text": name }] },
            "languageCode": code,
        });
        if asr {
            track["kind"] = json!("asr");
        }
        track
    };
    let player = json!({
        "playabilityStatus": { "status": "OK" },
        "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [
            track("de", "German", false),
            track("en", "English (auto-generated)", true),
        ] } }
    });
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(player))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<transcript><text start="0" dur="1.5">Caf&amp;eacute; talk</text><text start="1.5" dur="2">goes on&amp;hellip;</text></transcript>"#,
        ))
        .mount(&server)
        .await;

    server
}

fn fetcher_for(server: &MockServer) -> TranscriptFetcher {
    let mut config = Config::default();
    config.http.base_url = server.uri();
    TranscriptFetcher::new(config).unwrap()
}

#[tokio::test]
async fn lists_and_selects_tracks_by_origin() {
    let server = youtube_stub().await;
    let fetcher = fetcher_for(&server);

    let list = fetcher.list("https://youtu.be/vid123?t=4").await.unwrap();
    assert_eq!(list.video_id, "vid123");

    let languages = vec!["en".to_string(), "de".to_string()];
    let manual = list.find_manually_created_transcript(&languages).unwrap();
    assert_eq!(manual.language_code, "de");
    assert!(!manual.is_generated);

    let generated = list.find_generated_transcript(&languages).unwrap();
    assert_eq!(generated.language_code, "en");
    assert_eq!(generated.language, "English (auto-generated)");

    assert!(list.find_generated_transcript(&["de".to_string()]).is_err());
}

#[tokio::test]
async fn transcript_flattens_to_prose() {
    let server = youtube_stub().await;
    let fetcher = fetcher_for(&server);

    let segments = fetcher.fetch("vid123").await.unwrap();

    assert_eq!(plain_text(&segments), "Caf\u{e9} talk goes on\u{2026}");
}
