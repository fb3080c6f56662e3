// API client module: a small blocking HTTP client that talks to a SONG
// metadata server. Every operation is exactly one request/response
// round trip, and the caller gets the raw response body back as a
// string to print or parse as it sees fit.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// SONG client holding the bearer access token, the server base URL and
/// a reqwest blocking client with a small idle-connection pool so
/// sequential calls reuse connections.
pub struct SongClient {
    http: Client,
    song_url: Url,
    access_token: String,
}

impl SongClient {
    /// Create a client around an access token and an already-parsed
    /// server URL. The token is taken as-is; no validation happens here.
    pub fn create(access_token: &str, song_url: Url) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            // Only idle pooled connections expire; an in-flight request
            // blocks until the server answers or the socket fails.
            .timeout(None)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SongClient {
            http,
            song_url,
            access_token: access_token.to_string(),
        })
    }

    /// Upload a JSON payload under a study. Returns the server's
    /// response body, which contains the uploadId to poll with.
    pub fn upload(&self, study_id: &str, payload: &[u8]) -> Result<String> {
        let url = self.endpoint(&["upload", study_id])?;
        self.dispatch(
            self.http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(payload.to_vec()),
        )
    }

    /// Fetch the validation status of an upload.
    pub fn get_status(&self, study_id: &str, upload_id: &str) -> Result<String> {
        let url = self.endpoint(&["upload", study_id, "status", upload_id])?;
        self.dispatch(self.http.get(url))
    }

    /// Save a validated upload as an analysis.
    pub fn save(&self, study_id: &str, upload_id: &str) -> Result<String> {
        let url = self.endpoint(&["upload", study_id, "save", upload_id])?;
        self.dispatch(self.http.post(url))
    }

    /// Publish a saved analysis.
    pub fn publish(&self, study_id: &str, analysis_id: &str) -> Result<String> {
        let url = self.endpoint(&["studies", study_id, "publish", analysis_id])?;
        self.dispatch(self.http.post(url))
    }

    /// Build a request URL by appending path segments onto the base
    /// URL, keeping any path prefix (and query) the base already
    /// carries. `pop_if_empty` makes a trailing slash on the base URL
    /// behave the same as no trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.song_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("SONG URL cannot be a base: {}", self.song_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer token, send, and check for HTTP 200. The
    /// server answers 200 on success for all four operations; anything
    /// else is surfaced as an error carrying the status, without a body.
    fn dispatch(&self, request: RequestBuilder) -> Result<String> {
        let res = request
            .bearer_auth(&self.access_token)
            .send()
            .context("Failed to reach SONG server")?;
        if res.status() != StatusCode::OK {
            bail!("SONG server answered {}", res.status());
        }
        // Best-effort read: a truncated body on a rare read failure is
        // preferred over failing an otherwise successful call.
        Ok(res.text().unwrap_or_else(|_| String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> SongClient {
        let base = Url::parse(&server.url()).unwrap();
        SongClient::create("sekret-token", base).unwrap()
    }

    #[test]
    fn endpoint_keeps_existing_base_path_prefix() {
        let base = Url::parse("https://song.example.org/api").unwrap();
        let client = SongClient::create("t", base).unwrap();
        let url = client
            .endpoint(&["upload", "STUDY1", "status", "UP123"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://song.example.org/api/upload/STUDY1/status/UP123"
        );
    }

    #[test]
    fn endpoint_treats_trailing_slash_like_no_slash() {
        let base = Url::parse("https://song.example.org/api/").unwrap();
        let client = SongClient::create("t", base).unwrap();
        let url = client.endpoint(&["upload", "STUDY1"]).unwrap();
        assert_eq!(url.as_str(), "https://song.example.org/api/upload/STUDY1");
    }

    #[test]
    fn endpoint_preserves_query_on_base_url() {
        let base = Url::parse("https://song.example.org/api?live=true").unwrap();
        let client = SongClient::create("t", base).unwrap();
        let url = client.endpoint(&["studies", "S", "publish", "A"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://song.example.org/api/studies/S/publish/A?live=true"
        );
    }

    #[test]
    fn upload_posts_payload_with_auth_and_content_type() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/upload/STUDY1")
            .match_header("authorization", "Bearer sekret-token")
            .match_header("content-type", "application/json")
            .match_body(r#"{"analysisType":"sequencingRead"}"#)
            .with_status(200)
            .with_body(r#"{"status":"ok","uploadId":"UP123"}"#)
            .create();

        let client = client_for(&server);
        let body = client
            .upload("STUDY1", br#"{"analysisType":"sequencingRead"}"#)
            .unwrap();

        mock.assert();
        assert_eq!(body, r#"{"status":"ok","uploadId":"UP123"}"#);
    }

    #[test]
    fn get_status_hits_the_status_path_without_content_type() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/upload/STUDY1/status/UP123")
            .match_header("authorization", "Bearer sekret-token")
            .match_header("content-type", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"state":"VALIDATED"}"#)
            .create();

        let client = client_for(&server);
        let body = client.get_status("STUDY1", "UP123").unwrap();

        mock.assert();
        assert_eq!(body, r#"{"state":"VALIDATED"}"#);
    }

    #[test]
    fn save_posts_with_empty_body() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/upload/STUDY1/save/UP123")
            .match_header("authorization", "Bearer sekret-token")
            .match_header("content-type", Matcher::Missing)
            .match_body("")
            .with_status(200)
            .with_body(r#"{"analysisId":"AN999"}"#)
            .create();

        let client = client_for(&server);
        let body = client.save("STUDY1", "UP123").unwrap();

        mock.assert();
        assert_eq!(body, r#"{"analysisId":"AN999"}"#);
    }

    #[test]
    fn publish_posts_to_the_studies_path_with_empty_body() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/studies/STUDY1/publish/AN999")
            .match_header("authorization", "Bearer sekret-token")
            .match_body("")
            .with_status(200)
            .with_body("published")
            .create();

        let client = client_for(&server);
        let body = client.publish("STUDY1", "AN999").unwrap();

        mock.assert();
        assert_eq!(body, "published");
    }

    #[test]
    fn non_200_status_is_an_error_without_a_body() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/upload/STUDY1/status/UP123")
            .with_status(404)
            .with_body("not found")
            .create();

        let client = client_for(&server);
        let err = client.get_status("STUDY1", "UP123").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("404"), "unexpected error: {}", msg);
        assert!(!msg.contains("not found"));
    }

    #[test]
    fn created_201_still_counts_as_failure() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/upload/STUDY1/save/UP123")
            .with_status(201)
            .create();

        let client = client_for(&server);
        assert!(client.save("STUDY1", "UP123").is_err());
    }

    #[test]
    fn empty_200_body_returns_empty_string() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/studies/STUDY1/publish/AN999")
            .with_status(200)
            .create();

        let client = client_for(&server);
        assert_eq!(client.publish("STUDY1", "AN999").unwrap(), "");
    }
}
