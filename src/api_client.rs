use crate::error::ApiError;
use crate::models::{VoteRequest, VoteResponse};
use crate::utils::SOURCE_COOKIE_NAME;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const RECENT_ACTIVITY_PATH: &str = "/recent/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        // Makes the server answer votes with JSON instead of a redirect.
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a `data-vote-url` value against the site root.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    pub async fn post_vote(
        &self,
        vote_url: &str,
        request: &VoteRequest,
        source: Option<&str>,
    ) -> Result<VoteResponse, ApiError> {
        let url = self.resolve(vote_url)?;
        debug!("POST {} for {}", url, request.email);

        let response = self
            .client
            .post(url)
            .header(COOKIE, cookie_header(&request.csrf_token, source))
            .form(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::ServerError {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<VoteResponse>(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    pub async fn fetch_recent_activity(&self) -> Result<String, ApiError> {
        let url = self.resolve(RECENT_ACTIVITY_PATH)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::ServerError {
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

fn cookie_header(csrf_token: &str, source: Option<&str>) -> String {
    let mut cookie = format!("csrftoken={}", csrf_token);
    if let Some(source) = source {
        let encoded: String = url::form_urlencoded::byte_serialize(source.as_bytes()).collect();
        cookie.push_str(&format!("; {}={}", SOURCE_COOKIE_NAME, encoded));
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdeaId, VoterFields};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(2)).unwrap()
    }

    fn request() -> VoteRequest {
        VoteRequest::build(VoterFields::new("a@b.com", "12345"), "csrf-1", false).unwrap()
    }

    #[tokio::test]
    async fn test_post_vote_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/questions/7/vote/"))
            .and(header("x-requested-with", "XMLHttpRequest"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("email=a%40b.com"))
            .and(body_string_contains("csrfmiddlewaretoken=csrf-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "200",
                "tally": 12,
                "id": 7
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let response = client
            .post_vote("/questions/7/vote/", &request(), None)
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.id, Some(IdeaId::from(7u64)));
        assert_eq!(response.tally, Some(12));
    }

    #[tokio::test]
    async fn test_post_vote_sends_cookies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/questions/7/vote/"))
            .and(header("cookie", "csrftoken=csrf-1; opendebates.source=spring+mail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "200",
                "tally": 1,
                "id": 7
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client
            .post_vote("/questions/7/vote/", &request(), Some("spring mail"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_post_vote_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.post_vote("/questions/7/vote/", &request(), None).await;

        assert!(matches!(result, Err(ApiError::ServerError { status: 403 })));
    }

    #[tokio::test]
    async fn test_post_vote_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.post_vote("/questions/7/vote/", &request(), None).await;

        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_post_vote_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let result = client.post_vote("/questions/7/vote/", &request(), None).await;

        assert!(matches!(result, Err(ApiError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_fetch_recent_activity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recent/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ul><li>vote</li></ul>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let fragment = client.fetch_recent_activity().await.unwrap();

        assert_eq!(fragment, "<ul><li>vote</li></ul>");
    }

    #[test]
    fn test_resolve_relative_vote_url() {
        let client = ApiClient::new(
            Url::parse("https://example.org/debate/").unwrap(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();

        assert_eq!(
            client.resolve("/questions/3/vote/").unwrap().as_str(),
            "https://example.org/questions/3/vote/"
        );
    }
}
