//! SWAPI API client implementation.
//!
//! This module provides the HTTP client for the SWAPI planet endpoints.

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{ApiError, ConfigError, Result, SwapiError};

use super::api::PlanetApi;
use super::types::{Planet, PlanetLookup, PlanetRequest};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "api-key";

/// Collection path under the endpoint.
const PLANETS_PATH: &str = "planets";

/// SWAPI API client.
///
/// Holds only immutable configuration, so a single instance can be shared
/// by concurrent callers.
#[derive(Clone)]
pub struct SwapiClient {
    /// HTTP client.
    client: Client,
    /// Base endpoint, without trailing slash.
    endpoint: Url,
    /// API key.
    api_key: String,
}

impl std::fmt::Debug for SwapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl SwapiClient {
    /// Creates a new SWAPI API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an absolute `http(s)` URL or
    /// the HTTP client cannot be created.
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;

        let client = Client::builder()
            .user_agent(concat!("swapi-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    /// Builds `{endpoint}/planets[/{id}]` with percent-encoded segments.
    fn planets_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| SwapiError::internal("endpoint cannot be a base URL"))?;
            segments.pop_if_empty().push(PLANETS_PATH);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Starts an authenticated request.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{method} {url}");
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// Sends a request and maps transport failures and error statuses.
    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        trace!("Response status: {status}");

        if status.as_u16() >= 400 {
            return Err(ApiError::remote(status).into());
        }

        Ok(response)
    }

    /// Reads the body and decodes it as JSON.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response body: {e}")))?;

        trace!("Response body: {}", String::from_utf8_lossy(&body));

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::decode(format!("Failed to parse response: {e}")).into())
    }
}

#[async_trait]
impl PlanetApi for SwapiClient {
    async fn read_planet_by_id(&self, id: &str) -> Result<Planet> {
        let url = self.planets_url(Some(id))?;
        let response = Self::send(self.request(Method::GET, url)).await?;
        Self::decode(response).await
    }

    async fn read_planet_by_name(&self, name: &str) -> Result<Planet> {
        let url = self.planets_url(None)?;
        let request = self.request(Method::GET, url).query(&[("name", name)]);
        let response = Self::send(request).await?;

        match Self::decode::<PlanetLookup>(response).await? {
            PlanetLookup::One(planet) => Ok(planet),
            PlanetLookup::Many(mut planets) => match planets.len() {
                0 => Err(ApiError::PlanetNotFound {
                    name: name.to_string(),
                }
                .into()),
                1 => Ok(planets.remove(0)),
                count => Err(ApiError::AmbiguousName {
                    name: name.to_string(),
                    count,
                }
                .into()),
            },
        }
    }

    async fn create_or_update_planet(&self, planet: &Planet) -> Result<Planet> {
        let url = self.planets_url(None)?;
        let request = self
            .request(Method::POST, url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&PlanetRequest::from(planet));
        let response = Self::send(request).await?;

        let saved: Planet = Self::decode(response).await?;
        if !saved.has_id() {
            return Err(ApiError::decode("server returned a planet without an id").into());
        }

        Ok(saved)
    }

    async fn delete_planet(&self, id: &str) -> Result<()> {
        let url = self.planets_url(Some(id))?;
        Self::send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

/// Parses and checks the endpoint.
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let invalid = |message: &str| {
        SwapiError::Config(ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        })
    };

    let url = Url::parse(endpoint.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("endpoint cannot be used as a base URL"));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SwapiClient {
        SwapiClient::new(&format!("{}/v1", server.uri()), "secret").expect("client")
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(SwapiClient::new("not a url", "k").is_err());
        assert!(SwapiClient::new("ftp://api.test/v1", "k").is_err());
        assert!(SwapiClient::new("mailto:someone@api.test", "k").is_err());
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let client = SwapiClient::new("https://api.test/v1/", "secret").expect("client");
        assert_eq!(client.endpoint(), "https://api.test/v1");

        let url = client.planets_url(Some("42")).expect("url");
        assert_eq!(url.as_str(), "https://api.test/v1/planets/42");
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let client = SwapiClient::new("https://api.test/v1", "secret").expect("client");
        let url = client.planets_url(Some("a/b c")).expect("url");
        assert_eq!(url.as_str(), "https://api.test/v1/planets/a%2Fb%20c");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = SwapiClient::new("https://api.test/v1", "secret").expect("client");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("api.test"));
    }

    #[tokio::test]
    async fn test_read_planet_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/planets"))
            .and(query_param("name", "Hoth"))
            .and(header("api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1", "name": "Hoth", "diameter": 7200, "population": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let planet = client_for(&server)
            .await
            .read_planet_by_name("Hoth")
            .await
            .expect("planet");

        assert_eq!(
            planet,
            Planet {
                id: String::from("1"),
                name: String::from("Hoth"),
                diameter: Some(7200),
                population: Some(0),
            }
        );
    }

    #[tokio::test]
    async fn test_read_planet_by_name_with_list_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("name", "Kamino"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("name", "Naboo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "8", "name": "Naboo" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("name", "Twin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "1", "name": "Twin" },
                { "id": "2", "name": "Twin" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let missing = client.read_planet_by_name("Kamino").await.unwrap_err();
        assert!(matches!(missing, SwapiError::Api(ApiError::PlanetNotFound { .. })));

        let single = client.read_planet_by_name("Naboo").await.expect("planet");
        assert_eq!(single.id, "8");

        let twins = client.read_planet_by_name("Twin").await.unwrap_err();
        assert!(matches!(
            twins,
            SwapiError::Api(ApiError::AmbiguousName { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_planet_by_id_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/planets/99"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"nope\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .read_planet_by_id("99")
            .await
            .unwrap_err();

        assert!(matches!(err, SwapiError::Api(ApiError::Remote { status: 404, .. })));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_error_status_wins_over_valid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/planets/1"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "id": "1", "name": "Hoth"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .read_planet_by_id("1")
            .await
            .unwrap_err();

        assert_eq!(err.remote_status(), Some(503));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/planets/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": 1, \"name\""))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .read_planet_by_id("1")
            .await
            .unwrap_err();

        assert!(matches!(err, SwapiError::Api(ApiError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_create_posts_json_and_returns_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/planets"))
            .and(header("api-key", "secret"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "name": "Hoth", "diameter": 7200 })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "17", "name": "Hoth", "diameter": 7200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .await
            .create_or_update_planet(&Planet::new("Hoth").with_diameter(7200))
            .await
            .expect("planet");

        assert_eq!(created.id, "17");
        assert_eq!(created.name, "Hoth");
        assert_eq!(created.population, None);
    }

    #[tokio::test]
    async fn test_create_without_id_in_response_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "", "name": "Hoth"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .create_or_update_planet(&Planet::new("Hoth"))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapiError::Api(ApiError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_empty_name_surfaces_server_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({ "name": "" })))
            .respond_with(ResponseTemplate::new(422))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .create_or_update_planet(&Planet::new(""))
            .await
            .unwrap_err();

        assert_eq!(err.remote_status(), Some(422));
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/planets/17"))
            .and(header("api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .await
            .delete_planet("17")
            .await
            .expect("delete");
    }

    #[tokio::test]
    async fn test_network_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        let endpoint = format!("http://127.0.0.1:{port}/v1");

        let client = SwapiClient::new(&endpoint, "secret").expect("client");
        let err = client.read_planet_by_id("1").await.unwrap_err();

        assert!(matches!(err, SwapiError::Api(ApiError::Network { .. })));
    }
}
