//! WebDriver HTTP client
//!
//! Thin protocol layer: one method per WebDriver command used by the exporter,
//! with error bodies decoded into [`SurfaceError`].

use super::models::{
    element_arg, hover_actions, session_capabilities, ElementRef, Locator, NewSession, Script,
    WireError, WireResponse,
};
use crate::config::WebDriverConfig;
use crate::domain::{ExporterError, Result, SurfaceError};
use reqwest::{Client, ClientBuilder, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// Client bound to one WebDriver session
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    /// HTTP client for making requests
    http: Client,

    /// WebDriver server URL without trailing slash
    base_url: String,

    /// Active session
    session_id: String,
}

impl WebDriverClient {
    /// Build the HTTP client used for every command
    fn http_client(config: &WebDriverConfig) -> Result<Client> {
        ClientBuilder::new()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ExporterError::Surface(SurfaceError::ConnectionFailed(format!(
                    "Failed to build HTTP client: {e}"
                )))
            })
    }

    /// Create a new browser session
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or refuses the
    /// capabilities.
    pub async fn create_session(
        config: &WebDriverConfig,
        user_data_dir: Option<&str>,
    ) -> Result<Self> {
        let http = Self::http_client(config)?;
        let base_url = config.url.trim_end_matches('/').to_string();
        let body = session_capabilities(config, user_data_dir);

        let session: NewSession = send(
            &http,
            Method::POST,
            &format!("{base_url}/session"),
            "new session",
            Some(&body),
        )
        .await?;

        let browser = session
            .capabilities
            .get("browserName")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        tracing::info!(
            session_id = %session.session_id,
            browser = browser,
            "WebDriver session created"
        );

        Ok(Self {
            http,
            base_url,
            session_id: session.session_id,
        })
    }

    /// Attach to an existing session
    ///
    /// The session is probed with a current-URL command so a dead session
    /// fails fast.
    pub async fn attach(config: &WebDriverConfig, session_id: &str) -> Result<Self> {
        let client = Self {
            http: Self::http_client(config)?,
            base_url: config.url.trim_end_matches('/').to_string(),
            session_id: session_id.to_string(),
        };

        let url = client.current_url().await?;
        tracing::info!(session_id = %session_id, current_url = %url, "Attached to WebDriver session");

        Ok(client)
    }

    /// The active session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The WebDriver server URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        name: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        send(&self.http, method, &url, name, body).await
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        let _: Value = self
            .command(Method::POST, "/url", "navigate", Some(&json!({ "url": url })))
            .await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        self.command(Method::GET, "/url", "get current url", None).await
    }

    pub async fn find_elements_xpath(&self, query: &str) -> Result<Vec<String>> {
        let body = serde_json::to_value(Locator::xpath(query))?;
        let refs: Vec<ElementRef> = self
            .command(Method::POST, "/elements", "find elements", Some(&body))
            .await?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }

    pub async fn find_elements_css(&self, selector: &str) -> Result<Vec<String>> {
        let body = serde_json::to_value(Locator::css(selector))?;
        let refs: Vec<ElementRef> = self
            .command(Method::POST, "/elements", "find elements", Some(&body))
            .await?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }

    pub async fn find_elements_from(&self, parent: &str, query: &str) -> Result<Vec<String>> {
        let body = serde_json::to_value(Locator::xpath(query))?;
        let refs: Vec<ElementRef> = self
            .command(
                Method::POST,
                &format!("/element/{parent}/elements"),
                "find elements from element",
                Some(&body),
            )
            .await?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }

    pub async fn attribute(&self, element: &str, name: &str) -> Result<Option<String>> {
        self.command(
            Method::GET,
            &format!("/element/{element}/attribute/{name}"),
            "get element attribute",
            None,
        )
        .await
    }

    pub async fn text(&self, element: &str) -> Result<String> {
        self.command(
            Method::GET,
            &format!("/element/{element}/text"),
            "get element text",
            None,
        )
        .await
    }

    pub async fn is_displayed(&self, element: &str) -> Result<bool> {
        self.command(
            Method::GET,
            &format!("/element/{element}/displayed"),
            "is element displayed",
            None,
        )
        .await
    }

    pub async fn is_enabled(&self, element: &str) -> Result<bool> {
        self.command(
            Method::GET,
            &format!("/element/{element}/enabled"),
            "is element enabled",
            None,
        )
        .await
    }

    pub async fn click(&self, element: &str) -> Result<()> {
        let _: Value = self
            .command(
                Method::POST,
                &format!("/element/{element}/click"),
                "element click",
                Some(&json!({})),
            )
            .await?;
        Ok(())
    }

    pub async fn hover(&self, element: &str) -> Result<()> {
        let _: Value = self
            .command(
                Method::POST,
                "/actions",
                "perform actions",
                Some(&hover_actions(element)),
            )
            .await?;
        Ok(())
    }

    /// Run a script with the element as `arguments[0]`
    pub async fn execute_on(&self, script: &str, element: &str) -> Result<Value> {
        self.execute(script, vec![element_arg(element)]).await
    }

    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        let body = serde_json::to_value(Script { script, args })?;
        self.command(Method::POST, "/execute/sync", "execute script", Some(&body))
            .await
    }

    pub async fn delete_session(&self) -> Result<()> {
        let _: Value = self
            .command(Method::DELETE, "", "delete session", None)
            .await?;
        tracing::info!(session_id = %self.session_id, "WebDriver session closed");
        Ok(())
    }
}

/// Send one command and decode its `value`
async fn send<T: DeserializeOwned>(
    http: &Client,
    method: Method,
    url: &str,
    name: &str,
    body: Option<&Value>,
) -> Result<T> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            SurfaceError::Timeout(format!("{name}: {e}"))
        } else {
            SurfaceError::ConnectionFailed(format!("{name}: {e}"))
        }
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        SurfaceError::InvalidResponse(format!("{name}: failed to read body: {e}"))
    })?;

    if !status.is_success() {
        tracing::debug!(command = name, status = %status, body = %text, "WebDriver command failed");
        return Err(match serde_json::from_str::<WireResponse<WireError>>(&text) {
            Ok(wire) => wire.value.into_surface_error(name).into(),
            Err(_) => SurfaceError::CommandFailed {
                command: name.to_string(),
                message: format!("status {status}: {text}"),
            }
            .into(),
        });
    }

    serde_json::from_str::<WireResponse<T>>(&text)
        .map(|wire| wire.value)
        .map_err(|e| SurfaceError::InvalidResponse(format!("{name}: {e}: {text}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config_for(server: &Server) -> WebDriverConfig {
        WebDriverConfig {
            url: server.url(),
            user_data_dir: None,
            ..WebDriverConfig::default()
        }
    }

    #[tokio::test]
    async fn test_create_session_sends_capabilities() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/session")
            .match_body(Matcher::PartialJson(json!({
                "capabilities": { "alwaysMatch": { "browserName": "chrome" } }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value":{"sessionId":"s-1","capabilities":{"browserName":"chrome"}}}"#)
            .create_async()
            .await;

        let client = WebDriverClient::create_session(&config_for(&server), Some("/tmp/p"))
            .await
            .unwrap();

        assert_eq!(client.session_id(), "s-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_find_elements_decodes_references() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/session/s-1/url")
            .with_status(200)
            .with_body(r#"{"value":"https://example.com/#/gallery"}"#)
            .create_async()
            .await;
        let find = server
            .mock("POST", "/session/s-1/elements")
            .match_body(Matcher::PartialJson(json!({ "using": "xpath" })))
            .with_status(200)
            .with_body(
                r#"{"value":[{"element-6066-11e4-a52e-4f735466cecf":"e1"},{"element-6066-11e4-a52e-4f735466cecf":"e2"}]}"#,
            )
            .create_async()
            .await;

        let client = WebDriverClient::attach(&config_for(&server), "s-1")
            .await
            .unwrap();
        let found = client
            .find_elements_xpath("//div[@role='listitem']")
            .await
            .unwrap();

        assert_eq!(found, vec!["e1".to_string(), "e2".to_string()]);
        find.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body_maps_to_surface_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/session/s-1/url")
            .with_status(200)
            .with_body(r#"{"value":"about:blank"}"#)
            .create_async()
            .await;
        let _click = server
            .mock("POST", "/session/s-1/element/e9/click")
            .with_status(404)
            .with_body(
                r#"{"value":{"error":"stale element reference","message":"element is not attached","stacktrace":""}}"#,
            )
            .create_async()
            .await;

        let client = WebDriverClient::attach(&config_for(&server), "s-1")
            .await
            .unwrap();
        let err = client.click("e9").await.unwrap_err();

        assert!(matches!(
            err,
            ExporterError::Surface(SurfaceError::StaleElement(_))
        ));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_attach_to_dead_session_fails() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/session/gone/url")
            .with_status(404)
            .with_body(r#"{"value":{"error":"invalid session id","message":"no such session"}}"#)
            .create_async()
            .await;

        let result = WebDriverClient::attach(&config_for(&server), "gone").await;
        assert!(matches!(
            result,
            Err(ExporterError::Surface(SurfaceError::ConnectionFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_unparseable_error_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/session")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let result = WebDriverClient::create_session(&config_for(&server), None).await;
        match result {
            Err(ExporterError::Surface(SurfaceError::CommandFailed { command, message })) => {
                assert_eq!(command, "new session");
                assert!(message.contains("500"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
