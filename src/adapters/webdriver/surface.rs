//! [`AutomationSurface`] over a WebDriver session

use super::client::WebDriverClient;
use super::models::{
    SCRIPT_REMOVE, SCRIPT_SAVE_FILE, SCRIPT_SCROLL_IF_NEEDED, SCRIPT_SCROLL_SMOOTH,
};
use crate::adapters::surface::{AutomationSurface, ElementHandle, ScrollBehavior};
use crate::config::WebDriverConfig;
use crate::domain::{ExporterError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Browser driven through a W3C WebDriver endpoint
///
/// # Example
///
/// ```no_run
/// use gallery_export::adapters::webdriver::WebDriverSurface;
/// use gallery_export::config::WebDriverConfig;
///
/// # async fn example() -> gallery_export::domain::Result<()> {
/// let surface = WebDriverSurface::connect(WebDriverConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct WebDriverSurface {
    client: WebDriverClient,
    config: WebDriverConfig,
    /// Sessions we created are deleted on close; attached ones are left alone
    owns_session: bool,
}

impl WebDriverSurface {
    /// Create or attach to a session according to configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the profile directory cannot be created or the
    /// WebDriver server refuses the session.
    pub async fn connect(config: WebDriverConfig) -> Result<Self> {
        if let Some(session_id) = config.session_id.clone() {
            let client = WebDriverClient::attach(&config, &session_id).await?;
            return Ok(Self {
                client,
                config,
                owns_session: false,
            });
        }

        let profile = match &config.user_data_dir {
            Some(dir) => Some(prepare_profile_dir(dir).await?),
            None => None,
        };
        let profile = profile.map(|p| p.to_string_lossy().into_owned());

        let client = WebDriverClient::create_session(&config, profile.as_deref()).await?;
        Ok(Self {
            client,
            config,
            owns_session: true,
        })
    }

    /// The underlying protocol client
    pub fn client(&self) -> &WebDriverClient {
        &self.client
    }
}

/// Creates the browser profile directory and returns its absolute path
async fn prepare_profile_dir(dir: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        ExporterError::Configuration(format!("Failed to create profile directory {dir}: {e}"))
    })?;

    let path = PathBuf::from(dir);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn handles(ids: Vec<String>) -> Vec<ElementHandle> {
    ids.into_iter().map(ElementHandle::new).collect()
}

/// Escapes a value for use inside a double-quoted CSS attribute selector
fn css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl AutomationSurface for WebDriverSurface {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!(url = %url, "Navigating");
        self.client.navigate(url).await
    }

    async fn find_all(&self, query: &str) -> Result<Vec<ElementHandle>> {
        Ok(handles(self.client.find_elements_xpath(query).await?))
    }

    async fn find_within(
        &self,
        parent: &ElementHandle,
        query: &str,
    ) -> Result<Vec<ElementHandle>> {
        Ok(handles(
            self.client
                .find_elements_from(parent.as_str(), query)
                .await?,
        ))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ElementHandle>> {
        let found = self
            .client
            .find_elements_css(&format!("[id=\"{}\"]", css_string(id)))
            .await?;
        Ok(found.into_iter().next().map(ElementHandle::new))
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.client.attribute(element.as_str(), name).await
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        self.client.text(element.as_str()).await
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        self.client.is_displayed(element.as_str()).await
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        self.client.is_enabled(element.as_str()).await
    }

    async fn hover(&self, element: &ElementHandle) -> Result<()> {
        self.client.hover(element.as_str()).await
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.client.click(element.as_str()).await
    }

    async fn scroll_into_view(
        &self,
        element: &ElementHandle,
        behavior: ScrollBehavior,
    ) -> Result<()> {
        let script = match behavior {
            ScrollBehavior::Smooth => SCRIPT_SCROLL_SMOOTH,
            ScrollBehavior::IfNeeded => SCRIPT_SCROLL_IF_NEEDED,
        };
        self.client.execute_on(script, element.as_str()).await?;
        Ok(())
    }

    async fn remove(&self, element: &ElementHandle) -> Result<()> {
        self.client
            .execute_on(SCRIPT_REMOVE, element.as_str())
            .await?;
        Ok(())
    }

    async fn trigger_file_save(&self, file_name: &str, url: &str) -> Result<()> {
        self.client
            .execute(
                SCRIPT_SAVE_FILE,
                vec![Value::from(file_name), Value::from(url)],
            )
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.owns_session && self.config.close_on_exit {
            self.client.delete_session().await
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!(
            "webdriver {} session {}",
            self.client.base_url(),
            self.client.session_id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    async fn attached(server: &mut Server) -> WebDriverSurface {
        let _probe = server
            .mock("GET", "/session/s-1/url")
            .with_status(200)
            .with_body(r#"{"value":"about:blank"}"#)
            .create_async()
            .await;

        let config = WebDriverConfig {
            url: server.url(),
            session_id: Some("s-1".to_string()),
            ..WebDriverConfig::default()
        };
        WebDriverSurface::connect(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_find_by_id_returns_none_when_absent() {
        let mut server = Server::new_async().await;
        let surface = attached(&mut server).await;
        let _m = server
            .mock("POST", "/session/s-1/elements")
            .match_body(Matcher::PartialJson(json!({
                "using": "css selector",
                "value": "[id=\"toast-root\"]"
            })))
            .with_status(200)
            .with_body(r#"{"value":[]}"#)
            .create_async()
            .await;

        assert!(surface.find_by_id("toast-root").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_runs_script_with_element_argument() {
        let mut server = Server::new_async().await;
        let surface = attached(&mut server).await;
        let exec = server
            .mock("POST", "/session/s-1/execute/sync")
            .match_body(Matcher::PartialJson(json!({
                "script": "arguments[0].remove();",
                "args": [{ "element-6066-11e4-a52e-4f735466cecf": "e7" }]
            })))
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;

        surface.remove(&ElementHandle::new("e7")).await.unwrap();
        exec.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_attribute_is_none() {
        let mut server = Server::new_async().await;
        let surface = attached(&mut server).await;
        let _m = server
            .mock("GET", "/session/s-1/element/e1/attribute/src")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;

        let value = surface
            .attribute(&ElementHandle::new("e1"), "src")
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_file_save_passes_name_and_url() {
        let mut server = Server::new_async().await;
        let surface = attached(&mut server).await;
        let exec = server
            .mock("POST", "/session/s-1/execute/sync")
            .match_body(Matcher::PartialJson(json!({
                "args": ["00042", "https://cdn.example.com/t.jpg"]
            })))
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;

        surface
            .trigger_file_save("00042", "https://cdn.example.com/t.jpg")
            .await
            .unwrap();
        exec.assert_async().await;
    }

    #[tokio::test]
    async fn test_attached_session_is_not_deleted() {
        let mut server = Server::new_async().await;
        let surface = attached(&mut server).await;
        let delete = server
            .mock("DELETE", "/session/s-1")
            .expect(0)
            .create_async()
            .await;

        surface.close().await.unwrap();
        delete.assert_async().await;
        assert!(surface.describe().contains("s-1"));
    }

    #[test]
    fn test_css_string_escaping() {
        assert_eq!(css_string(r#"a"b"#), r#"a\"b"#);
        assert_eq!(css_string("plain"), "plain");
    }
}
