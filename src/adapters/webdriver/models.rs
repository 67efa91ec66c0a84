//! W3C WebDriver wire models
//!
//! Request and response bodies of the WebDriver HTTP protocol. These models
//! stay inside the adapter; the rest of the crate only sees
//! [`crate::adapters::surface::ElementHandle`].

use crate::config::WebDriverConfig;
use crate::domain::SurfaceError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Key under which WebDriver serializes element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Every WebDriver response wraps its payload in `value`
#[derive(Debug, Deserialize)]
pub struct WireResponse<T> {
    pub value: T,
}

/// Error payload returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

impl WireError {
    /// Maps a WebDriver error code onto the surface error taxonomy
    pub fn into_surface_error(self, command: &str) -> SurfaceError {
        let detail = format!("{command}: {}", self.message);
        match self.error.as_str() {
            "stale element reference" => SurfaceError::StaleElement(detail),
            "no such element" => SurfaceError::ElementNotFound(detail),
            "element not interactable" | "element click intercepted" => {
                SurfaceError::NotInteractable(detail)
            }
            "timeout" | "script timeout" => SurfaceError::Timeout(detail),
            "invalid session id" | "session not created" => SurfaceError::ConnectionFailed(detail),
            _ => SurfaceError::CommandFailed {
                command: command.to_string(),
                message: format!("{}: {}", self.error, self.message),
            },
        }
    }
}

/// Payload of a successful new-session command
#[derive(Debug, Deserialize)]
pub struct NewSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Serialized element reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

/// Locator body for find commands
#[derive(Debug, Serialize)]
pub struct Locator<'a> {
    pub using: &'a str,
    pub value: &'a str,
}

impl<'a> Locator<'a> {
    pub fn xpath(value: &'a str) -> Self {
        Self {
            using: "xpath",
            value,
        }
    }

    pub fn css(value: &'a str) -> Self {
        Self {
            using: "css selector",
            value,
        }
    }
}

/// Body of a synchronous script execution
#[derive(Debug, Serialize)]
pub struct Script<'a> {
    pub script: &'a str,
    pub args: Vec<Value>,
}

/// Serializes an element reference for use as a script argument
pub fn element_arg(id: &str) -> Value {
    json!({ ELEMENT_KEY: id })
}

/// Builds the new-session body
///
/// Chrome and Chromium based drivers receive the profile directory through
/// `--user-data-dir`; Firefox through `-profile`.
pub fn session_capabilities(config: &WebDriverConfig, user_data_dir: Option<&str>) -> Value {
    let browser = config.browser.to_lowercase();
    let mut args: Vec<String> = Vec::new();

    let options = match browser.as_str() {
        "firefox" => {
            if let Some(dir) = user_data_dir {
                args.push("-profile".to_string());
                args.push(dir.to_string());
            }
            args.extend(config.browser_args.iter().cloned());
            json!({ "moz:firefoxOptions": { "args": args } })
        }
        "msedge" | "edge" => {
            if let Some(dir) = user_data_dir {
                args.push(format!("--user-data-dir={dir}"));
            }
            args.extend(config.browser_args.iter().cloned());
            json!({ "ms:edgeOptions": { "args": args } })
        }
        _ => {
            if let Some(dir) = user_data_dir {
                args.push(format!("--user-data-dir={dir}"));
            }
            args.extend(config.browser_args.iter().cloned());
            json!({ "goog:chromeOptions": { "args": args } })
        }
    };

    let mut always_match = json!({ "browserName": browser });
    if let (Value::Object(target), Value::Object(extra)) = (&mut always_match, options) {
        target.extend(extra);
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}

/// Pointer action that moves the mouse onto the centre of an element
pub fn hover_actions(element_id: &str) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "mouse",
            "parameters": { "pointerType": "mouse" },
            "actions": [{
                "type": "pointerMove",
                "duration": 0,
                "origin": element_arg(element_id),
                "x": 0,
                "y": 0
            }]
        }]
    })
}

pub const SCRIPT_SCROLL_SMOOTH: &str = "arguments[0].scrollIntoView({behavior:'smooth'});";

pub const SCRIPT_SCROLL_IF_NEEDED: &str = "if (arguments[0].scrollIntoViewIfNeeded) { arguments[0].scrollIntoViewIfNeeded(); } else { arguments[0].scrollIntoView({block:'nearest'}); }";

pub const SCRIPT_REMOVE: &str = "arguments[0].remove();";

pub const SCRIPT_SAVE_FILE: &str = r#"
var link = document.createElement("a");
link.download = arguments[0];
link.target = "_blank";
link.href = arguments[1];
document.body.appendChild(link);
link.click();
document.body.removeChild(link);
"#;
