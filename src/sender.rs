// src/sender.rs
// Send actuator seam: platform automation behind a trait.

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{CoreError, CoreResult};

/// External capability that performs an actual message transmission. Invoked
/// by both the direct-send path and the scheduler's deferred callback.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `recipient`, returning the platform acknowledgment.
    async fn send(&self, recipient: &str, text: &str) -> CoreResult<String>;
}

/// Production actuator: drives the Messages application through `osascript`.
pub struct OsaScriptSender;

#[async_trait]
impl MessageSender for OsaScriptSender {
    async fn send(&self, recipient: &str, text: &str) -> CoreResult<String> {
        let escaped = text.replace('"', "\\\"");
        let script = format!(
            "tell application \"Messages\"\n\
             set targetService to 1st service whose service type = iMessage\n\
             set targetBuddy to buddy \"{recipient}\"\n\
             send \"{escaped}\" to targetBuddy\n\
             end tell"
        );

        let output = Command::new("osascript")
            .args(["-e", &script])
            .output()
            .await
            .map_err(|e| CoreError::Send(format!("osascript failed to start: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Send(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
