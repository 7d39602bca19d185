use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use macroscope_models::FetchConfig;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Loads a page in a browser and returns the DOM after scripts have run.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, FetchError>;
}

/// Renders pages with a headless Chromium process.
///
/// Each render is one short-lived process spawned with `kill_on_drop`, so the
/// session is torn down when the render finishes, fails, or times out.
#[derive(Debug, Clone)]
pub struct HeadlessChrome {
    pub binary: String,
    pub user_agent: String,
    pub wait: Duration,
    pub timeout: Duration,
}

impl HeadlessChrome {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            binary: config.browser_binary.clone(),
            user_agent: config.user_agent.clone(),
            wait: Duration::from_millis(config.render_wait_ms),
            timeout: Duration::from_secs(config.render_timeout_seconds),
        }
    }

    fn args(&self, url: &str) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--log-level=3".to_string(),
            format!("--user-agent={}", self.user_agent),
            format!("--virtual-time-budget={}", self.wait.as_millis()),
            "--dump-dom".to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl PageRenderer for HeadlessChrome {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        debug!(binary = %self.binary, url, "Launching headless browser");

        let mut command = Command::new(&self.binary);
        command
            .args(self.args(url))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            })?
            .map_err(|e| FetchError::Session(format!("Failed to spawn {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, url, "Headless browser failed");
            return Err(FetchError::Session(format!(
                "{} exited {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        if dom.trim().is_empty() {
            return Err(FetchError::Session(format!("Empty DOM for {url}")));
        }

        Ok(dom)
    }
}

/// Check if the browser executable can be launched.
pub async fn check_browser_available(binary: &str) -> bool {
    match Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
