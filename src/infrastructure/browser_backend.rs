//! Headless-browser page backend
//!
//! Launches one Chrome/Chromium process over CDP, keeps a single tab open and
//! serializes navigations through it. Pages are read after scripts have had
//! time to run, which is what the HTTP backend cannot offer.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::infrastructure::config::BrowserConfig;
use crate::infrastructure::fetch_error::{FetchError, FetchResult};
use crate::infrastructure::page_fetcher::RenderingBackend;
use crate::infrastructure::politeness::Politeness;

const BODY_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct BrowserBackend {
    browser: Mutex<Option<Browser>>,
    page: Mutex<Page>,
    handler: JoinHandle<()>,
    config: BrowserConfig,
    politeness: Arc<Politeness>,
}

impl BrowserBackend {
    /// Launch the browser and open the working tab
    pub async fn launch(
        config: &BrowserConfig,
        executable: Option<&Path>,
        user_agent: &str,
        politeness: Arc<Politeness>,
    ) -> Result<Self> {
        let mut builder = LaunchConfig::builder()
            .window_size(config.window_width, config.window_height)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={user_agent}"));
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        let launch_config = builder.build().map_err(|e| anyhow!("Browser config error: {e}"))?;

        let (mut browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser: {e}"))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(anyhow!("Failed to open browser tab: {e}"));
            }
        };

        info!("🖥️ Headless browser ready ({}x{})", config.window_width, config.window_height);
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page: Mutex::new(page),
            handler,
            config: config.clone(),
            politeness,
        })
    }
}

#[async_trait]
impl RenderingBackend for BrowserBackend {
    /// Navigate to `url` and return the rendered markup
    async fn fetch_markup(&self, url: &str) -> FetchResult<String> {
        self.politeness.wait().await;
        let page = self.page.lock().await;

        info!("🖥️ Browser GET: {}", url);
        match timeout(self.config.navigation_timeout(), page.goto(url)).await {
            Err(_) => return Err(FetchError::timeout(url)),
            Ok(Err(e)) => return Err(FetchError::connection(url, e)),
            Ok(Ok(_)) => {}
        }

        sleep(self.config.settle()).await;

        if timeout(self.config.ready_timeout(), wait_for_body(&page)).await.is_ok() {
            sleep(self.config.post_ready()).await;
        } else {
            warn!("⚠️ <body> not ready after {:?}: {}", self.config.ready_timeout(), url);
            sleep(self.config.ready_grace()).await;
        }

        page.content().await.map_err(|e| FetchError::generic(url, e))
    }

    /// Close the browser and wait for the process to exit
    async fn shutdown(&self) {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return;
        };
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        info!("🖥️ Headless browser closed");
    }
}

async fn wait_for_body(page: &Page) {
    while page.find_element("body").await.is_err() {
        sleep(BODY_POLL_INTERVAL).await;
    }
}
