use crate::chrome::find_chrome;
use crate::{Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures::StreamExt;
use saldo_core::Credential;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Browser launch and navigation share this bound.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Bound on the post-navigation readiness poll.
pub const DOM_READY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub dom_ready_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            navigation_timeout: NAVIGATION_TIMEOUT,
            dom_ready_timeout: DOM_READY_TIMEOUT,
        }
    }
}

/// Owns one isolated Chrome process and its CDP handler task.
///
/// The process must be released on every exit path; a leaked browser is a
/// correctness bug. [`with_authenticated_page`] is the intended entry point
/// and shuts the session down regardless of how extraction went. `Drop`
/// backstops the panic path: the handler task is aborted and chromiumoxide
/// kills the child process when the `Browser` is dropped.
pub struct BrowserSession {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
    config: SessionConfig,
    // Held so the profile directory outlives the Chrome process.
    _profile: tempfile::TempDir,
}

impl BrowserSession {
    /// Launch an isolated headless Chrome with a throwaway profile.
    pub async fn launch(config: &SessionConfig) -> Result<Self> {
        let profile = tempfile::tempdir()?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-blink-features=AutomationControlled");
        if let Some(path) = config.chrome_path.clone().or_else(find_chrome) {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(Error::Launch)?;

        tracing::debug!("launching browser (headless={})", config.headless);
        let (browser, mut handler) =
            tokio::time::timeout(config.navigation_timeout, Browser::launch(browser_config))
                .await
                .map_err(|_| {
                    Error::Launch(format!(
                        "browser did not come up within {}s",
                        config.navigation_timeout.as_secs()
                    ))
                })?
                .map_err(|err| Error::Launch(err.to_string()))?;

        // The handler must run for any CDP command to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!("CDP handler event error (continuing): {err}");
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            config: config.clone(),
            _profile: profile,
        })
    }

    /// Open a page, inject the credential's cookies, and navigate.
    ///
    /// Cookies are set before navigation so the first page load is already
    /// authenticated. Navigation and readiness are both timeout-bounded.
    pub async fn authenticated_page(&self, credential: &Credential, url: &str) -> Result<Page> {
        let page = self.browser.new_page("about:blank").await?;

        let cookies = cookie_params(credential);
        if !cookies.is_empty() {
            page.set_cookies(cookies).await?;
        }

        tracing::debug!("navigating to {url}");
        tokio::time::timeout(self.config.navigation_timeout, async {
            page.goto(url)
                .await
                .map_err(|err| Error::Navigation(format!("navigation to {url} failed: {err}")))?;
            page.wait_for_navigation()
                .await
                .map_err(|err| Error::Navigation(format!("navigation to {url} failed: {err}")))?;
            Ok::<_, Error>(())
        })
        .await
        .map_err(|_| {
            Error::Navigation(format!(
                "navigation to {url} timed out after {}s",
                self.config.navigation_timeout.as_secs()
            ))
        })??;

        wait_for_dom_ready(&page, self.config.dom_ready_timeout).await?;
        Ok(page)
    }

    /// Close the browser process and stop the handler task.
    pub async fn shutdown(&mut self) {
        if let Err(err) = self.browser.close().await {
            tracing::debug!("browser close failed (process will be killed): {err}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

/// Run `work` against an authenticated page, releasing the browser on every
/// exit path.
pub async fn with_authenticated_page<F, Fut, R>(
    config: &SessionConfig,
    credential: &Credential,
    url: &str,
    work: F,
) -> Result<R>
where
    F: FnOnce(Page) -> Fut,
    Fut: Future<Output = R>,
{
    let mut session = BrowserSession::launch(config).await?;

    let outcome = match session.authenticated_page(credential, url).await {
        Ok(page) => Ok(work(page).await),
        Err(err) => Err(err),
    };

    session.shutdown().await;
    outcome
}

/// Convert credential pairs into browser cookies scoped to the credential's
/// domain.
fn cookie_params(credential: &Credential) -> Vec<CookieParam> {
    credential
        .pairs()
        .iter()
        .map(|pair| {
            let mut cookie = CookieParam::new(pair.name.clone(), pair.value.clone());
            cookie.domain = Some(credential.domain().to_string());
            cookie.path = Some("/".to_string());
            cookie
        })
        .collect()
}

async fn wait_for_dom_ready(page: &Page, timeout: Duration) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let ready = page
            .evaluate("document.readyState")
            .await
            .ok()
            .and_then(|result| result.into_value::<String>().ok())
            .map(|state| state == "interactive" || state == "complete")
            .unwrap_or(false);
        if ready {
            return Ok(());
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(Error::Navigation(format!(
                "page did not become ready within {}s",
                timeout.as_secs()
            )));
        }

        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
