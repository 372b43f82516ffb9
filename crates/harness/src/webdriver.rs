//! WebDriver binding of the capability driver
//!
//! A thin adapter over [`thirtyfour::WebDriver`]. Works against chromedriver,
//! geckodriver, a Selenium grid or Appium. One [`WebDriverClient`] wraps
//! exactly one remote session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use thirtyfour::error::WebDriverError;
use thirtyfour::common::command::{Command, ExtensionCommand};
use thirtyfour::{By, Capabilities, RequestMethod, WebDriver, WebElement};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{Browser, HarnessConfig};
use crate::driver::{BrowserCommand, CapabilityDriver, ElementHandle, Gesture, Point};
use crate::error::{DriverError, DriverResult};
use crate::scenario::ScenarioOptions;
use crate::session::{Session, SessionFactory, SessionProfile};
use crate::visual::CapturedImage;

/// Intermediate pointer positions of a swipe
const SWIPE_STEPS: i64 = 10;

/// Two-finger touch input, which the action chain cannot express.
#[derive(Debug)]
struct TouchActions(Value);

impl ExtensionCommand for TouchActions {
    fn parameters_json(&self) -> Option<Value> {
        Some(self.0.clone())
    }

    fn method(&self) -> RequestMethod {
        RequestMethod::Post
    }

    fn endpoint(&self) -> String {
        String::from("actions")
    }
}

pub struct WebDriverClient {
    driver: WebDriver,
    elements: Mutex<HashMap<String, WebElement>>,
}

impl WebDriverClient {
    pub async fn connect(endpoint: &str, capabilities: Capabilities) -> DriverResult<Self> {
        let driver = WebDriver::new(endpoint, capabilities)
            .await
            .map_err(|e| driver_error(e, "new session"))?;
        info!("WebDriver session started at {}", endpoint);
        Ok(Self {
            driver,
            elements: Mutex::new(HashMap::new()),
        })
    }

    fn register(&self, element: WebElement) -> ElementHandle {
        let id = element.element_id().to_string();
        self.elements.lock().insert(id.clone(), element);
        ElementHandle::new(id)
    }

    fn element(&self, handle: &ElementHandle) -> DriverResult<WebElement> {
        self.elements
            .lock()
            .get(handle.id())
            .cloned()
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: handle.id().to_string(),
            })
    }

    async fn press(&self, at: Point, hold: Duration) -> DriverResult<()> {
        self.driver
            .action_chain()
            .move_to(at.x, at.y)
            .click_and_hold()
            .perform()
            .await
            .map_err(|e| driver_error(e, "tap"))?;
        sleep(hold).await;
        self.driver
            .action_chain()
            .release()
            .perform()
            .await
            .map_err(|e| driver_error(e, "tap"))
    }

    async fn swipe(&self, from: Point, to: Point, duration: Duration) -> DriverResult<()> {
        let mut chain = self.driver.action_chain().move_to(from.x, from.y).click_and_hold();
        for step in 1..=SWIPE_STEPS {
            let x = from.x + (to.x - from.x) * step / SWIPE_STEPS;
            let y = from.y + (to.y - from.y) * step / SWIPE_STEPS;
            chain = chain.move_to(x, y);
        }
        chain.perform().await.map_err(|e| driver_error(e, "swipe"))?;
        sleep(duration).await;
        self.driver
            .action_chain()
            .release()
            .perform()
            .await
            .map_err(|e| driver_error(e, "swipe"))
    }
}

#[async_trait]
impl CapabilityDriver for WebDriverClient {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.driver.goto(url).await.map_err(|e| match driver_error(e, url) {
            DriverError::Protocol(reason) => DriverError::NavigationFailed {
                url: url.to_string(),
                reason,
            },
            other => other,
        })?;
        // references from the previous document are dead
        self.elements.lock().clear();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let url = self
            .driver
            .current_url()
            .await
            .map_err(|e| driver_error(e, "current url"))?;
        Ok(url.to_string())
    }

    async fn find_element(&self, selector: &str) -> DriverResult<ElementHandle> {
        let element = self
            .driver
            .find(By::Css(selector))
            .await
            .map_err(|e| driver_error(e, selector))?;
        Ok(self.register(element))
    }

    async fn find_elements(&self, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        let elements = self
            .driver
            .find_all(By::Css(selector))
            .await
            .map_err(|e| driver_error(e, selector))?;
        Ok(elements.into_iter().map(|e| self.register(e)).collect())
    }

    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> DriverResult<ElementHandle> {
        let element = self
            .element(parent)?
            .find(By::Css(selector))
            .await
            .map_err(|e| driver_error(e, selector))?;
        Ok(self.register(element))
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> DriverResult<Vec<ElementHandle>> {
        let elements = self
            .element(parent)?
            .find_all(By::Css(selector))
            .await
            .map_err(|e| driver_error(e, selector))?;
        Ok(elements.into_iter().map(|e| self.register(e)).collect())
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.element(element)?
            .click()
            .await
            .map_err(|e| driver_error(e, element.id()))
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.element(element)?
            .send_keys(text)
            .await
            .map_err(|e| driver_error(e, element.id()))
    }

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        self.element(element)?
            .clear()
            .await
            .map_err(|e| driver_error(e, element.id()))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.element(element)?
            .is_displayed()
            .await
            .map_err(|e| driver_error(e, element.id()))
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        self.element(element)?
            .text()
            .await
            .map_err(|e| driver_error(e, element.id()))
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        self.element(element)?
            .attr(name)
            .await
            .map_err(|e| driver_error(e, element.id()))
    }

    async fn capture_screenshot(&self) -> DriverResult<CapturedImage> {
        let png = self
            .driver
            .screenshot_as_png()
            .await
            .map_err(|e| driver_error(e, "screenshot"))?;
        CapturedImage::from_png(png).map_err(|e| DriverError::Decode(e.to_string()))
    }

    async fn perform_gesture(&self, gesture: &Gesture) -> DriverResult<()> {
        debug!("Performing {} gesture", gesture.kind());
        match gesture {
            Gesture::Tap { at, taps: 2, .. } => self
                .driver
                .action_chain()
                .move_to(at.x, at.y)
                .double_click()
                .perform()
                .await
                .map_err(|e| driver_error(e, "double tap")),
            Gesture::Tap { at, hold, taps } => {
                for _ in 0..(*taps).max(1) {
                    self.press(*at, *hold).await?;
                }
                Ok(())
            }
            Gesture::Swipe { from, to, duration } => self.swipe(*from, *to, *duration).await,
            Gesture::Pinch {
                center,
                from_distance,
                to_distance,
                duration,
            } => {
                let actions = pinch_actions(*center, *from_distance, *to_distance, *duration);
                self.driver
                    .cmd(Command::ExtensionCommand(Box::new(TouchActions(actions))))
                    .await
                    .map_err(|e| driver_error(e, gesture.kind()))?;
                Ok(())
            }
        }
    }

    async fn execute(&self, command: &BrowserCommand) -> DriverResult<Value> {
        let context = command.name();
        match command {
            BrowserCommand::Back => self.driver.back().await.map(|_| Value::Null),
            BrowserCommand::Forward => self.driver.forward().await.map(|_| Value::Null),
            BrowserCommand::Refresh => self.driver.refresh().await.map(|_| Value::Null),
            BrowserCommand::Script { source, args } => self
                .driver
                .execute(source, args.clone())
                .await
                .map(|ret| ret.json().clone()),
        }
        .map_err(|e| driver_error(e, context))
    }

    async fn quit(&self) -> DriverResult<()> {
        self.elements.lock().clear();
        self.driver
            .clone()
            .quit()
            .await
            .map_err(|e| driver_error(e, "quit"))?;
        info!("WebDriver session ended");
        Ok(())
    }
}

/// Maps a WebDriver failure onto the driver error the harness reasons about.
/// `context` is the selector or operation the request was about.
fn driver_error(err: WebDriverError, context: &str) -> DriverError {
    match err {
        WebDriverError::NoSuchElement(_) | WebDriverError::StaleElementReference(_) => {
            DriverError::ElementNotFound {
                selector: context.to_string(),
            }
        }
        WebDriverError::InvalidSessionId(info) | WebDriverError::SessionNotCreated(info) => {
            DriverError::SessionLost(info.to_string())
        }
        WebDriverError::Timeout(_) | WebDriverError::ScriptTimeout(_) => DriverError::Timeout {
            condition: context.to_string(),
            timeout: Duration::ZERO,
        },
        other => DriverError::Protocol(other.to_string()),
    }
}

/// Two touch pointers placed horizontally around `center`.
pub fn pinch_actions(center: Point, from_distance: i64, to_distance: i64, duration: Duration) -> Value {
    let finger = |id: &str, sign: i64| {
        let start = Point::new(center.x + sign * from_distance / 2, center.y);
        let end = Point::new(center.x + sign * to_distance / 2, center.y);
        json!({
            "type": "pointer",
            "id": id,
            "parameters": { "pointerType": "touch" },
            "actions": [
                { "type": "pointerMove", "duration": 0, "origin": "viewport", "x": start.x, "y": start.y },
                { "type": "pointerDown", "button": 0 },
                {
                    "type": "pointerMove",
                    "duration": duration.as_millis() as u64,
                    "origin": "viewport",
                    "x": end.x,
                    "y": end.y,
                },
                { "type": "pointerUp", "button": 0 },
            ],
        })
    };

    json!({ "actions": [finger("finger1", -1), finger("finger2", 1)] })
}

/// Capabilities for one session: browser, window, emulation, proxy, locale.
pub fn capabilities(config: &HarnessConfig, options: &ScenarioOptions) -> Capabilities {
    let viewport = options.emulation.map(|e| e.viewport()).unwrap_or(config.viewport);
    let lang = options.country_code.as_deref().map(|cc| format!("en-{}", cc.to_uppercase()));

    let mut caps = Capabilities::new();
    match config.browser {
        Browser::Chrome => {
            let mut args = vec![format!("--window-size={},{}", viewport.width, viewport.height)];
            if config.headless {
                args.push("--headless=new".to_string());
            }
            if let Some(lang) = &lang {
                args.push(format!("--lang={}", lang));
            }
            let mut chrome = json!({ "args": args });
            if let Some(emulation) = options.emulation {
                chrome["mobileEmulation"] = json!({ "deviceName": emulation.device_name() });
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), chrome);
        }
        Browser::Firefox => {
            let mut args = vec![
                "-width".to_string(),
                viewport.width.to_string(),
                "-height".to_string(),
                viewport.height.to_string(),
            ];
            if config.headless {
                args.push("-headless".to_string());
            }
            let mut firefox = json!({ "args": args });
            if let Some(lang) = &lang {
                firefox["prefs"] = json!({ "intl.accept_languages": lang });
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), firefox);
        }
    }

    if let Some(proxy) = &options.proxy {
        caps.insert(
            "proxy".to_string(),
            json!({
                "proxyType": "manual",
                "httpProxy": proxy.http_proxy,
                "sslProxy": proxy.ssl_proxy.as_deref().unwrap_or(&proxy.http_proxy),
                "noProxy": proxy.no_proxy,
            }),
        );
    }

    caps
}

/// Opens one WebDriver session per scenario.
pub struct WebDriverFactory {
    config: HarnessConfig,
}

impl WebDriverFactory {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Polls `GET /status` until the endpoint reports ready.
    pub async fn wait_until_ready(&self) -> DriverResult<()> {
        let timeout = Duration::from_millis(self.config.webdriver_ready_timeout_ms);
        let status_url = format!("{}/status", self.config.webdriver_url.trim_end_matches('/'));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: Value = resp.json().await.unwrap_or(Value::Null);
                    let ready = body
                        .pointer("/value/ready")
                        .and_then(Value::as_bool)
                        .unwrap_or(true);
                    if ready {
                        info!("WebDriver endpoint ready at {}", self.config.webdriver_url);
                        return Ok(());
                    }
                }
                Ok(resp) => {
                    warn!("Status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver endpoint...");
                    }
                    if !e.is_connect() {
                        warn!("Status check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(DriverError::Timeout {
            condition: format!("WebDriver endpoint {} ready ({} attempts)", status_url, attempts),
            timeout,
        })
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn open(&self, options: &ScenarioOptions) -> DriverResult<Session> {
        let caps = capabilities(&self.config, options);
        debug!("Requesting session with {:?}", caps);
        let client = WebDriverClient::connect(&self.config.webdriver_url, caps).await?;

        let profile = SessionProfile {
            viewport: options.emulation.map(|e| e.viewport()).unwrap_or(self.config.viewport),
            emulation: options.emulation,
            proxy: options.proxy.clone(),
            country_code: options.country_code.clone(),
        };
        Ok(Session::new(Box::new(client), profile, self.config.wait_config()))
    }
}
