//! In-memory driver for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::driver::{BrowserCommand, CapabilityDriver, ElementHandle, Gesture};
use crate::error::{DriverError, DriverResult};
use crate::scenario::ScenarioOptions;
use crate::session::{Session, SessionFactory, SessionProfile};
use crate::visual::CapturedImage;
use crate::wait::WaitConfig;

#[derive(Debug, Clone)]
struct StubElement {
    text: String,
    displayed: bool,
}

/// Elements are keyed by their selector path: `"root"` for top-level lookups
/// and `"root child"` for lookups relative to `root`.
#[derive(Clone, Default)]
pub struct StubDriver {
    elements: Arc<Mutex<HashMap<String, StubElement>>>,
    url: Arc<Mutex<String>>,
    clicks: Arc<Mutex<Vec<String>>>,
    quits: Arc<AtomicUsize>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, path: &str, text: &str, displayed: bool) -> Self {
        self.set_element(path, text, displayed);
        self
    }

    pub fn set_element(&self, path: &str, text: &str, displayed: bool) {
        self.elements.lock().insert(
            path.to_string(),
            StubElement { text: text.to_string(), displayed },
        );
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().clone()
    }

    pub fn quit_counter(&self) -> Arc<AtomicUsize> {
        self.quits.clone()
    }

    fn lookup(&self, path: &str) -> DriverResult<ElementHandle> {
        if self.elements.lock().contains_key(path) {
            Ok(ElementHandle::new(path))
        } else {
            Err(DriverError::ElementNotFound { selector: path.to_string() })
        }
    }

    fn element(&self, handle: &ElementHandle) -> DriverResult<StubElement> {
        self.elements
            .lock()
            .get(handle.id())
            .cloned()
            .ok_or_else(|| DriverError::ElementNotFound { selector: handle.id().to_string() })
    }
}

#[async_trait]
impl CapabilityDriver for StubDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        *self.url.lock() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.url.lock().clone())
    }

    async fn find_element(&self, selector: &str) -> DriverResult<ElementHandle> {
        self.lookup(selector)
    }

    async fn find_elements(&self, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        Ok(self.lookup(selector).into_iter().collect())
    }

    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> DriverResult<ElementHandle> {
        self.lookup(&format!("{} {}", parent.id(), selector))
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> DriverResult<Vec<ElementHandle>> {
        Ok(self.lookup(&format!("{} {}", parent.id(), selector)).into_iter().collect())
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.element(element)?;
        self.clicks.lock().push(element.id().to_string());
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.element(element)?;
        if let Some(el) = self.elements.lock().get_mut(element.id()) {
            el.text.push_str(text);
        }
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        if let Some(el) = self.elements.lock().get_mut(element.id()) {
            el.text.clear();
        }
        Ok(())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.element(element)?.displayed)
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        Ok(self.element(element)?.text)
    }

    async fn attribute(&self, element: &ElementHandle, _name: &str) -> DriverResult<Option<String>> {
        self.element(element)?;
        Ok(None)
    }

    async fn capture_screenshot(&self) -> DriverResult<CapturedImage> {
        CapturedImage::from_rgba(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])))
            .map_err(|e| DriverError::Decode(e.to_string()))
    }

    async fn perform_gesture(&self, _gesture: &Gesture) -> DriverResult<()> {
        Ok(())
    }

    async fn execute(&self, _command: &BrowserCommand) -> DriverResult<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn quit(&self) -> DriverResult<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out sessions backed by clones of one [`StubDriver`].
pub struct StubFactory {
    pub driver: StubDriver,
    pub opened: AtomicUsize,
    pub wait: WaitConfig,
    pub fail_open: bool,
}

impl StubFactory {
    pub fn new(driver: StubDriver) -> Self {
        Self {
            driver,
            opened: AtomicUsize::new(0),
            wait: WaitConfig::new(
                std::time::Duration::from_millis(50),
                std::time::Duration::from_millis(5),
            ),
            fail_open: false,
        }
    }
}

#[async_trait]
impl SessionFactory for StubFactory {
    async fn open(&self, options: &ScenarioOptions) -> DriverResult<Session> {
        if self.fail_open {
            return Err(DriverError::SessionLost("endpoint refused session".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let profile = SessionProfile {
            viewport: options.emulation.map(|e| e.viewport()).unwrap_or_default(),
            emulation: options.emulation,
            proxy: options.proxy.clone(),
            country_code: options.country_code.clone(),
        };
        Ok(Session::new(Box::new(self.driver.clone()), profile, self.wait))
    }
}
