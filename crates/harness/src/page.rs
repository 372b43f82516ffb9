//! Page and component object building blocks
//!
//! Concrete page objects compose a [`PageContext`] (or a [`ComponentContext`]
//! for widgets nested in a page) instead of inheriting driver ownership.
//! The context borrows the [`Session`], so the borrow checker rules out use
//! after teardown. The navigation epoch and an explicit hand-over flag rule
//! out mutating through a page object that a later navigation or page
//! transition has superseded.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::driver::{CapabilityDriver, ElementHandle};
use crate::error::{DriverError, DriverResult, HarnessError, HarnessResult};
use crate::session::Session;
use crate::wait::{poll_until, retry_until, wait_for};

/// Anything that wraps a [`PageContext`].
pub trait PageObject<'s> {
    fn context(&self) -> &PageContext<'s>;

    /// Whether this object is still the live view of the page.
    fn is_current(&self) -> bool {
        self.context().is_current()
    }
}

pub struct PageContext<'s> {
    session: &'s Session,
    name: &'static str,
    epoch: u64,
    superseded: AtomicBool,
}

impl<'s> PageContext<'s> {
    /// Bind to the session's current epoch.
    pub fn new(session: &'s Session, name: &'static str) -> Self {
        Self {
            session,
            name,
            epoch: session.epoch(),
            superseded: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn driver(&self) -> &'s dyn CapabilityDriver {
        self.session.driver()
    }

    pub fn is_current(&self) -> bool {
        self.epoch == self.session.epoch() && !self.superseded.load(Ordering::Acquire)
    }

    /// Marks this context as handed over to another page object. Later
    /// state-mutating calls fail with [`HarnessError::StalePageObject`].
    pub fn supersede(&self) {
        debug!("{}: superseded", self.name);
        self.superseded.store(true, Ordering::Release);
    }

    /// Guard for state-mutating calls.
    pub fn ensure_current(&self) -> HarnessResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(HarnessError::StalePageObject { page: self.name.to_string() })
        }
    }

    /// Navigate to `url`; every page object bound to the previous epoch,
    /// including this one, becomes stale.
    pub async fn navigate(&self, url: &str) -> HarnessResult<()> {
        self.ensure_current()?;
        self.session.navigate(url).await?;
        Ok(())
    }

    /// Waits until an element matching `selector` is present.
    pub async fn find(&self, selector: &str) -> HarnessResult<ElementHandle> {
        let driver = self.driver();
        Ok(retry_until(move || driver.find_element(selector), self.session.wait_config()).await?)
    }

    pub async fn find_all(&self, selector: &str) -> HarnessResult<Vec<ElementHandle>> {
        Ok(self.driver().find_elements(selector).await?)
    }

    /// Waits until `selector` is displayed and returns it.
    pub async fn wait_until_visible(&self, selector: &str) -> HarnessResult<ElementHandle> {
        let driver = self.driver();
        wait_for(
            move || visible_now(driver, selector),
            self.session.wait_config(),
            &format!("{} visible on {}", selector, self.name),
        )
        .await?;
        Ok(driver.find_element(selector).await?)
    }

    /// True once `selector` is displayed, false if it never shows up in time.
    pub async fn wait_visible(&self, selector: &str) -> HarnessResult<bool> {
        let driver = self.driver();
        Ok(poll_until(move || visible_now(driver, selector), self.session.wait_config()).await?)
    }

    /// True once `selector` is gone or hidden, false if it stays visible.
    pub async fn wait_hidden(&self, selector: &str) -> HarnessResult<bool> {
        let driver = self.driver();
        Ok(poll_until(
            move || async move { visible_now(driver, selector).await.map(|visible| !visible) },
            self.session.wait_config(),
        )
        .await?)
    }

    /// Single check without waiting.
    pub async fn is_visible_now(&self, selector: &str) -> HarnessResult<bool> {
        Ok(visible_now(self.driver(), selector).await?)
    }

    pub async fn click(&self, selector: &str) -> HarnessResult<()> {
        self.ensure_current()?;
        let element = self.wait_until_visible(selector).await?;
        debug!("{}: click {}", self.name, selector);
        self.driver().click(&element).await?;
        Ok(())
    }

    pub async fn click_element(&self, element: &ElementHandle) -> HarnessResult<()> {
        self.ensure_current()?;
        self.driver().click(element).await?;
        Ok(())
    }

    pub async fn type_into(&self, selector: &str, text: &str) -> HarnessResult<()> {
        self.ensure_current()?;
        let element = self.wait_until_visible(selector).await?;
        debug!("{}: type '{}' into {}", self.name, text, selector);
        self.driver().type_text(&element, text).await?;
        Ok(())
    }

    pub async fn text_of(&self, selector: &str) -> HarnessResult<String> {
        let element = self.find(selector).await?;
        Ok(self.driver().text(&element).await?)
    }

    pub async fn attribute_of(&self, selector: &str, name: &str) -> HarnessResult<Option<String>> {
        let element = self.find(selector).await?;
        Ok(self.driver().attribute(&element, name).await?)
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.session.current_url().await?)
    }
}

/// A page object scoped to a root element. Every lookup is made relative to
/// the root, never globally.
pub struct ComponentContext<'s> {
    page: PageContext<'s>,
    root: &'static str,
}

impl<'s> ComponentContext<'s> {
    pub fn new(session: &'s Session, name: &'static str, root: &'static str) -> Self {
        Self {
            page: PageContext::new(session, name),
            root,
        }
    }

    pub fn page(&self) -> &PageContext<'s> {
        &self.page
    }

    pub fn root_selector(&self) -> &'static str {
        self.root
    }

    fn driver(&self) -> &'s dyn CapabilityDriver {
        self.page.driver()
    }

    fn wait_config(&self) -> crate::wait::WaitConfig {
        self.page.session().wait_config()
    }

    /// True once the root is displayed.
    pub async fn is_open(&self) -> HarnessResult<bool> {
        self.page.wait_visible(self.root).await
    }

    /// True once the root is gone or hidden.
    pub async fn is_closed(&self) -> HarnessResult<bool> {
        self.page.wait_hidden(self.root).await
    }

    /// Resolves the root, failing with an illegal transition if it is not shown.
    pub async fn ensure_open(&self) -> HarnessResult<ElementHandle> {
        self.page.ensure_current()?;
        if !visible_now(self.driver(), self.root).await? {
            return Err(HarnessError::IllegalTransition {
                page: self.page.name().to_string(),
                reason: format!("{} is not open", self.root),
            });
        }
        Ok(self.driver().find_element(self.root).await?)
    }

    /// Waits until `selector` is present under the root.
    pub async fn find(&self, selector: &str) -> HarnessResult<ElementHandle> {
        let driver = self.driver();
        let root = self.root;
        Ok(retry_until(
            move || async move {
                let parent = driver.find_element(root).await?;
                driver.find_child(&parent, selector).await
            },
            self.wait_config(),
        )
        .await?)
    }

    pub async fn find_all(&self, selector: &str) -> HarnessResult<Vec<ElementHandle>> {
        let parent = self.driver().find_element(self.root).await?;
        Ok(self.driver().find_children(&parent, selector).await?)
    }

    /// Waits for a child matching `selector` whose trimmed text equals `text`.
    pub async fn find_by_text(&self, selector: &str, text: &str) -> HarnessResult<ElementHandle> {
        let driver = self.driver();
        let root = self.root;
        let found = retry_until(
            move || async move {
                let parent = driver.find_element(root).await?;
                for child in driver.find_children(&parent, selector).await? {
                    if driver.text(&child).await?.trim() == text {
                        return Ok(child);
                    }
                }
                Err(DriverError::ElementNotFound {
                    selector: format!("{} {} [text={}]", root, selector, text),
                })
            },
            self.wait_config(),
        )
        .await?;
        Ok(found)
    }

    pub async fn wait_visible(&self, selector: &str) -> HarnessResult<bool> {
        let driver = self.driver();
        let root = self.root;
        Ok(poll_until(move || child_visible_now(driver, root, selector), self.wait_config()).await?)
    }

    /// True once no child matching `selector` reads `text`, false if one
    /// still does when the wait runs out.
    pub async fn wait_text_gone(&self, selector: &str, text: &str) -> HarnessResult<bool> {
        let driver = self.driver();
        let root = self.root;
        Ok(poll_until(
            move || async move {
                let parent = match driver.find_element(root).await {
                    Ok(parent) => parent,
                    Err(DriverError::ElementNotFound { .. }) => return Ok(true),
                    Err(e) => return Err(e),
                };
                for child in driver.find_children(&parent, selector).await? {
                    match driver.text(&child).await {
                        Ok(t) if t.trim() == text => return Ok(false),
                        Ok(_) | Err(DriverError::ElementNotFound { .. }) => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(true)
            },
            self.wait_config(),
        )
        .await?)
    }

    pub async fn wait_hidden(&self, selector: &str) -> HarnessResult<bool> {
        let driver = self.driver();
        let root = self.root;
        Ok(poll_until(
            move || async move { child_visible_now(driver, root, selector).await.map(|v| !v) },
            self.wait_config(),
        )
        .await?)
    }

    pub async fn click(&self, selector: &str) -> HarnessResult<()> {
        self.ensure_open().await?;
        let element = self.visible_child(selector).await?;
        debug!("{}: click {} {}", self.page.name(), self.root, selector);
        self.driver().click(&element).await?;
        Ok(())
    }

    pub async fn click_element(&self, element: &ElementHandle) -> HarnessResult<()> {
        self.ensure_open().await?;
        self.driver().click(element).await?;
        Ok(())
    }

    pub async fn type_into(&self, selector: &str, text: &str) -> HarnessResult<()> {
        self.ensure_open().await?;
        let element = self.visible_child(selector).await?;
        debug!("{}: type '{}' into {} {}", self.page.name(), text, self.root, selector);
        self.driver().clear(&element).await?;
        self.driver().type_text(&element, text).await?;
        Ok(())
    }

    pub async fn text_of(&self, selector: &str) -> HarnessResult<String> {
        let element = self.find(selector).await?;
        Ok(self.driver().text(&element).await?)
    }

    pub async fn texts_of(&self, selector: &str) -> HarnessResult<Vec<String>> {
        let mut texts = Vec::new();
        for element in self.find_all(selector).await? {
            texts.push(self.driver().text(&element).await?.trim().to_string());
        }
        Ok(texts)
    }

    pub async fn attribute_of(&self, selector: &str, name: &str) -> HarnessResult<Option<String>> {
        let element = self.find(selector).await?;
        Ok(self.driver().attribute(&element, name).await?)
    }

    async fn visible_child(&self, selector: &str) -> HarnessResult<ElementHandle> {
        let driver = self.driver();
        let root = self.root;
        wait_for(
            move || child_visible_now(driver, root, selector),
            self.wait_config(),
            &format!("{} {} visible", root, selector),
        )
        .await?;
        self.find(selector).await
    }
}

async fn visible_now(driver: &dyn CapabilityDriver, selector: &str) -> DriverResult<bool> {
    match driver.find_element(selector).await {
        Ok(element) => driver.is_displayed(&element).await,
        Err(DriverError::ElementNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

async fn child_visible_now(
    driver: &dyn CapabilityDriver,
    root: &str,
    selector: &str,
) -> DriverResult<bool> {
    let parent = match driver.find_element(root).await {
        Ok(parent) => parent,
        Err(DriverError::ElementNotFound { .. }) => return Ok(false),
        Err(e) => return Err(e),
    };
    match driver.find_child(&parent, selector).await {
        Ok(element) => driver.is_displayed(&element).await,
        Err(DriverError::ElementNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
