//! Browser sessions
//!
//! A [`Session`] is one live browser connection, owned by exactly one running
//! scenario. Page objects borrow it, so none can outlive [`Session::close`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{EmulationProfile, ProxyProfile, Viewport};
use crate::driver::CapabilityDriver;
use crate::error::DriverResult;
use crate::scenario::ScenarioOptions;
use crate::wait::WaitConfig;

/// Capabilities a session was opened with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    pub viewport: Viewport,
    pub emulation: Option<EmulationProfile>,
    pub proxy: Option<ProxyProfile>,
    pub country_code: Option<String>,
}

pub struct Session {
    id: Uuid,
    driver: Box<dyn CapabilityDriver>,
    profile: SessionProfile,
    wait: WaitConfig,
    epoch: AtomicU64,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub fn new(driver: Box<dyn CapabilityDriver>, profile: SessionProfile, wait: WaitConfig) -> Self {
        let id = Uuid::new_v4();
        debug!("Session {} opened ({:?})", id, profile);
        Self {
            id,
            driver,
            profile,
            wait,
            epoch: AtomicU64::new(0),
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn driver(&self) -> &dyn CapabilityDriver {
        self.driver.as_ref()
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn viewport(&self) -> Viewport {
        self.profile.viewport
    }

    pub fn wait_config(&self) -> WaitConfig {
        self.wait
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Navigation generation; page objects remember the one they were built in.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Invalidates every page object created so far and returns the new epoch.
    pub fn advance_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Navigate and start a new epoch.
    pub async fn navigate(&self, url: &str) -> DriverResult<()> {
        debug!("Session {} navigating to {}", self.id, url);
        self.driver.navigate(url).await?;
        self.advance_epoch();
        Ok(())
    }

    pub async fn current_url(&self) -> DriverResult<String> {
        self.driver.current_url().await
    }

    /// Ends the browser session. Consumes the session so no page object can
    /// be used afterwards.
    pub async fn close(self) -> DriverResult<()> {
        info!("Closing session {}", self.id);
        self.driver.quit().await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("profile", &self.profile)
            .field("epoch", &self.epoch())
            .finish()
    }
}

/// Opens a fresh session for each scenario.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, options: &ScenarioOptions) -> DriverResult<Session>;
}
