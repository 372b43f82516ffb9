//! Capability driver facade
//!
//! The only boundary between the harness and a browser automation backend.
//! Page objects never talk to a backend directly; they go through a
//! [`CapabilityDriver`] owned by the [`Session`](crate::session::Session).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverResult;
use crate::visual::CapturedImage;

/// Opaque reference to an element inside the browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Touch input understood by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// One or more taps at the same point, each held for `hold`
    Tap { at: Point, hold: Duration, taps: u8 },

    /// A single finger dragged from `from` to `to`
    Swipe { from: Point, to: Point, duration: Duration },

    /// Two fingers placed horizontally around `center`, moving from
    /// `from_distance` apart to `to_distance` apart. Spreading zooms in.
    Pinch {
        center: Point,
        from_distance: i64,
        to_distance: i64,
        duration: Duration,
    },
}

impl Gesture {
    pub fn kind(&self) -> &'static str {
        match self {
            Gesture::Tap { taps, .. } if *taps > 1 => "multi-tap",
            Gesture::Tap { .. } => "tap",
            Gesture::Swipe { .. } => "swipe",
            Gesture::Pinch { from_distance, to_distance, .. } if to_distance > from_distance => {
                "pinch-zoom-in"
            }
            Gesture::Pinch { .. } => "pinch-zoom-out",
        }
    }
}

/// Browser-level commands that are not tied to an element.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCommand {
    Back,
    Forward,
    Refresh,
    Script {
        source: String,
        args: Vec<serde_json::Value>,
    },
}

impl BrowserCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserCommand::Back => "back",
            BrowserCommand::Forward => "forward",
            BrowserCommand::Refresh => "refresh",
            BrowserCommand::Script { .. } => "execute",
        }
    }
}

/// Synchronous-in-spirit browser capability surface.
///
/// Every call either completes or fails with a [`DriverError`](crate::error::DriverError);
/// implementations must not swallow failures. Retry policies, if any, live
/// in the implementation rather than in page objects.
#[async_trait]
pub trait CapabilityDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    async fn find_element(&self, selector: &str) -> DriverResult<ElementHandle>;

    async fn find_elements(&self, selector: &str) -> DriverResult<Vec<ElementHandle>>;

    /// Looks up `selector` relative to `parent`.
    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> DriverResult<ElementHandle>;

    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> DriverResult<Vec<ElementHandle>>;

    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    async fn type_text(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()>;

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool>;

    async fn text(&self, element: &ElementHandle) -> DriverResult<String>;

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>>;

    async fn capture_screenshot(&self) -> DriverResult<CapturedImage>;

    async fn perform_gesture(&self, gesture: &Gesture) -> DriverResult<()>;

    async fn execute(&self, command: &BrowserCommand) -> DriverResult<serde_json::Value>;

    /// Ends the backend session. Only [`Session::close`](crate::session::Session::close) calls this.
    async fn quit(&self) -> DriverResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_kind_names() {
        let center = Point::new(180, 320);
        let zoom_in = Gesture::Pinch {
            center,
            from_distance: 50,
            to_distance: 250,
            duration: Duration::from_millis(300),
        };
        let zoom_out = Gesture::Pinch {
            center,
            from_distance: 330,
            to_distance: 50,
            duration: Duration::from_millis(300),
        };
        let double_tap = Gesture::Tap { at: center, hold: Duration::from_millis(140), taps: 2 };

        assert_eq!(zoom_in.kind(), "pinch-zoom-in");
        assert_eq!(zoom_out.kind(), "pinch-zoom-out");
        assert_eq!(double_tap.kind(), "multi-tap");
    }
}
