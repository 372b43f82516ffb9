//! Touch gestures addressed in viewport percentages

use std::fmt;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;
use wikiqa_harness::{Gesture, HarnessConfig, HarnessResult, Point, ScenarioContext, Session};

/// Hold time of each tap in a double tap
const DOUBLE_TAP_HOLD: Duration = Duration::from_millis(140);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomWay {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Unit step in screen coordinates
    fn unit(self) -> (i64, i64) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

/// Gestures on the current session. Every gesture is followed by a settle
/// pause, scaled by the configured settle factor.
pub struct DeviceTouchActions<'s> {
    session: &'s Session,
    config: &'s HarnessConfig,
}

impl<'s> DeviceTouchActions<'s> {
    pub fn new(ctx: &'s ScenarioContext) -> Self {
        Self {
            session: ctx.session(),
            config: ctx.config(),
        }
    }

    /// Point at `x_pct`/`y_pct` percent of the viewport.
    pub fn point(&self, x_pct: u32, y_pct: u32) -> Point {
        let viewport = self.session.viewport();
        Point::new(
            i64::from(viewport.width) * i64::from(x_pct) / 100,
            i64::from(viewport.height) * i64::from(y_pct) / 100,
        )
    }

    pub async fn tap_on_point(&self, x_pct: u32, y_pct: u32, hold: Duration, settle: Duration) -> HarnessResult<()> {
        let gesture = Gesture::Tap {
            at: self.point(x_pct, y_pct),
            hold,
            taps: 1,
        };
        self.perform(gesture, settle).await
    }

    pub async fn double_tap_on_point(&self, x_pct: u32, y_pct: u32, settle: Duration) -> HarnessResult<()> {
        let gesture = Gesture::Tap {
            at: self.point(x_pct, y_pct),
            hold: DOUBLE_TAP_HOLD,
            taps: 2,
        };
        self.perform(gesture, settle).await
    }

    pub async fn swipe_from_point_to_point(
        &self,
        start_x_pct: u32,
        start_y_pct: u32,
        end_x_pct: u32,
        end_y_pct: u32,
        duration: Duration,
        settle: Duration,
    ) -> HarnessResult<()> {
        let gesture = Gesture::Swipe {
            from: self.point(start_x_pct, start_y_pct),
            to: self.point(end_x_pct, end_y_pct),
            duration,
        };
        self.perform(gesture, settle).await
    }

    /// Two-finger pinch around a point. Fingers start `fingers_space` pixels
    /// apart and each travels `distance` pixels outwards (in) or inwards (out).
    pub async fn zoom_in_out_point(
        &self,
        x_pct: u32,
        y_pct: u32,
        fingers_space: i64,
        distance: i64,
        way: ZoomWay,
        settle: Duration,
    ) -> HarnessResult<()> {
        let (from_distance, to_distance) = match way {
            ZoomWay::In => (fingers_space, fingers_space + 2 * distance),
            ZoomWay::Out => (fingers_space + 2 * distance, fingers_space),
        };
        let gesture = Gesture::Pinch {
            center: self.point(x_pct, y_pct),
            from_distance,
            to_distance,
            duration: Duration::from_millis(300),
        };
        self.perform(gesture, settle).await
    }

    /// Swipe `distance` pixels from the viewport center.
    pub async fn swipe_from_center_to_direction(
        &self,
        direction: Direction,
        distance: i64,
        duration: Duration,
        settle: Duration,
    ) -> HarnessResult<()> {
        let from = self.point(50, 50);
        let (dx, dy) = direction.unit();
        let gesture = Gesture::Swipe {
            from,
            to: Point::new(from.x + dx * distance, from.y + dy * distance),
            duration,
        };
        self.perform(gesture, settle).await
    }

    async fn perform(&self, gesture: Gesture, settle: Duration) -> HarnessResult<()> {
        debug!("{} gesture {:?}", gesture.kind(), gesture);
        self.session.driver().perform_gesture(&gesture).await?;
        let pause = self.config.settle(settle)?;
        if !pause.is_zero() {
            sleep(pause).await;
        }
        Ok(())
    }
}
