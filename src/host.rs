//! Boundary to the graphics and windowing substrate.

use crate::canvas::Canvas;
use crate::error::PanelError;

/// Origin of one attached display, in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub x: i32,
    pub y: i32,
}

impl MonitorInfo {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// What the scheduler needs from the window it draws into.
pub trait PanelHost {
    /// Attached displays, enumerated fresh on every call.
    fn monitors(&self) -> Vec<MonitorInfo>;

    fn move_window(&mut self, origin: (i32, i32));

    /// Drawing surface for the next frame.
    fn canvas(&mut self) -> Canvas<'_>;

    /// Shows the frame drawn since the last present.
    fn present(&mut self) -> Result<(), PanelError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Host with a fixed monitor layout and a small in-memory frame.
    pub struct FakeHost {
        pub monitors: Vec<MonitorInfo>,
        pub moves: Vec<(i32, i32)>,
        pub frame: Vec<u8>,
        pub width: usize,
        pub height: usize,
        pub presented: usize,
    }

    impl FakeHost {
        pub fn new(monitors: &[(i32, i32)]) -> Self {
            let (width, height) = (16, 16);
            Self {
                monitors: monitors.iter().map(|&(x, y)| MonitorInfo::new(x, y)).collect(),
                moves: Vec::new(),
                frame: vec![0; width * height * 4],
                width,
                height,
                presented: 0,
            }
        }
    }

    impl PanelHost for FakeHost {
        fn monitors(&self) -> Vec<MonitorInfo> {
            self.monitors.clone()
        }

        fn move_window(&mut self, origin: (i32, i32)) {
            self.moves.push(origin);
        }

        fn canvas(&mut self) -> Canvas<'_> {
            Canvas::new(&mut self.frame, self.width, self.height)
        }

        fn present(&mut self) -> Result<(), PanelError> {
            self.presented += 1;
            Ok(())
        }
    }
}
