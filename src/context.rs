/// Interactive mode of the panel. Arranging and simulating are exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Repositioning and resizing instruments
    Arranging,
    /// Feeding instruments with edited values instead of live ones
    Simulating,
}

/// The single process-wide application state.
///
/// Owned by the scheduler; every other component borrows it.
#[derive(Debug, Clone)]
pub struct ApplicationContext {
    pub display_width: u32,
    pub display_height: u32,
    pub display_x: i32,
    pub display_y: i32,
    pub connected: bool,
    pub electrics: bool,
    pub external_controls: bool,
    /// Drawn at the bottom of the panel while non-empty
    pub error: String,
    pub mode: Mode,
    pub shadows_enabled: bool,
    /// Debug aid, instruments may show raw values while set
    pub tweak: bool,
}

impl ApplicationContext {
    pub fn new(display_width: u32, display_height: u32) -> Self {
        Self {
            display_width,
            display_height,
            display_x: 0,
            display_y: 0,
            connected: false,
            electrics: true,
            external_controls: true,
            error: String::new(),
            mode: Mode::Normal,
            shadows_enabled: true,
            tweak: false,
        }
    }

    pub fn arranging(&self) -> bool {
        self.mode == Mode::Arranging
    }

    pub fn simulating(&self) -> bool {
        self.mode == Mode::Simulating
    }

    /// True while either interactive mode is active.
    pub fn inspecting(&self) -> bool {
        self.mode != Mode::Normal
    }

    /// Turning arranging on forces simulating off.
    pub fn set_arranging(&mut self, on: bool) {
        match (on, self.mode) {
            (true, _) => self.mode = Mode::Arranging,
            (false, Mode::Arranging) => self.mode = Mode::Normal,
            (false, _) => {}
        }
    }

    /// Turning simulating on forces arranging off.
    pub fn set_simulating(&mut self, on: bool) {
        match (on, self.mode) {
            (true, _) => self.mode = Mode::Simulating,
            (false, Mode::Simulating) => self.mode = Mode::Normal,
            (false, _) => {}
        }
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.display_x, self.display_y)
    }

    pub fn set_origin(&mut self, (x, y): (i32, i32)) {
        self.display_x = x;
        self.display_y = y;
    }
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_are_exclusive() {
        let mut ctx = ApplicationContext::default();
        ctx.set_simulating(true);
        ctx.set_arranging(true);
        assert!(ctx.arranging());
        assert!(!ctx.simulating());

        ctx.set_simulating(true);
        assert!(ctx.simulating());
        assert!(!ctx.arranging());
    }

    #[test]
    fn clearing_an_inactive_mode_keeps_the_active_one() {
        let mut ctx = ApplicationContext::default();
        ctx.set_simulating(true);
        ctx.set_arranging(false);
        assert_eq!(ctx.mode, Mode::Simulating);
        ctx.set_simulating(false);
        assert_eq!(ctx.mode, Mode::Normal);
        assert!(!ctx.inspecting());
    }
}
