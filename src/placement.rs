use log::{debug, info};

use crate::context::ApplicationContext;
use crate::host::{MonitorInfo, PanelHost};

/// Moves the panel window between attached monitors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayPlacement;

impl DisplayPlacement {
    /// Index of the monitor after the one at `current`, wrapping around. An unknown
    /// origin counts as the first monitor. `None` with fewer than two monitors.
    pub fn next_monitor(monitors: &[MonitorInfo], current: (i32, i32)) -> Option<usize> {
        if monitors.len() < 2 {
            return None;
        }
        let index = monitors
            .iter()
            .position(|monitor| monitor.origin() == current)
            .unwrap_or(0);
        Some((index + 1) % monitors.len())
    }

    /// Moves the window to the next monitor. Returns false when there is nowhere to go.
    pub fn switch_monitor(&self, ctx: &mut ApplicationContext, host: &mut dyn PanelHost) -> bool {
        let monitors = host.monitors();
        let Some(next) = Self::next_monitor(&monitors, ctx.origin()) else {
            debug!("Monitor switch ignored, {} monitor(s) attached", monitors.len());
            return false;
        };
        let origin = monitors[next].origin();
        ctx.set_origin(origin);
        host.move_window(origin);
        info!("Moved display to monitor {next} at {origin:?}");
        true
    }

    /// Puts the window back on a saved monitor, provided that monitor is still attached.
    pub fn restore(
        &self,
        ctx: &mut ApplicationContext,
        host: &mut dyn PanelHost,
        saved: Option<(i32, i32)>,
    ) -> bool {
        let Some(origin) = saved else {
            return false;
        };
        if origin == ctx.origin() {
            return false;
        }
        if !host.monitors().iter().any(|m| m.origin() == origin) {
            debug!("Saved display origin {origin:?} no longer attached");
            return false;
        }
        ctx.set_origin(origin);
        host.move_window(origin);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeHost;

    #[test]
    fn two_monitors_toggle_back_and_forth() {
        let mut host = FakeHost::new(&[(0, 0), (1920, 0)]);
        let mut ctx = ApplicationContext::default();

        assert!(DisplayPlacement.switch_monitor(&mut ctx, &mut host));
        assert_eq!(ctx.origin(), (1920, 0));
        assert!(DisplayPlacement.switch_monitor(&mut ctx, &mut host));
        assert_eq!(ctx.origin(), (0, 0));
        assert_eq!(host.moves, [(1920, 0), (0, 0)]);
    }

    #[test]
    fn advances_from_any_monitor_with_wrap_around() {
        let monitors: Vec<_> = [(0, 0), (1920, 0), (3840, 0), (0, 1080)]
            .iter()
            .map(|&(x, y)| MonitorInfo::new(x, y))
            .collect();
        for (k, monitor) in monitors.iter().enumerate() {
            assert_eq!(
                DisplayPlacement::next_monitor(&monitors, monitor.origin()),
                Some((k + 1) % monitors.len())
            );
        }
    }

    #[test]
    fn unknown_origin_counts_as_first_monitor() {
        let monitors = [MonitorInfo::new(0, 0), MonitorInfo::new(1920, 0), MonitorInfo::new(3840, 0)];
        assert_eq!(DisplayPlacement::next_monitor(&monitors, (77, 77)), Some(1));
    }

    #[test]
    fn single_monitor_is_a_no_op_every_time() {
        let mut host = FakeHost::new(&[(0, 0)]);
        let mut ctx = ApplicationContext::default();
        ctx.set_origin((10, 20));

        assert!(!DisplayPlacement.switch_monitor(&mut ctx, &mut host));
        assert!(!DisplayPlacement.switch_monitor(&mut ctx, &mut host));
        assert_eq!(ctx.origin(), (10, 20));
        assert!(host.moves.is_empty());

        let mut none = FakeHost::new(&[]);
        assert!(!DisplayPlacement.switch_monitor(&mut ctx, &mut none));
    }

    #[test]
    fn restore_only_targets_attached_monitors() {
        let mut host = FakeHost::new(&[(0, 0), (1920, 0)]);
        let mut ctx = ApplicationContext::default();

        assert!(!DisplayPlacement.restore(&mut ctx, &mut host, Some((5000, 0))));
        assert!(!DisplayPlacement.restore(&mut ctx, &mut host, None));
        assert!(DisplayPlacement.restore(&mut ctx, &mut host, Some((1920, 0))));
        assert_eq!(ctx.origin(), (1920, 0));
        assert_eq!(host.moves, [(1920, 0)]);
    }
}
