use log::info;

use crate::context::{ApplicationContext, Mode};
use crate::host::PanelHost;
use crate::inspector::{Inspected, Inspector};
use crate::placement::DisplayPlacement;

/// Keys the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Toggle arranging
    P,
    /// Toggle simulating
    V,
    /// Next monitor
    M,
    /// Toggle shadows
    S,
    /// Toggle tweak
    T,
    Escape,
    Up,
    Down,
    Left,
    Right,
    NumpadLeft,
    NumpadRight,
    Other,
}

/// Whether the scheduler keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Keyboard-driven mode switching.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionController {
    placement: DisplayPlacement,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one key press. While arranging or simulating the key is then also handed
    /// to the inspector, toggle keys included.
    pub fn handle_key(
        &self,
        key: Key,
        ctx: &mut ApplicationContext,
        host: &mut dyn PanelHost,
        inspector: &mut dyn Inspector,
        target: Inspected<'_>,
    ) -> Flow {
        let mut flow = Flow::Continue;
        match key {
            Key::P => self.toggle(Mode::Arranging, ctx, inspector),
            Key::V => self.toggle(Mode::Simulating, ctx, inspector),
            Key::M => {
                self.placement.switch_monitor(ctx, host);
            }
            Key::S => {
                ctx.shadows_enabled = !ctx.shadows_enabled;
                info!("Shadows {}", on_off(ctx.shadows_enabled));
            }
            Key::T => {
                ctx.tweak = !ctx.tweak;
                info!("Tweak {}", on_off(ctx.tweak));
            }
            Key::Escape => {
                info!("Quit requested");
                flow = Flow::Quit;
            }
            _ => {}
        }

        if ctx.inspecting() {
            inspector.key_pressed(key, ctx, target);
        }
        flow
    }

    fn toggle(&self, mode: Mode, ctx: &mut ApplicationContext, inspector: &mut dyn Inspector) {
        let entering = ctx.mode != mode;
        match mode {
            Mode::Arranging => ctx.set_arranging(entering),
            Mode::Simulating => ctx.set_simulating(entering),
            Mode::Normal => return,
        }
        // entering one mode leaves the other without clearing the view
        if !entering {
            inspector.clear();
        }
        info!("Mode is now {:?}", ctx.mode);
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
