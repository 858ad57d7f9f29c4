//! On-screen list for adjusting instrument placement (arranging) or simulated variable
//! values (simulating).

use crate::canvas::{Align, Canvas, Color};
use crate::context::{ApplicationContext, Mode};
use crate::instrument::{InstrumentRegistry, Placement, MIN_SIZE};
use crate::interaction::Key;
use crate::simvars::SimVars;

const BIG_STEP: i64 = 10;
const LINE_HEIGHT: i32 = 22;
const FONT_SIZE: f32 = 18.0;
const TEXT_COLOR: Color = Color::new(0xc0, 0xc0, 0xc0);
const SELECTED_COLOR: Color = Color::new(0xff, 0xd0, 0x40);

/// What the inspector edits.
pub struct Inspected<'a> {
    pub instruments: &'a mut InstrumentRegistry,
    pub vars: &'a mut SimVars,
}

pub trait Inspector {
    /// Forgets the current selection, called when leaving an interactive mode.
    fn clear(&mut self);

    fn key_pressed(&mut self, key: Key, ctx: &ApplicationContext, target: Inspected<'_>);

    fn view(
        &self,
        canvas: &mut Canvas<'_>,
        ctx: &ApplicationContext,
        instruments: &InstrumentRegistry,
        vars: &SimVars,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    X,
    Y,
    Size,
}

const FIELDS: [Field; 3] = [Field::X, Field::Y, Field::Size];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::X => "x",
            Field::Y => "y",
            Field::Size => "size",
        }
    }

    fn get(self, placement: &Placement) -> i32 {
        match self {
            Field::X => placement.x,
            Field::Y => placement.y,
            Field::Size => placement.size,
        }
    }

    fn adjust(self, placement: &mut Placement, delta: i32) {
        match self {
            Field::X => placement.x += delta,
            Field::Y => placement.y += delta,
            Field::Size => placement.size = (placement.size + delta).max(MIN_SIZE),
        }
    }
}

/// Up/Down walks the list, Left/Right adjusts by one step, numpad Left/Right by ten.
#[derive(Debug, Clone, Default)]
pub struct VariableInspector {
    selected: usize,
}

impl VariableInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn entries(mode: Mode, instruments: &InstrumentRegistry, vars: &SimVars) -> usize {
        match mode {
            Mode::Arranging => instruments.len() * FIELDS.len(),
            Mode::Simulating => vars.variables().iter().filter(|v| v.writable).count(),
            Mode::Normal => 0,
        }
    }

    fn lines(&self, mode: Mode, instruments: &InstrumentRegistry, vars: &SimVars) -> Vec<String> {
        match mode {
            Mode::Arranging => instruments
                .iter()
                .flat_map(|instrument| {
                    let placement = instrument.placement();
                    FIELDS.into_iter().map(move |field| {
                        format!(
                            "{} {}: {}",
                            instrument.name(),
                            field.label(),
                            field.get(&placement)
                        )
                    })
                })
                .collect(),
            Mode::Simulating => vars
                .variables()
                .iter()
                .filter(|v| v.writable)
                .map(|v| format!("{}: {}: {}", v.group, v.name, vars.simulated(v.address)))
                .collect(),
            Mode::Normal => Vec::new(),
        }
    }
}

impl Inspector for VariableInspector {
    fn clear(&mut self) {
        self.selected = 0;
    }

    fn key_pressed(&mut self, key: Key, ctx: &ApplicationContext, target: Inspected<'_>) {
        let count = Self::entries(ctx.mode, target.instruments, target.vars);
        if count == 0 {
            return;
        }
        self.selected %= count;

        let delta = match key {
            Key::Up => {
                self.selected = (self.selected + count - 1) % count;
                return;
            }
            Key::Down => {
                self.selected = (self.selected + 1) % count;
                return;
            }
            Key::Left => -1,
            Key::Right => 1,
            Key::NumpadLeft => -BIG_STEP,
            Key::NumpadRight => BIG_STEP,
            _ => return,
        };

        match ctx.mode {
            Mode::Arranging => {
                let field = FIELDS[self.selected % FIELDS.len()];
                if let Some(instrument) = target.instruments.get_mut(self.selected / FIELDS.len()) {
                    let mut placement = instrument.placement();
                    field.adjust(&mut placement, delta as i32);
                    instrument.set_placement(placement);
                }
            }
            Mode::Simulating => {
                let address = target
                    .vars
                    .variables()
                    .iter()
                    .filter(|v| v.writable)
                    .nth(self.selected)
                    .map(|v| v.address);
                if let Some(address) = address {
                    target.vars.adjust(address, delta);
                }
            }
            Mode::Normal => {}
        }
    }

    fn view(
        &self,
        canvas: &mut Canvas<'_>,
        ctx: &ApplicationContext,
        instruments: &InstrumentRegistry,
        vars: &SimVars,
    ) {
        let title = match ctx.mode {
            Mode::Arranging => "ARRANGE INSTRUMENTS",
            Mode::Simulating => "SIMULATE VARIABLES",
            Mode::Normal => return,
        };
        let lines = self.lines(ctx.mode, instruments, vars);
        let selected = if lines.is_empty() {
            usize::MAX
        } else {
            self.selected % lines.len()
        };

        canvas.text(10, 20, title, FONT_SIZE, Color::WHITE, Align::Left);
        for (i, line) in lines.iter().enumerate() {
            let (marker, color) = if i == selected {
                ("> ", SELECTED_COLOR)
            } else {
                ("  ", TEXT_COLOR)
            };
            let y = 20 + LINE_HEIGHT * (i as i32 + 1);
            canvas.text(10, y, &format!("{marker}{line}"), FONT_SIZE, color, Align::Left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{CommonVariable, DemoBridge, VariableBridge};
    use crate::instrument::testing::{CallLog, Recorder};

    fn setup() -> (InstrumentRegistry, SimVars) {
        let log = CallLog::default();
        let mut vars = SimVars::new(Box::new(DemoBridge::new()));
        vars.register_variable(CommonVariable::new("Common", "Electrics", 1, true, 1, 0));
        vars.register_variable(CommonVariable::new("Common", "APU", 2, false, 1, 1));
        vars.register_variable(CommonVariable::new("Speed", "IAS", 3, true, 4, 2).with_step(128));
        let mut instruments = InstrumentRegistry::new();
        instruments.add(Recorder::boxed("a", &log), &mut vars);
        instruments.add(Recorder::boxed("b", &log), &mut vars);
        (instruments, vars)
    }

    fn press(
        inspector: &mut VariableInspector,
        key: Key,
        ctx: &ApplicationContext,
        instruments: &mut InstrumentRegistry,
        vars: &mut SimVars,
    ) {
        inspector.key_pressed(key, ctx, Inspected { instruments, vars });
    }

    #[test]
    fn arranging_moves_the_selected_field() {
        let (mut instruments, mut vars) = setup();
        let mut ctx = ApplicationContext::default();
        ctx.set_arranging(true);
        let mut inspector = VariableInspector::new();

        // a.x -> a.y -> a.size -> b.x
        for _ in 0..3 {
            press(&mut inspector, Key::Down, &ctx, &mut instruments, &mut vars);
        }
        press(&mut inspector, Key::Right, &ctx, &mut instruments, &mut vars);
        press(&mut inspector, Key::NumpadRight, &ctx, &mut instruments, &mut vars);
        assert_eq!(instruments.get(1).unwrap().placement(), Placement::new(11, 0, 100));

        press(&mut inspector, Key::Up, &ctx, &mut instruments, &mut vars);
        for _ in 0..10 {
            press(&mut inspector, Key::NumpadLeft, &ctx, &mut instruments, &mut vars);
        }
        assert_eq!(instruments.get(0).unwrap().placement().size, MIN_SIZE);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let (mut instruments, mut vars) = setup();
        let mut ctx = ApplicationContext::default();
        ctx.set_arranging(true);
        let mut inspector = VariableInspector::new();

        press(&mut inspector, Key::Up, &ctx, &mut instruments, &mut vars);
        assert_eq!(inspector.selected(), 5);
        press(&mut inspector, Key::Down, &ctx, &mut instruments, &mut vars);
        assert_eq!(inspector.selected(), 0);
    }

    #[test]
    fn simulating_adjusts_writable_variables_only() {
        let (mut instruments, mut vars) = setup();
        let mut ctx = ApplicationContext::default();
        ctx.set_simulating(true);
        let mut inspector = VariableInspector::new();

        // Electrics, then IAS; the read-only APU is skipped
        press(&mut inspector, Key::Down, &ctx, &mut instruments, &mut vars);
        press(&mut inspector, Key::Right, &ctx, &mut instruments, &mut vars);
        assert_eq!(vars.simulated(3), 128);
        assert_eq!(vars.simulated(2), 0);

        press(&mut inspector, Key::Down, &ctx, &mut instruments, &mut vars);
        press(&mut inspector, Key::Left, &ctx, &mut instruments, &mut vars);
        assert_eq!(vars.simulated(1), -1);
    }

    #[test]
    fn clear_resets_the_selection() {
        let (mut instruments, mut vars) = setup();
        let mut ctx = ApplicationContext::default();
        ctx.set_simulating(true);
        let mut inspector = VariableInspector::new();
        press(&mut inspector, Key::Down, &ctx, &mut instruments, &mut vars);
        inspector.clear();
        assert_eq!(inspector.selected(), 0);
    }

    #[test]
    fn other_keys_and_normal_mode_change_nothing() {
        let (mut instruments, mut vars) = setup();
        let ctx = ApplicationContext::default();
        let mut inspector = VariableInspector::new();
        press(&mut inspector, Key::Right, &ctx, &mut instruments, &mut vars);
        press(&mut inspector, Key::Down, &ctx, &mut instruments, &mut vars);
        assert_eq!(inspector.selected(), 0);
        assert_eq!(instruments.get(0).unwrap().placement(), Placement::new(0, 0, 100));
    }

    #[test]
    fn lines_describe_the_current_mode() {
        let (instruments, vars) = setup();
        let inspector = VariableInspector::new();
        let lines = inspector.lines(Mode::Simulating, &instruments, &vars);
        assert_eq!(lines, ["Common: Electrics: 0", "Speed: IAS: 0"]);
        let lines = inspector.lines(Mode::Arranging, &instruments, &vars);
        assert_eq!(lines[5], "b size: 100");
    }
}
