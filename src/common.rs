//! State shared by every instrument: connectivity, electrics, control source.

use crate::bridge::{Address, BridgeError, CommonVariable, VariableBridge};
use crate::context::ApplicationContext;
use crate::simvars::SimVars;

pub const ELECTRICS: Address = 0x0B6A;
pub const APU_STATUS: Address = 0x0B52;
pub const EXTERNAL_CONTROLS: Address = 0x73E0;

const ELECTRICS_OFF: u8 = 1;
const APU_ACTIVE: u8 = 1;
const CONTROLS_EXTERNAL: u16 = 1;

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonState {
    pub connected: bool,
    pub electrics: bool,
    pub external_controls: bool,
    /// First failure seen during the pass
    pub failure: Option<BridgeError>,
}

impl CommonState {
    pub fn apply_to(&self, ctx: &mut ApplicationContext) {
        ctx.connected = self.connected;
        ctx.electrics = self.electrics;
        ctx.external_controls = self.external_controls;
    }
}

/// Reads the common variables each tick and derives the shared flags.
///
/// Each flag keeps its own fallback when its read fails; only `connected` reports the
/// failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonStateAggregator;

impl CommonStateAggregator {
    /// Registers the common variables and seeds their simulated values with a powered,
    /// internally controlled aircraft.
    pub fn register(&self, simvars: &mut SimVars) {
        simvars.register_variable(CommonVariable::new("Common", "Electrics", ELECTRICS, true, 1, 0));
        simvars.register_variable(CommonVariable::new(
            "Common",
            "External Controls",
            EXTERNAL_CONTROLS,
            true,
            2,
            1,
        ));
        simvars.register_variable(CommonVariable::new("Common", "APU Status", APU_STATUS, false, 1, 2));

        simvars.seed_default(ELECTRICS, 0);
        simvars.seed_default(EXTERNAL_CONTROLS, 0);
        simvars.seed_default(APU_STATUS, 0);
    }

    pub fn refresh(&self, vars: &mut dyn VariableBridge) -> CommonState {
        let mut failure = None;
        let mut note = |err: BridgeError| {
            failure.get_or_insert(err);
        };

        let electrics_read = vars.read(ELECTRICS, 1);
        let apu_read = vars.read(APU_STATUS, 1);
        let controls_read = vars.read(EXTERNAL_CONTROLS, 2);
        let commit = vars.commit();

        let mut electrics = true;
        match electrics_read {
            Ok(value) => electrics = value.as_u8() != ELECTRICS_OFF,
            Err(err) => note(err),
        }

        // The APU can power the aircraft on its own
        match apu_read {
            Ok(value) if value.as_u8() == APU_ACTIVE => electrics = true,
            Ok(_) => {}
            Err(err) => note(err),
        }

        let external_controls = match controls_read {
            Ok(value) => value.as_u16() == CONTROLS_EXTERNAL,
            Err(err) => {
                note(err);
                true
            }
        };

        if let Err(err) = commit {
            note(err);
        }

        CommonState {
            connected: failure.is_none(),
            electrics,
            external_controls,
            failure,
        }
    }
}
