//! Gauges mounted on the panel.

pub mod dial;

pub use dial::{DialConfig, DialGauge};

use crate::bridge::{Address, CommonVariable, DemoBridge};
use crate::instrument::Placement;

/// IAS in knots * 128
pub const AIRSPEED: Address = 0x02BC;
/// Altitude in feet
pub const ALTITUDE: Address = 0x3324;
/// Vertical speed in metres/second * 256
pub const VERTICAL_SPEED: Address = 0x02C8;

const METRES_PER_SECOND_TO_FPM: f64 = 60.0 * 3.28084;

/// The default panel, left to right.
pub fn standard_panel() -> Vec<DialConfig> {
    vec![
        DialConfig::builder()
            .name("Airspeed")
            .placement(Placement::new(100, 100, 350))
            .variable(
                CommonVariable::new("Airspeed", "Indicated Airspeed", AIRSPEED, true, 4, 10)
                    .with_step(128),
            )
            .scale(1.0 / 128.0)
            .range((0.0, 250.0))
            .units("KNOTS")
            .build(),
        DialConfig::builder()
            .name("Altimeter")
            .placement(Placement::new(500, 100, 350))
            .variable(
                CommonVariable::new("Altimeter", "Altitude", ALTITUDE, true, 4, 20).with_step(10),
            )
            .range((0.0, 10000.0))
            .units("FEET")
            .build(),
        DialConfig::builder()
            .name("Vertical Speed")
            .placement(Placement::new(900, 100, 350))
            .variable(
                CommonVariable::new("Vertical Speed", "Vertical Speed", VERTICAL_SPEED, true, 4, 30)
                    .with_step(33),
            )
            .scale(METRES_PER_SECOND_TO_FPM / 256.0)
            .range((-2000.0, 2000.0))
            .ticks_count(9)
            .units("FT/MIN")
            .build(),
    ]
}

/// Demo provider whose gauge channels wander across each dial's range, starting from zero
/// or the nearest end of the range.
pub fn demo_bridge(panel: &[DialConfig]) -> DemoBridge {
    panel.iter().fold(DemoBridge::new(), |bridge, config| {
        let (min, max) = config.raw_range();
        bridge.with_drift(config.variable.address, 0.0_f64.max(min).min(max), min, max)
    })
}
