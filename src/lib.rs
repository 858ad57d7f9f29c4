//! Simulated aircraft instrument panel.
//!
//! A fixed-rate [`scheduler::FrameScheduler`] reads the common aircraft state and every
//! mounted instrument from a [`bridge::VariableBridge`], and draws the panel into a
//! software frame buffer. Keyboard input switches between normal display, arranging the
//! instruments and simulating their variables.

pub mod bridge;
pub mod canvas;
pub mod common;
pub mod context;
pub mod error;
pub mod gauges;
pub mod host;
pub mod inspector;
pub mod instrument;
pub mod interaction;
pub mod placement;
pub mod scene;
pub mod scheduler;
pub mod settings;
pub mod simvars;
pub mod window;

pub use bridge::{Address, BridgeError, CommonVariable, DemoBridge, RawValue, VariableBridge};
pub use canvas::{Align, Canvas, Color};
pub use common::{CommonState, CommonStateAggregator};
pub use context::{ApplicationContext, Mode};
pub use error::PanelError;
pub use gauges::{DialConfig, DialGauge};
pub use host::{MonitorInfo, PanelHost};
pub use inspector::{Inspector, VariableInspector};
pub use instrument::{Instrument, InstrumentRegistry, Placement};
pub use interaction::{Flow, InteractionController, Key};
pub use placement::DisplayPlacement;
pub use scheduler::{EventQueue, FrameScheduler, PanelEvent, TickClock};
pub use settings::PanelSettings;
pub use simvars::SimVars;
pub use window::WindowOptions;
