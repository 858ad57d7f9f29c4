//! Fixed-rate update loop with coalesced rendering.
//!
//! Every tick updates the common state and then each instrument, and marks a redraw as
//! pending. The frame is only drawn once the event queue is observed empty, so a burst of
//! events between two ticks costs a single render.

use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::bridge::{BridgeError, VariableBridge};
use crate::canvas::{Align, Color};
use crate::common::CommonStateAggregator;
use crate::context::{ApplicationContext, Mode};
use crate::error::PanelError;
use crate::host::PanelHost;
use crate::inspector::{Inspected, Inspector, VariableInspector};
use crate::instrument::{Instrument, InstrumentRegistry};
use crate::interaction::{Flow, InteractionController, Key};
use crate::settings::PanelSettings;
use crate::simvars::SimVars;

pub const DEFAULT_TICK_RATE: f64 = 30.0;
/// Tick rates outside this range are clamped into it
pub const MIN_TICK_RATE: f64 = 1.0;
pub const MAX_TICK_RATE: f64 = 1000.0;

const ERROR_COLOR: Color = Color::new(0x50, 0x50, 0x50);
const ERROR_SIZE: f32 = 20.0;
const ERROR_MARGIN: i32 = 30;

/// Everything the loop reacts to, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    Tick,
    Key(Key),
    Close,
}

/// Ordered source of panel events.
pub trait EventQueue {
    /// Blocks until the next event. `None` once the source is exhausted.
    fn wait_event(&mut self) -> Option<PanelEvent>;

    fn is_empty(&self) -> bool;
}

/// Strictly periodic deadlines. A late tick does not shift the ones after it.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    period: Duration,
    deadline: Instant,
}

impl TickClock {
    pub fn new(rate: f64, now: Instant) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE)
        } else {
            DEFAULT_TICK_RATE
        };
        let period = Duration::from_secs_f64(1.0 / rate);
        Self {
            period,
            deadline: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// True when a tick is due at `now`; the deadline then moves one period on.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.deadline {
            return false;
        }
        self.deadline += self.period;
        true
    }
}

pub struct FrameScheduler {
    ctx: ApplicationContext,
    instruments: InstrumentRegistry,
    simvars: SimVars,
    aggregator: CommonStateAggregator,
    controller: InteractionController,
    inspector: Box<dyn Inspector>,
    redraw: bool,
    /// Set by the first quit request; later events are dropped
    finished: bool,
    /// Last connection state seen outside of simulation, for transition logging
    link: Option<bool>,
}

impl FrameScheduler {
    /// Takes ownership of the context and registers the common variables on `bridge`.
    pub fn new(ctx: ApplicationContext, bridge: Box<dyn VariableBridge>) -> Self {
        let mut simvars = SimVars::new(bridge);
        let aggregator = CommonStateAggregator;
        aggregator.register(&mut simvars);
        Self {
            ctx,
            instruments: InstrumentRegistry::new(),
            simvars,
            aggregator,
            controller: InteractionController::new(),
            inspector: Box::new(VariableInspector::new()),
            redraw: false,
            finished: false,
            link: None,
        }
    }

    pub fn with_inspector(mut self, inspector: Box<dyn Inspector>) -> Self {
        self.inspector = inspector;
        self
    }

    pub fn add_instrument(&mut self, instrument: Box<dyn Instrument>) {
        self.instruments.add(instrument, &mut self.simvars);
    }

    pub fn ctx(&self) -> &ApplicationContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut ApplicationContext {
        &mut self.ctx
    }

    pub fn instruments(&self) -> &InstrumentRegistry {
        &self.instruments
    }

    pub fn simvars(&self) -> &SimVars {
        &self.simvars
    }

    pub fn simvars_mut(&mut self) -> &mut SimVars {
        &mut self.simvars
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Records the panel's state into `settings` for saving at shutdown.
    pub fn shutdown(&self, settings: &mut PanelSettings) {
        settings.capture(&self.ctx, &self.instruments, &self.simvars);
    }

    /// Startup pass with simulating forced on, so the gauges show the simulated defaults
    /// before anything is read from the simulator.
    pub fn prime(&mut self) {
        let previous = self.ctx.mode;
        self.ctx.mode = Mode::Simulating;
        self.update();
        self.ctx.mode = previous;
        self.simvars.set_simulating(self.ctx.simulating());
        self.redraw = true;
    }

    /// One full update pass: common state first, then every instrument in order.
    pub fn update(&mut self) {
        let simulating = self.ctx.simulating();
        self.simvars.set_simulating(simulating);

        let state = self.aggregator.refresh(&mut self.simvars);
        if !simulating && self.link != Some(state.connected) {
            match &state.failure {
                None => info!("Connected to flight simulator"),
                Some(err) => warn!("Flight simulator unavailable: {err}"),
            }
            self.link = Some(state.connected);
        }

        if state.connected || simulating {
            self.ctx.error.clear();
        } else {
            let failure = state.failure.clone().unwrap_or(BridgeError::NotConnected);
            self.ctx.error = failure.to_string();
        }
        state.apply_to(&mut self.ctx);

        self.instruments.update_all(&self.ctx, &mut self.simvars);
    }

    /// Handles one event. After a quit request every further event is ignored.
    pub fn dispatch(&mut self, event: PanelEvent, host: &mut dyn PanelHost) -> Flow {
        if self.finished {
            return Flow::Quit;
        }
        let flow = match event {
            PanelEvent::Tick => {
                self.update();
                self.redraw = true;
                Flow::Continue
            }
            PanelEvent::Key(key) => self.controller.handle_key(
                key,
                &mut self.ctx,
                host,
                self.inspector.as_mut(),
                Inspected {
                    instruments: &mut self.instruments,
                    vars: &mut self.simvars,
                },
            ),
            PanelEvent::Close => {
                info!("Display closed");
                Flow::Quit
            }
        };
        self.finished = flow == Flow::Quit;
        flow
    }

    /// Renders and presents one frame if a redraw is pending and no events are waiting.
    /// Returns whether a frame was drawn.
    pub fn settle(&mut self, queue_empty: bool, host: &mut dyn PanelHost) -> Result<bool, PanelError> {
        if self.finished || !self.redraw || !queue_empty {
            return Ok(false);
        }
        self.redraw = false;

        {
            let mut canvas = host.canvas();
            canvas.clear(Color::BLACK);
            self.instruments.render_all(&mut canvas, &self.ctx);
            if self.ctx.inspecting() {
                self.inspector
                    .view(&mut canvas, &self.ctx, &self.instruments, &self.simvars);
            }
            if !self.ctx.error.is_empty() {
                let y = canvas.height() as i32 - ERROR_MARGIN;
                canvas.text(10, y, &self.ctx.error, ERROR_SIZE, ERROR_COLOR, Align::Left);
            }
        }
        host.present()?;
        Ok(true)
    }

    /// Runs until a quit request or until `queue` runs dry.
    pub fn run<Q: EventQueue>(&mut self, queue: &mut Q, host: &mut dyn PanelHost) {
        self.prime();
        while let Some(event) = queue.wait_event() {
            if self.dispatch(event, host) == Flow::Quit {
                break;
            }
            if let Err(err) = self.settle(queue.is_empty(), host) {
                error!("{err}");
            }
        }
    }
}
