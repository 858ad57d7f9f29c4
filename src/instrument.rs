use serde::{Deserialize, Serialize};

use crate::bridge::VariableBridge;
use crate::canvas::Canvas;
use crate::context::ApplicationContext;

/// Smallest size an instrument can be arranged down to
pub const MIN_SIZE: i32 = 50;

/// Screen position of an instrument's top-left corner and its square size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

impl Placement {
    pub const fn new(x: i32, y: i32, size: i32) -> Self {
        Self { x, y, size }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.size / 2, self.y + self.size / 2)
    }
}

/// A gauge on the panel.
///
/// `update` pulls fresh values and recomputes display state; `render` only draws it.
/// Neither reports failure: an instrument keeps its last good values when a read fails.
pub trait Instrument {
    /// Stable name, used to key saved settings
    fn name(&self) -> &str;

    fn placement(&self) -> Placement;

    /// Moves or resizes the instrument; only arranging does this.
    fn set_placement(&mut self, placement: Placement);

    /// Registers the variables the instrument reads.
    fn register(&mut self, _vars: &mut dyn VariableBridge) {}

    fn update(&mut self, ctx: &ApplicationContext, vars: &mut dyn VariableBridge);

    fn render(&self, canvas: &mut Canvas<'_>, ctx: &ApplicationContext);
}

/// Instruments in insertion order, which is both update order and paint order.
#[derive(Default)]
pub struct InstrumentRegistry {
    instruments: Vec<Box<dyn Instrument>>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instrument after registering its variables.
    pub fn add(&mut self, mut instrument: Box<dyn Instrument>, vars: &mut dyn VariableBridge) {
        instrument.register(vars);
        self.instruments.push(instrument);
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Instrument> {
        self.instruments.get(index).map(|i| i.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Instrument + 'static)> {
        self.instruments.get_mut(index).map(|i| i.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Instrument> {
        self.instruments.iter().map(|i| i.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Instrument + 'static)> {
        self.instruments.iter_mut().map(|i| i.as_mut())
    }

    pub fn update_all(&mut self, ctx: &ApplicationContext, vars: &mut dyn VariableBridge) {
        for instrument in &mut self.instruments {
            instrument.update(ctx, vars);
        }
    }

    pub fn render_all(&self, canvas: &mut Canvas<'_>, ctx: &ApplicationContext) {
        for instrument in &self.instruments {
            instrument.render(canvas, ctx);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{CallLog, Recorder};
    use super::*;
    use crate::bridge::DemoBridge;

    #[test]
    fn update_and_render_follow_insertion_order() {
        let log = CallLog::default();
        let mut bridge = DemoBridge::new();
        let mut registry = InstrumentRegistry::new();
        registry.add(Recorder::boxed("a", &log), &mut bridge);
        registry.add(Recorder::boxed("b", &log), &mut bridge);

        let ctx = ApplicationContext::default();
        registry.update_all(&ctx, &mut bridge);
        let mut buf = vec![0; 4];
        registry.render_all(&mut Canvas::new(&mut buf, 1, 1), &ctx);

        assert_eq!(
            *log.borrow(),
            ["register a", "register b", "update a", "update b", "render a", "render b"]
        );
    }

    #[test]
    fn placements_can_be_changed_through_the_registry() {
        let log = CallLog::default();
        let mut registry = InstrumentRegistry::new();
        registry.add(Recorder::boxed("a", &log), &mut DemoBridge::new());
        if let Some(instrument) = registry.get_mut(0) {
            instrument.set_placement(Placement::new(5, 6, 70));
        }
        assert_eq!(registry.get(0).unwrap().placement(), Placement::new(5, 6, 70));
        assert_eq!(Placement::new(10, 20, 100).center(), (60, 70));
        assert!(registry.get(1).is_none());
    }
}
