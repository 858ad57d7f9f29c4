//! Variable hub between the panel and the flight simulator.
//!
//! Keeps every registration (for the inspection views) and a table of simulated values.
//! While simulating, reads are answered from that table instead of the simulator.

use std::collections::{BTreeMap, HashMap};

use log::trace;

use crate::bridge::{Address, BridgeError, CommonVariable, RawValue, VariableBridge};

pub struct SimVars {
    bridge: Box<dyn VariableBridge>,
    vars: Vec<CommonVariable>,
    simulated: HashMap<Address, i64>,
    presets: HashMap<String, i64>,
    simulating: bool,
}

impl SimVars {
    pub fn new(bridge: Box<dyn VariableBridge>) -> Self {
        Self {
            bridge,
            vars: Vec::new(),
            simulated: HashMap::new(),
            presets: HashMap::new(),
            simulating: false,
        }
    }

    pub fn set_simulating(&mut self, on: bool) {
        self.simulating = on;
    }

    pub fn simulating(&self) -> bool {
        self.simulating
    }

    /// Registered variables in inspection order.
    pub fn variables(&self) -> &[CommonVariable] {
        &self.vars
    }

    pub fn variable(&self, address: Address) -> Option<&CommonVariable> {
        self.vars.iter().find(|var| var.address == address)
    }

    pub fn simulated(&self, address: Address) -> i64 {
        self.simulated.get(&address).copied().unwrap_or(0)
    }

    pub fn simulate(&mut self, address: Address, value: i64) {
        self.simulated.insert(address, value);
    }

    /// Sets the simulated value unless one is already present.
    pub fn seed_default(&mut self, address: Address, value: i64) {
        self.simulated.entry(address).or_insert(value);
    }

    /// Moves a writable variable's simulated value by `steps` of its step size and
    /// returns the new value. Read-only or unknown variables are left alone.
    pub fn adjust(&mut self, address: Address, steps: i64) -> Option<i64> {
        let var = self.variable(address)?;
        if !var.writable {
            return None;
        }
        let delta = steps.saturating_mul(var.step);
        let value = self.simulated(address).saturating_add(delta);
        self.simulated.insert(address, value);
        Some(value)
    }

    /// Simulated values keyed by `group/name`.
    pub fn simulated_values(&self) -> BTreeMap<String, i64> {
        self.vars
            .iter()
            .filter_map(|var| {
                self.simulated
                    .get(&var.address)
                    .map(|value| (var.key(), *value))
            })
            .collect()
    }

    /// Applies saved simulated values. Keys not registered yet are applied when their
    /// variable registers.
    pub fn restore_simulated(&mut self, values: &BTreeMap<String, i64>) {
        for (key, value) in values {
            self.presets.insert(key.clone(), *value);
            if let Some(var) = self.vars.iter().find(|var| &var.key() == key) {
                self.simulated.insert(var.address, *value);
            }
        }
    }
}

impl VariableBridge for SimVars {
    fn register_variable(&mut self, var: CommonVariable) {
        if let Some(preset) = self.presets.get(&var.key()) {
            self.simulated.insert(var.address, *preset);
        }
        self.bridge.register_variable(var.clone());
        self.vars.retain(|existing| existing.address != var.address);
        let at = self
            .vars
            .iter()
            .position(|existing| existing.order > var.order)
            .unwrap_or(self.vars.len());
        trace!("Registered {} at {:#06X}", var.key(), var.address);
        self.vars.insert(at, var);
    }

    fn read(&mut self, address: Address, len: usize) -> Result<RawValue, BridgeError> {
        if !self.simulating {
            return self.bridge.read(address, len);
        }
        if len > RawValue::MAX_LEN {
            return Err(BridgeError::Size { address, len });
        }
        if self.variable(address).is_none() {
            return Err(BridgeError::Unregistered(address));
        }
        Ok(RawValue::from_i64(self.simulated(address), len))
    }

    fn commit(&mut self) -> Result<(), BridgeError> {
        if self.simulating {
            Ok(())
        } else {
            self.bridge.commit()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DemoBridge;

    fn var(name: &str, address: Address, order: u32) -> CommonVariable {
        CommonVariable::new("Test", name, address, true, 2, order)
    }

    #[test]
    fn variables_are_kept_in_order_index_order() {
        let mut simvars = SimVars::new(Box::new(DemoBridge::new()));
        simvars.register_variable(var("b", 2, 5));
        simvars.register_variable(var("a", 1, 1));
        simvars.register_variable(var("c", 3, 5));
        let names: Vec<_> = simvars.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn re_registering_replaces_the_record() {
        let mut simvars = SimVars::new(Box::new(DemoBridge::new()));
        simvars.register_variable(var("old", 1, 0));
        simvars.register_variable(var("new", 1, 0));
        assert_eq!(simvars.variables().len(), 1);
        assert_eq!(simvars.variable(1).unwrap().name, "new");
    }

    #[test]
    fn simulating_reads_come_from_the_table() {
        let mut simvars = SimVars::new(Box::new(DemoBridge::offline()));
        simvars.register_variable(var("speed", 0x02BC, 0));
        simvars.simulate(0x02BC, 1234);

        assert_eq!(simvars.read(0x02BC, 2), Err(BridgeError::NotConnected));
        assert!(simvars.commit().is_err());

        simvars.set_simulating(true);
        assert_eq!(simvars.read(0x02BC, 2).unwrap().as_i64(), 1234);
        assert_eq!(simvars.read(0x0001, 2), Err(BridgeError::Unregistered(0x0001)));
        assert!(simvars.commit().is_ok());
    }

    #[test]
    fn adjust_respects_step_and_writability() {
        let mut simvars = SimVars::new(Box::new(DemoBridge::new()));
        simvars.register_variable(var("speed", 1, 0).with_step(128));
        simvars.register_variable(CommonVariable::new("Test", "apu", 2, false, 1, 1));

        assert_eq!(simvars.adjust(1, 2), Some(256));
        assert_eq!(simvars.adjust(1, -1), Some(128));
        assert_eq!(simvars.adjust(2, 1), None);
        assert_eq!(simvars.adjust(99, 1), None);
    }

    #[test]
    fn saved_values_apply_before_and_after_registration() {
        let mut simvars = SimVars::new(Box::new(DemoBridge::new()));
        simvars.register_variable(var("early", 1, 0));

        let saved = BTreeMap::from([("Test/early".to_string(), 7), ("Test/late".to_string(), 9)]);
        simvars.restore_simulated(&saved);
        assert_eq!(simvars.simulated(1), 7);

        simvars.register_variable(var("late", 2, 1));
        simvars.seed_default(2, 100);
        assert_eq!(simvars.simulated(2), 9);
        assert_eq!(simvars.simulated_values(), saved);
    }
}
