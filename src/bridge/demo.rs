use std::collections::HashMap;

use rand::Rng;

use super::{Address, BridgeError, CommonVariable, RawValue, VariableBridge};

/// Odds per commit that a drifting channel picks a new target
const RETARGET_CHANCE: f64 = 0.01;
const LERP_FACTOR: f64 = 0.05;

#[derive(Debug, Clone)]
struct Channel {
    value: f64,
    target: f64,
    drift: Option<(f64, f64)>,
}

impl Channel {
    fn flat(value: f64) -> Self {
        Self {
            value,
            target: value,
            drift: None,
        }
    }

    fn step(&mut self, rng: &mut impl Rng) {
        let Some((min, max)) = self.drift else {
            return;
        };
        if rng.random_range(0.0..1.0) < RETARGET_CHANCE {
            self.target = rng.random_range(min..max);
        }
        self.value += (self.target - self.value) * LERP_FACTOR;
    }
}

/// In-memory stand-in for the flight simulator.
///
/// Registered variables read back as flat values; channels added with
/// [`DemoBridge::with_drift`] wander between their bounds the way a flown aircraft
/// would. An offline bridge fails every call, like a simulator that is not running.
#[derive(Debug, Clone)]
pub struct DemoBridge {
    online: bool,
    channels: HashMap<Address, Channel>,
}

impl DemoBridge {
    pub fn new() -> Self {
        Self {
            online: true,
            channels: HashMap::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            ..Self::new()
        }
    }

    /// Adds a channel starting at `initial` and drifting within `min..max` (raw provider
    /// units).
    pub fn with_drift(mut self, address: Address, initial: f64, min: f64, max: f64) -> Self {
        let mut channel = Channel::flat(initial);
        if min < max {
            channel.drift = Some((min, max));
        }
        self.channels.insert(address, channel);
        self
    }

    /// Pins a channel to a fixed raw value.
    pub fn set(&mut self, address: Address, value: i64) {
        self.channels.insert(address, Channel::flat(value as f64));
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

impl Default for DemoBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableBridge for DemoBridge {
    fn register_variable(&mut self, var: CommonVariable) {
        self.channels
            .entry(var.address)
            .or_insert_with(|| Channel::flat(0.0));
    }

    fn read(&mut self, address: Address, len: usize) -> Result<RawValue, BridgeError> {
        if !self.online {
            return Err(BridgeError::NotConnected);
        }
        if len > RawValue::MAX_LEN {
            return Err(BridgeError::Size { address, len });
        }
        let channel = self
            .channels
            .get(&address)
            .ok_or(BridgeError::Unregistered(address))?;
        Ok(RawValue::from_i64(channel.value.round() as i64, len))
    }

    fn commit(&mut self) -> Result<(), BridgeError> {
        if !self.online {
            return Err(BridgeError::NotConnected);
        }
        let mut rng = rand::rng();
        for channel in self.channels.values_mut() {
            channel.step(&mut rng);
        }
        Ok(())
    }
}
