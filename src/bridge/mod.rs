//! Contract of the flight simulator data channel.
//!
//! Variables are registered by address, then read every tick. Every call can fail on
//! its own; callers decide their fallback.

pub mod demo;

use thiserror::Error;

pub use demo::DemoBridge;

/// Provider-side address of a variable
pub type Address = u32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Not connected to flight simulator")]
    NotConnected,

    #[error("Variable {0:#06X} is not registered")]
    Unregistered(Address),

    #[error("Cannot read {len} bytes from {address:#06X}")]
    Size { address: Address, len: usize },

    #[error("Flight simulator error: {0}")]
    Provider(String),
}

/// Bytes returned by a successful read, little-endian, at most eight of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawValue {
    bytes: [u8; RawValue::MAX_LEN],
    len: usize,
}

impl RawValue {
    pub const MAX_LEN: usize = 8;

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > Self::MAX_LEN {
            return None;
        }
        let mut raw = Self {
            len: bytes.len(),
            ..Self::default()
        };
        raw.bytes[..bytes.len()].copy_from_slice(bytes);
        Some(raw)
    }

    /// Encodes `value` into `len` bytes, dropping the high-order ones.
    pub fn from_i64(value: i64, len: usize) -> Self {
        let len = len.min(Self::MAX_LEN);
        let mut raw = Self {
            len,
            ..Self::default()
        };
        raw.bytes[..len].copy_from_slice(&value.to_le_bytes()[..len]);
        raw
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn as_u8(&self) -> u8 {
        self.bytes[0]
    }

    pub fn as_u16(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0], self.bytes[1]])
    }

    /// Value read as a signed integer of its own width.
    pub fn as_i64(&self) -> i64 {
        if self.len == 0 {
            return 0;
        }
        let shift = 64 - 8 * self.len as u32;
        (i64::from_le_bytes(self.bytes) << shift) >> shift
    }
}

/// Registration record binding a logical name to a provider address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonVariable {
    pub group: String,
    pub name: String,
    pub address: Address,
    pub writable: bool,
    pub size: usize,
    /// Position in inspection views
    pub order: u32,
    /// Smallest adjustment applied while simulating
    pub step: i64,
}

impl CommonVariable {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        address: Address,
        writable: bool,
        size: usize,
        order: u32,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            address,
            writable,
            size,
            order,
            step: 1,
        }
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step.max(1);
        self
    }

    /// `group/name`, the key simulated values are saved under.
    pub fn key(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }
}

pub trait VariableBridge {
    /// Registers (or re-registers) a variable. Registering an address twice replaces the
    /// earlier record.
    fn register_variable(&mut self, var: CommonVariable);

    fn read(&mut self, address: Address, len: usize) -> Result<RawValue, BridgeError>;

    /// Processes the reads and writes queued since the last commit.
    fn commit(&mut self) -> Result<(), BridgeError>;
}

impl<B: VariableBridge + ?Sized> VariableBridge for Box<B> {
    fn register_variable(&mut self, var: CommonVariable) {
        (**self).register_variable(var)
    }

    fn read(&mut self, address: Address, len: usize) -> Result<RawValue, BridgeError> {
        (**self).read(address, len)
    }

    fn commit(&mut self) -> Result<(), BridgeError> {
        (**self).commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_sign_extend_from_their_width() {
        assert_eq!(RawValue::from_i64(-2, 2).as_i64(), -2);
        assert_eq!(RawValue::from_i64(-2, 2).as_u16(), 0xFFFE);
        assert_eq!(RawValue::from_i64(300, 4).as_i64(), 300);
        assert_eq!(RawValue::from_i64(1, 1).as_u8(), 1);
        assert_eq!(RawValue::from_i64(i64::MIN, 8).as_i64(), i64::MIN);
    }

    #[test]
    fn raw_values_reject_oversized_slices() {
        assert!(RawValue::from_slice(&[0; 9]).is_none());
        let raw = RawValue::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(raw.as_bytes(), &[1, 2, 3]);
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn variable_step_is_at_least_one() {
        let var = CommonVariable::new("Common", "Electrics", 0x0B6A, true, 1, 0).with_step(0);
        assert_eq!(var.step, 1);
        assert_eq!(var.key(), "Common/Electrics");
    }
}
