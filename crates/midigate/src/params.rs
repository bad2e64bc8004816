//! Parameter surface: metadata, storage, and the translator's view of it.
//!
//! The three scalars (channel, note, controller) are written by a
//! control-plane thread and read by the event-ingestion thread on every
//! event. Storage is a relaxed atomic per scalar: reads and writes cannot
//! tear, and a stale read is tolerated for at most one event, which is the
//! contract this processor needs — no lock, no stronger ordering.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{GateError, GateResult};

/// Unique parameter identifier.
pub type ParameterId = u32;

/// The processor's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// MIDI channel to match (1-16).
    Channel,
    /// Note number to gate (1-127).
    Note,
    /// Controller number to synthesize (1-127).
    Controller,
}

impl Parameter {
    /// Number of parameters.
    pub const COUNT: usize = 3;

    /// Look up a parameter by id.
    pub fn from_id(id: ParameterId) -> Option<Self> {
        match id {
            0 => Some(Self::Channel),
            1 => Some(Self::Note),
            2 => Some(Self::Controller),
            _ => None,
        }
    }

    /// The parameter's id.
    #[inline]
    pub const fn id(self) -> ParameterId {
        match self {
            Self::Channel => 0,
            Self::Note => 1,
            Self::Controller => 2,
        }
    }

    /// The parameter's metadata.
    #[inline]
    pub fn info(self) -> &'static ParameterInfo {
        &PARAMETER_INFOS[self.id() as usize]
    }
}

/// Metadata describing a single parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// Unique parameter identifier.
    pub id: ParameterId,
    /// Parameter name.
    pub name: &'static str,
    /// Inclusive minimum value.
    pub min: u8,
    /// Inclusive maximum value.
    pub max: u8,
    /// Default (initial) value.
    pub default: u8,
}

/// Metadata for all parameters, indexed by id.
pub static PARAMETER_INFOS: [ParameterInfo; Parameter::COUNT] = [
    ParameterInfo {
        id: 0,
        name: "Ch",
        min: 1,
        max: 16,
        default: 1,
    },
    ParameterInfo {
        id: 1,
        name: "Note",
        min: 1,
        max: 127,
        default: 21,
    },
    ParameterInfo {
        id: 2,
        name: "CC",
        min: 1,
        max: 127,
        default: 1,
    },
];

/// Atomic storage for the three configuration scalars.
///
/// `set` validates against the parameter's documented range and leaves the
/// value untouched on rejection.
#[derive(Debug)]
pub struct GateParams {
    channel: AtomicU8,
    note: AtomicU8,
    controller: AtomicU8,
}

impl GateParams {
    /// Create storage initialized to the parameter defaults.
    pub fn new() -> Self {
        Self {
            channel: AtomicU8::new(Parameter::Channel.info().default),
            note: AtomicU8::new(Parameter::Note.info().default),
            controller: AtomicU8::new(Parameter::Controller.info().default),
        }
    }

    fn cell(&self, parameter: Parameter) -> &AtomicU8 {
        match parameter {
            Parameter::Channel => &self.channel,
            Parameter::Note => &self.note,
            Parameter::Controller => &self.controller,
        }
    }

    /// Current value of a parameter.
    #[inline]
    pub fn get(&self, parameter: Parameter) -> u8 {
        self.cell(parameter).load(Ordering::Relaxed)
    }

    /// Set a parameter, rejecting values outside the documented range.
    pub fn set(&self, parameter: Parameter, value: u8) -> GateResult<()> {
        let info = parameter.info();
        if value < info.min || value > info.max {
            return Err(GateError::ValueOutOfRange {
                parameter: info.name,
                value,
                min: info.min,
                max: info.max,
            });
        }

        self.cell(parameter).store(value, Ordering::Relaxed);
        Ok(())
    }

    /// A consistent-enough view for translating one event.
    ///
    /// Each scalar is read independently; a concurrent update can make one
    /// straggler event use the previous configuration, which the design
    /// tolerates.
    #[inline]
    pub fn snapshot(&self) -> TransformConfig {
        TransformConfig {
            channel: self.channel.load(Ordering::Relaxed),
            note: self.note.load(Ordering::Relaxed),
            controller: self.controller.load(Ordering::Relaxed),
        }
    }
}

impl Default for GateParams {
    fn default() -> Self {
        Self::new()
    }
}

/// The translator's read-only view of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    /// MIDI channel to match (1-16).
    pub channel: u8,
    /// Note number to gate (1-127).
    pub note: u8,
    /// Controller number to synthesize (1-127).
    pub controller: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = GateParams::new();
        assert_eq!(params.get(Parameter::Channel), 1);
        assert_eq!(params.get(Parameter::Note), 21);
        assert_eq!(params.get(Parameter::Controller), 1);
    }

    #[test]
    fn test_set_and_snapshot() {
        let params = GateParams::new();
        params.set(Parameter::Channel, 5).unwrap();
        params.set(Parameter::Note, 60).unwrap();
        params.set(Parameter::Controller, 11).unwrap();

        let config = params.snapshot();
        assert_eq!(config.channel, 5);
        assert_eq!(config.note, 60);
        assert_eq!(config.controller, 11);
    }

    #[test]
    fn test_range_rejection() {
        let params = GateParams::new();

        let err = params.set(Parameter::Channel, 17).unwrap_err();
        assert_eq!(
            err,
            GateError::ValueOutOfRange {
                parameter: "Ch",
                value: 17,
                min: 1,
                max: 16,
            }
        );
        // No state mutation on rejection.
        assert_eq!(params.get(Parameter::Channel), 1);

        assert!(params.set(Parameter::Note, 0).is_err());
        assert!(params.set(Parameter::Controller, 128).is_err());
    }

    #[test]
    fn test_range_boundaries() {
        let params = GateParams::new();
        assert!(params.set(Parameter::Channel, 1).is_ok());
        assert!(params.set(Parameter::Channel, 16).is_ok());
        assert!(params.set(Parameter::Note, 1).is_ok());
        assert!(params.set(Parameter::Note, 127).is_ok());
    }

    #[test]
    fn test_from_id() {
        assert_eq!(Parameter::from_id(0), Some(Parameter::Channel));
        assert_eq!(Parameter::from_id(1), Some(Parameter::Note));
        assert_eq!(Parameter::from_id(2), Some(Parameter::Controller));
        assert_eq!(Parameter::from_id(3), None);

        for parameter in [Parameter::Channel, Parameter::Note, Parameter::Controller] {
            assert_eq!(Parameter::from_id(parameter.id()), Some(parameter));
            assert_eq!(parameter.info().id, parameter.id());
        }
    }
}
