//! Synthetic frame member policy.
//!
//! Engines inject a saved-registers slot into every frame and a return-address
//! slot into frames that reserve one. Neither is structurally flagged, so they
//! are recognised by their reserved display names.

use framekit_config::Config;

/// Reserved name of the saved-registers slot.
pub const SAVED_REGISTERS_MARKER: &str = " s";

/// Reserved name of the return-address slot.
pub const RETURN_ADDRESS_MARKER: &str = " r";

/// Names of the members hidden from iteration and lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenMembers {
    saved_registers: String,
    return_address: String,
}

impl HiddenMembers {
    pub fn new(saved_registers: impl Into<String>, return_address: impl Into<String>) -> Self {
        Self {
            saved_registers: saved_registers.into(),
            return_address: return_address.into(),
        }
    }

    /// Policy from configuration, falling back to the reserved names.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config
                .saved_registers_marker()
                .unwrap_or(SAVED_REGISTERS_MARKER),
            config
                .return_address_marker()
                .unwrap_or(RETURN_ADDRESS_MARKER),
        )
    }

    pub fn saved_registers(&self) -> &str {
        &self.saved_registers
    }

    pub fn return_address(&self) -> &str {
        &self.return_address
    }

    /// Whether a member named `name` is synthetic in a frame that does or
    /// does not reserve a return-address slot.
    pub fn is_synthetic(&self, name: &str, has_return_slot: bool) -> bool {
        name == self.saved_registers || (has_return_slot && name == self.return_address)
    }

    /// Number of synthetic members a frame carries.
    pub fn synthetic_count(&self, has_return_slot: bool) -> usize {
        1 + usize::from(has_return_slot)
    }
}

impl Default for HiddenMembers {
    fn default() -> Self {
        Self::new(SAVED_REGISTERS_MARKER, RETURN_ADDRESS_MARKER)
    }
}
