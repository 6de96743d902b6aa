//! Data layer - Static mappings and constants
//!
//! This module contains the static tables used by the expression engine:
//! - Named constants (`PI`, `E`)
//! - Unary function commands
//! - Operator and spacing command classifications

pub mod constants;

// Re-export commonly used items
pub use constants::{
    COMMAND_CONSTANTS, CONSTANTS, CONSTANT_COMMANDS, IGNORED_COMMANDS, OPERATOR_COMMANDS,
    TRANSPARENT_COMMANDS, UNARY_FUNCTIONS,
};
