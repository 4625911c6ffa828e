//! Default value functions for configuration.

use slirc_wire::DEFAULT_MAX_LINE_LEN;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

pub fn default_network() -> String {
    "default".to_string()
}

pub fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}
