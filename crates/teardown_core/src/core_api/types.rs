use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const SAVEGAME_ELEMENT: &str = "savegame";
pub const VERSION_ATTRIBUTE: &str = "version";
pub const VALUE_ATTRIBUTE: &str = "value";
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Attribute name that addresses an item's own `value` rather than a child
/// parameter.
pub const SELF_ATTRIBUTE: &str = "self";

pub const TOOL_SECTION: &str = "tool";
pub const VALUABLE_SECTION: &str = "valuable";
pub const CHARACTERS_SECTION: &str = "characters";
pub const REWARD_SECTION: &str = "reward";

/// Item identifier to `value` attribute, in document order.
pub type SectionValues = IndexMap<String, Option<String>>;

/// Parameter name to `value` attribute for one tool, in document order.
pub type ToolParams = IndexMap<String, Option<String>>;

/// Tool identifier to its parameters, in document order.
pub type ToolTable = IndexMap<String, ToolParams>;

/// Result of a gateway write. Misses are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
    Updated,
    MissingSection,
    MissingItem,
    MissingAttribute,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        *self == Self::Updated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub path: PathBuf,
    pub version: String,
    pub supported_version: bool,
    pub sections: Vec<String>,
    pub tool_count: usize,
}
