mod engine;
mod error;
pub mod tool_defaults;
mod types;
pub mod version;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{
    CHARACTERS_SECTION, REWARD_SECTION, SAVEGAME_ELEMENT, SELF_ATTRIBUTE, SectionValues, Snapshot,
    TOOL_SECTION, ToolParams, ToolTable, UNKNOWN_VERSION, VALUABLE_SECTION, VALUE_ATTRIBUTE,
    VERSION_ATTRIBUTE, WriteOutcome,
};
