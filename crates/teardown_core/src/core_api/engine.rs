use std::ffi::OsString;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::document::{Document, Node};
use crate::tag_codec;

use super::error::{CoreError, CoreErrorCode};
use super::tool_defaults;
use super::types::{
    SAVEGAME_ELEMENT, SELF_ATTRIBUTE, SectionValues, Snapshot, TOOL_SECTION, ToolTable,
    UNKNOWN_VERSION, VALUE_ATTRIBUTE, VERSION_ATTRIBUTE, WriteOutcome,
};
use super::version;

const BACKUP_SUFFIX: &str = ".bak";

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// One open save file: the parsed tree plus the path it came from.
///
/// All reads return fresh projections; the tree is only changed through
/// [`Session::write`] and the helpers built on it.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    document: Document,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> Result<Session, CoreError> {
        let path = path.as_ref();
        info!("Attempting to load file: {}", path.display());

        let raw = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read {}: {e}", path.display());
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;

        self.open_str(&raw, path)
    }

    /// Parses save text that was read elsewhere, as if it had been loaded
    /// from `path`.
    pub fn open_str<P: Into<PathBuf>>(&self, raw: &str, path: P) -> Result<Session, CoreError> {
        let path = path.into();
        let document = Document::parse(&tag_codec::sanitize(raw)).map_err(|e| {
            error!("Failed to load file: {e}");
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse {}: {e}", path.display()),
            )
        })?;

        let session = Session { path, document };
        if session.document.root().child(SAVEGAME_ELEMENT).is_none() {
            warn!(
                "{} has no <{SAVEGAME_ELEMENT}> element; all sections will read as empty",
                session.path.display()
            );
        }
        info!(
            "File loaded successfully. Registry version: {}",
            session.version()
        );
        Ok(session)
    }
}

impl Session {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version declared on the root element, or `"Unknown"`.
    pub fn version(&self) -> &str {
        self.document
            .root()
            .attribute(VERSION_ATTRIBUTE)
            .unwrap_or(UNKNOWN_VERSION)
    }

    pub fn is_supported_version(&self) -> bool {
        version::is_supported(self.version())
    }

    /// `<path>.bak`, overwritten by every [`Session::persist`].
    pub fn backup_path(&self) -> PathBuf {
        let mut backup = OsString::from(self.path.as_os_str());
        backup.push(BACKUP_SUFFIX);
        PathBuf::from(backup)
    }

    /// Replaces the open document with the one at `path`. On failure the
    /// session keeps its current document.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CoreError> {
        *self = Engine::new().open_path(path)?;
        Ok(())
    }

    /// The text [`Session::persist`] would write, with digit tags restored.
    pub fn to_text(&self) -> String {
        tag_codec::desanitize(&self.document.to_xml()).into_owned()
    }

    /// Backs up the file on disk, then overwrites it with the current tree.
    ///
    /// A non-empty `new_version` is stored on the root of the written tree.
    /// Nothing is written when the backup copy fails, and the session only
    /// takes the new version once the write succeeded.
    pub fn persist(&mut self, new_version: Option<&str>) -> Result<PathBuf, CoreError> {
        info!("Starting save process...");
        let mut staged = self.document.clone();
        if let Some(new_version) = new_version.filter(|v| !v.is_empty()) {
            info!("Updating version to: {new_version}");
            staged
                .root_mut()
                .set_attribute(VERSION_ATTRIBUTE, new_version);
        }

        let backup_path = self.backup_path();
        fs::copy(&self.path, &backup_path).map_err(|e| {
            error!("Save failed: {e}");
            CoreError::new(
                CoreErrorCode::Persist,
                format!(
                    "failed to back up {} to {}: {e}",
                    self.path.display(),
                    backup_path.display()
                ),
            )
        })?;
        info!("Backup created at: {}", backup_path.display());

        let text = tag_codec::desanitize(&staged.to_xml()).into_owned();
        fs::write(&self.path, text).map_err(|e| {
            error!("Save failed: {e}");
            CoreError::new(
                CoreErrorCode::Persist,
                format!("failed to write {}: {e}", self.path.display()),
            )
        })?;
        info!("File saved successfully to: {}", self.path.display());

        self.document = staged;
        Ok(backup_path)
    }

    /// Canonical names of every section under `savegame`, in document order.
    pub fn section_names(&self) -> Vec<String> {
        self.document
            .root()
            .child(SAVEGAME_ELEMENT)
            .map(|savegame| {
                savegame
                    .children()
                    .iter()
                    .map(|s| s.canonical_name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Item identifier to `value` for every direct child of a section.
    /// A missing section reads as empty.
    pub fn read_section(&self, name: &str) -> SectionValues {
        let Some(section) = self.section(name) else {
            return SectionValues::new();
        };

        section
            .children()
            .iter()
            .map(|item| {
                (
                    item.canonical_name().to_string(),
                    item.value().map(str::to_string),
                )
            })
            .collect()
    }

    /// Tool identifier to parameter values. A missing tool section reads as
    /// empty.
    pub fn read_tools(&self) -> ToolTable {
        let Some(section) = self.section(TOOL_SECTION) else {
            return ToolTable::new();
        };

        section
            .children()
            .iter()
            .map(|tool| {
                let params = tool
                    .children()
                    .iter()
                    .map(|param| (param.name().to_string(), param.value().map(str::to_string)))
                    .collect();
                (tool.canonical_name().to_string(), params)
            })
            .collect()
    }

    /// Sets `value` on `section/item` (when `attr` is `"self"`) or on the
    /// `attr` parameter below the item. Any missing step is a no-op.
    pub fn write<V: Display>(
        &mut self,
        section: &str,
        item: &str,
        attr: &str,
        value: V,
    ) -> WriteOutcome {
        let value = value.to_string();

        let Some(section_node) = self.section_mut(section) else {
            debug!("skipping update: section {section} not found");
            return WriteOutcome::MissingSection;
        };
        let Some(item_node) = section_node.child_mut(&tag_codec::tree_name(item)) else {
            debug!("skipping update: {section}/{item} not found");
            return WriteOutcome::MissingItem;
        };

        if attr == SELF_ATTRIBUTE {
            info!("{}", update_message(section, item, attr, &value));
            item_node.set_attribute(VALUE_ATTRIBUTE, value);
            return WriteOutcome::Updated;
        }

        let Some(param) = item_node.child_mut(attr) else {
            debug!("skipping update: {section}/{item}/{attr} not found");
            return WriteOutcome::MissingAttribute;
        };
        info!("{}", update_message(section, item, attr, &value));
        param.set_attribute(VALUE_ATTRIBUTE, value);
        WriteOutcome::Updated
    }

    /// Sets every item of a section to `1`. Returns how many were updated.
    pub fn unlock_all(&mut self, section: &str) -> usize {
        info!("Batch unlock triggered for: {section}");
        let items: Vec<String> = self.read_section(section).into_keys().collect();
        items
            .iter()
            .filter(|item| self.write(section, item, SELF_ATTRIBUTE, 1).is_applied())
            .count()
    }

    /// Applies one tool's factory values. Returns how many parameters were
    /// found and written.
    pub fn reset_tool(&mut self, tool: &str) -> Result<usize, CoreError> {
        let Some(defaults) = tool_defaults::lookup(tool) else {
            warn!("No default values known for '{tool}'");
            return Err(CoreError::new(
                CoreErrorCode::UnknownDefault,
                format!("no default values known for '{tool}'"),
            ));
        };

        info!("Resetting {tool} to defaults");
        Ok(self.apply_defaults(tool, defaults))
    }

    /// Applies every entry of the default table. Tools missing from the save
    /// are skipped.
    pub fn reset_all_tools(&mut self) -> usize {
        warn!("RESETTING ALL TOOLS TO DEFAULTS");
        tool_defaults::entries()
            .map(|(tool, defaults)| self.apply_defaults(tool, defaults))
            .sum()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            path: self.path.clone(),
            version: self.version().to_string(),
            supported_version: self.is_supported_version(),
            sections: self.section_names(),
            tool_count: self.section(TOOL_SECTION).map_or(0, |s| s.children().len()),
        }
    }

    fn apply_defaults(&mut self, tool: &str, defaults: &[(&str, i32)]) -> usize {
        defaults
            .iter()
            .filter(|&&(attr, value)| self.write(TOOL_SECTION, tool, attr, value).is_applied())
            .count()
    }

    fn section(&self, name: &str) -> Option<&Node> {
        self.document
            .root()
            .child(SAVEGAME_ELEMENT)?
            .child(&tag_codec::tree_name(name))
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.document
            .root_mut()
            .child_mut(SAVEGAME_ELEMENT)?
            .child_mut(&tag_codec::tree_name(name))
    }
}

/// `UPDATE valuable: mansion_art -> 1` for own values,
/// `UPDATE TOOL shotgun: ammo -> 50` for parameters.
fn update_message(section: &str, item: &str, attr: &str, value: &str) -> String {
    if attr == SELF_ATTRIBUTE {
        format!("UPDATE {section}: {item} -> {value}")
    } else {
        format!("UPDATE {} {item}: {attr} -> {value}", section.to_uppercase())
    }
}
