use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{info, warn};
use teardown_core::core_api::version::MIN_SUPPORTED_VERSION;
use teardown_core::core_api::{
    CHARACTERS_SECTION, Engine, REWARD_SECTION, SELF_ATTRIBUTE, TOOL_SECTION, VALUABLE_SECTION,
    tool_defaults,
};
use teardown_core::locate::find_default_location;
use teardown_render::{
    FieldSelection, JsonStyle, TextStyle, render_json_selected, render_text_selected,
};

/// Sections whose items are plain unlocked/locked switches.
const FLAG_SECTIONS: [&str; 3] = [VALUABLE_SECTION, CHARACTERS_SECTION, REWARD_SECTION];

/// `SECTION/ITEM/ATTR=VALUE`, where `ATTR` may be `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Assignment {
    section: String,
    item: String,
    attr: String,
    value: String,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}={}",
            self.section, self.item, self.attr, self.value
        )
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about,
    after_help = "Edits run in this order: --reset-all-tools, --reset-tool, --unlock-all, --set. \
                  Any edit saves the file in place after copying it to <PATH>.bak."
)]
struct Cli {
    /// Save file to open. Defaults to the game's own save location.
    #[arg(value_name = "SAVEGAME.XML")]
    path: Option<PathBuf>,
    #[arg(long)]
    info: bool,
    /// List the sections present under <savegame>.
    #[arg(long)]
    sections: bool,
    #[arg(long)]
    tools: bool,
    #[arg(long = "section", value_name = "NAME")]
    section: Vec<String>,
    #[arg(long)]
    json: bool,
    #[arg(
        long = "set",
        value_name = "SECTION/ITEM/ATTR=VALUE",
        value_parser = parse_assignment
    )]
    set: Vec<Assignment>,
    #[arg(long = "reset-tool", value_name = "TOOL")]
    reset_tool: Vec<String>,
    #[arg(long = "reset-all-tools")]
    reset_all_tools: bool,
    #[arg(long = "unlock-all", value_name = "SECTION")]
    unlock_all: Vec<String>,
    #[arg(long = "set-version", value_name = "VERSION")]
    set_version: Option<String>,
}

impl Cli {
    fn has_edits(&self) -> bool {
        !self.set.is_empty()
            || !self.reset_tool.is_empty()
            || self.reset_all_tools
            || !self.unlock_all.is_empty()
            || self.set_version.is_some()
    }

    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            info: self.info,
            section_names: self.sections,
            tools: self.tools,
            sections: self.section.clone(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let fields = cli.field_selection();
    let has_edits = cli.has_edits();

    let mut assignments = Vec::with_capacity(cli.set.len());
    for assignment in &cli.set {
        match validate_assignment(assignment) {
            Ok(checked) => assignments.push(checked),
            Err(e) => {
                eprintln!("Invalid --set {assignment}: {e}");
                process::exit(2);
            }
        }
    }

    let path = cli
        .path
        .clone()
        .or_else(find_default_location)
        .unwrap_or_else(|| {
            eprintln!("No save file given and none found at the default location");
            process::exit(2);
        });

    let mut session = Engine::new().open_path(&path).unwrap_or_else(|e| {
        eprintln!("Error loading save file: {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if !session.is_supported_version() {
        warn!(
            "GAME VERSION | registry version {} is not {MIN_SUPPORTED_VERSION} or later; \
             this editor only supports saves from game version {MIN_SUPPORTED_VERSION} onwards",
            session.version()
        );
    }

    if cli.reset_all_tools {
        let written = session.reset_all_tools();
        info!("All tools have been reset to defaults ({written} values written)");
    }
    for tool in &cli.reset_tool {
        match session.reset_tool(tool) {
            Ok(written) => info!("Reset {tool} ({written} values written)"),
            Err(e) => warn!("Unknown tool: {e}"),
        }
    }
    for section in &cli.unlock_all {
        let count = session.unlock_all(section);
        info!("All items in {section} unlocked ({count} items)");
    }
    for assignment in &assignments {
        let outcome = session.write(
            &assignment.section,
            &assignment.item,
            &assignment.attr,
            &assignment.value,
        );
        if !outcome.is_applied() {
            warn!("--set {assignment} changed nothing: {outcome:?}");
        }
    }

    let backup = if has_edits {
        let backup = session
            .persist(cli.set_version.as_deref())
            .unwrap_or_else(|e| {
                eprintln!("Error saving {}: {e}", path.display());
                process::exit(1);
            });
        Some(backup)
    } else {
        None
    };

    if cli.json {
        let json = render_json_selected(&session, &fields, JsonStyle::CanonicalV1);
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if let Some(backup) = backup
        && !fields.is_any_selected()
    {
        println!(
            "Saved {} (backup: {})",
            session.path().display(),
            backup.display()
        );
        return;
    }

    print!(
        "{}",
        render_text_selected(&session, &fields, TextStyle::Listing)
    );
}

fn parse_assignment(value: &str) -> Result<Assignment, String> {
    let (target, new_value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION/ITEM/ATTR=VALUE, got '{value}'"))?;

    let parts: Vec<&str> = target.split('/').collect();
    let [section, item, attr] = parts.as_slice() else {
        return Err(format!(
            "expected exactly three '/'-separated parts before '=', got '{target}'"
        ));
    };
    if [section, item, attr].iter().any(|p| p.is_empty()) {
        return Err(format!("empty path component in '{target}'"));
    }

    Ok(Assignment {
        section: (*section).to_string(),
        item: (*item).to_string(),
        attr: (*attr).to_string(),
        value: new_value.to_string(),
    })
}

fn allowed_range(assignment: &Assignment) -> Option<RangeInclusive<i32>> {
    let is_self = assignment.attr == SELF_ATTRIBUTE;
    if assignment.section == TOOL_SECTION && !is_self {
        Some(tool_defaults::param_range(&assignment.attr))
    } else if is_self && FLAG_SECTIONS.contains(&assignment.section.as_str()) {
        Some(tool_defaults::FLAG_RANGE)
    } else {
        None
    }
}

/// Tool parameters and unlock switches are bounded integers and are
/// returned with the parsed number as their value. Other targets pass
/// through untouched.
fn validate_assignment(assignment: &Assignment) -> Result<Assignment, String> {
    let Some(range) = allowed_range(assignment) else {
        return Ok(assignment.clone());
    };

    let value: i32 = assignment
        .value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an integer", assignment.value))?;
    if !range.contains(&value) {
        return Err(format!(
            "{} must be within {}..={}",
            assignment.attr,
            range.start(),
            range.end()
        ));
    }
    Ok(Assignment {
        value: value.to_string(),
        ..assignment.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignment_with_self_attribute() {
        let parsed = parse_assignment("reward/3/self=1").expect("valid assignment");
        assert_eq!(
            parsed,
            Assignment {
                section: "reward".to_string(),
                item: "3".to_string(),
                attr: "self".to_string(),
                value: "1".to_string(),
            }
        );
        assert_eq!(parsed.to_string(), "reward/3/self=1");
    }

    #[test]
    fn value_may_contain_equals_and_slashes() {
        let parsed = parse_assignment("valuable/a/self=x=y/z").expect("valid assignment");
        assert_eq!(parsed.value, "x=y/z");
    }

    #[test]
    fn rejects_malformed_assignments() {
        for bad in ["tool/gun/ammo", "tool/gun=1", "tool/gun/ammo/x=1", "tool//ammo=1"] {
            assert!(parse_assignment(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn tool_params_are_range_checked() {
        let ok = parse_assignment("tool/shotgun/ammo=2000").expect("valid assignment");
        assert!(validate_assignment(&ok).is_ok());

        let too_big = parse_assignment("tool/shotgun/ammo=2001").expect("valid assignment");
        assert!(validate_assignment(&too_big).is_err());

        let not_int = parse_assignment("tool/shotgun/enabled=yes").expect("valid assignment");
        assert!(validate_assignment(&not_int).is_err());

        let flag = parse_assignment("tool/shotgun/enabled=2").expect("valid assignment");
        assert!(validate_assignment(&flag).is_err());
    }

    #[test]
    fn checked_values_are_stored_as_parsed_numbers() {
        let padded = parse_assignment("tool/shotgun/ammo= 50 ").expect("valid assignment");
        let checked = validate_assignment(&padded).expect("50 is in range");
        assert_eq!(checked.value, "50");
        assert_eq!(checked.attr, "ammo");
    }

    #[test]
    fn unlock_switches_are_flags() {
        for ok in ["valuable/a/self=1", "characters/lee/self=0", "reward/3/self= 1"] {
            let parsed = parse_assignment(ok).expect("valid assignment");
            assert!(validate_assignment(&parsed).is_ok(), "{ok}");
        }
        for bad in ["valuable/a/self=7", "characters/lee/self=-1", "reward/3/self=yes"] {
            let parsed = parse_assignment(bad).expect("valid assignment");
            assert!(validate_assignment(&parsed).is_err(), "{bad}");
        }
    }

    #[test]
    fn other_sections_pass_through() {
        let cash = parse_assignment("cash/x/self= 41500 ").expect("valid assignment");
        assert_eq!(validate_assignment(&cash), Ok(cash.clone()));
        let tool_self = parse_assignment("tool/gun/self=x").expect("valid assignment");
        assert!(validate_assignment(&tool_self).is_ok());
    }
}
