use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use teardown_core::core_api::{SectionValues, Session, TOOL_SECTION, ToolParams, ToolTable};

const NAME_COL_WIDTH: usize = 24;
const PARAM_COL_WIDTH: usize = 14;
const MISSING_VALUE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Listing,
}

/// Which parts of a save to render. An empty selection means "everything".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub info: bool,
    pub section_names: bool,
    pub tools: bool,
    pub sections: Vec<String>,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.info || self.section_names || self.tools || !self.sections.is_empty()
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session)),
    }
}

pub fn render_text(session: &Session, style: TextStyle) -> String {
    match style {
        TextStyle::Listing => render_listing(session),
    }
}

pub fn render_text_selected(session: &Session, fields: &FieldSelection, style: TextStyle) -> String {
    match style {
        TextStyle::Listing => render_selected_listing(session, fields),
    }
}

/// One `name value` row per item.
pub fn render_section_text(name: &str, values: &SectionValues) -> String {
    let mut out = String::new();
    let _ = writeln!(out, " ::: {name} :::");
    if values.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for (item, value) in values {
        let _ = writeln!(
            out,
            "  {:<NAME_COL_WIDTH$}{}",
            item,
            value.as_deref().unwrap_or(MISSING_VALUE)
        );
    }
    out
}

/// One row per tool with its parameters as `key=value` columns.
pub fn render_tools_text(tools: &ToolTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, " ::: {TOOL_SECTION} :::");
    if tools.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for (tool, params) in tools {
        let mut line = format!("  {tool:<NAME_COL_WIDTH$}");
        for (key, value) in params {
            let cell = format!("{key}={}", value.as_deref().unwrap_or(MISSING_VALUE));
            let _ = write!(line, "{cell:<PARAM_COL_WIDTH$}");
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn section_to_json(values: &SectionValues) -> JsonValue {
    JsonValue::Object(
        values
            .iter()
            .map(|(item, value)| (item.clone(), optional_string(value.as_deref())))
            .collect(),
    )
}

pub fn tools_to_json(tools: &ToolTable) -> JsonValue {
    JsonValue::Object(
        tools
            .iter()
            .map(|(tool, params)| (tool.clone(), params_to_json(params)))
            .collect(),
    )
}

fn params_to_json(params: &ToolParams) -> JsonValue {
    JsonValue::Object(
        params
            .iter()
            .map(|(key, value)| (key.clone(), optional_string(value.as_deref())))
            .collect(),
    )
}

fn optional_string(value: Option<&str>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v.to_string()),
        None => JsonValue::Null,
    }
}

fn info_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();
    out.insert(
        "path".to_string(),
        JsonValue::String(snapshot.path.display().to_string()),
    );
    out.insert("version".to_string(), JsonValue::String(snapshot.version));
    out.insert(
        "supported_version".to_string(),
        JsonValue::Bool(snapshot.supported_version),
    );
    out.insert("tool_count".to_string(), JsonValue::from(snapshot.tool_count));
    out
}

fn section_names_json(session: &Session) -> JsonValue {
    JsonValue::Array(
        session
            .section_names()
            .into_iter()
            .map(JsonValue::String)
            .collect(),
    )
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let mut out = info_json(session);
    out.insert("sections".to_string(), section_names_json(session));
    out.insert("tools".to_string(), tools_to_json(&session.read_tools()));

    let mut sections = JsonMap::new();
    for name in session.section_names() {
        if name == TOOL_SECTION {
            continue;
        }
        let values = section_to_json(&session.read_section(&name));
        sections.insert(name, values);
    }
    out.insert("values".to_string(), JsonValue::Object(sections));
    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    if !fields.is_any_selected() {
        return default_json(session);
    }

    let mut out = JsonMap::new();
    if fields.info {
        out.extend(info_json(session));
    }
    if fields.section_names {
        out.insert("sections".to_string(), section_names_json(session));
    }
    if fields.tools {
        out.insert("tools".to_string(), tools_to_json(&session.read_tools()));
    }
    if !fields.sections.is_empty() {
        let mut sections = JsonMap::new();
        for name in &fields.sections {
            sections.insert(name.clone(), section_to_json(&session.read_section(name)));
        }
        out.insert("values".to_string(), JsonValue::Object(sections));
    }
    out
}

fn render_info(session: &Session) -> String {
    let snapshot = session.snapshot();
    let mut out = String::new();
    let _ = writeln!(out, "{:^60}", "TEARDOWN SAVE");
    let _ = writeln!(out, "  File:     {}", snapshot.path.display());
    let support = if snapshot.supported_version {
        ""
    } else {
        "  (older than 2.0.0 or unknown)"
    };
    let _ = writeln!(out, "  Version:  {}{support}", snapshot.version);
    let _ = writeln!(out, "  Sections: {}", snapshot.sections.join(", "));
    out
}

fn render_listing(session: &Session) -> String {
    let mut out = render_info(session);
    out.push('\n');
    out.push_str(&render_tools_text(&session.read_tools()));
    for name in session.section_names() {
        if name == TOOL_SECTION {
            continue;
        }
        out.push('\n');
        out.push_str(&render_section_text(&name, &session.read_section(&name)));
    }
    out
}

fn render_selected_listing(session: &Session, fields: &FieldSelection) -> String {
    if !fields.is_any_selected() {
        return render_listing(session);
    }

    let mut blocks = Vec::new();
    if fields.info {
        blocks.push(render_info(session));
    }
    if fields.section_names {
        let mut names = String::new();
        for name in session.section_names() {
            let _ = writeln!(names, "{name}");
        }
        blocks.push(names);
    }
    if fields.tools {
        blocks.push(render_tools_text(&session.read_tools()));
    }
    for name in &fields.sections {
        blocks.push(render_section_text(name, &session.read_section(name)));
    }
    blocks.join("\n")
}
