//! Factory values for tool parameters, as shipped with Teardown 2.x.
//!
//! Shells use this table for "reset tool" actions; it never decides which
//! parameters exist in a save. A reset only touches parameters that are both
//! listed here and present in the file.

use std::ops::RangeInclusive;

struct ToolDefault {
    tool: &'static str,
    params: &'static [(&'static str, i32)],
}

#[rustfmt::skip]
const TOOL_DEFAULTS: &[ToolDefault] = &[
    ToolDefault { tool: "sledge",       params: &[("enabled", 1)] },
    ToolDefault { tool: "spraycan",     params: &[("enabled", 1)] },
    ToolDefault { tool: "extinguisher", params: &[("enabled", 1)] },
    ToolDefault { tool: "blowtorch",    params: &[("enabled", 1), ("ammo", 60)] },
    ToolDefault { tool: "shotgun",      params: &[("enabled", 1), ("ammo", 96), ("range", 60), ("damage", 5)] },
    ToolDefault { tool: "plank",        params: &[("enabled", 1), ("ammo", 64), ("width", 5), ("length", 64)] },
    ToolDefault { tool: "pipebomb",     params: &[("enabled", 1), ("ammo", 36), ("damage", 4)] },
    ToolDefault { tool: "gun",          params: &[("enabled", 1), ("ammo", 36), ("range", 100), ("damage", 3)] },
    ToolDefault { tool: "bomb",         params: &[("enabled", 1), ("ammo", 36), ("damage", 6)] },
    ToolDefault { tool: "wire",         params: &[("enabled", 1), ("ammo", 24), ("stretch", 5)] },
    ToolDefault { tool: "rocket",       params: &[("enabled", 1), ("damage", 5), ("ammo", 24)] },
    ToolDefault { tool: "leafblower",   params: &[("enabled", 1), ("power", 50)] },
    ToolDefault { tool: "booster",      params: &[("enabled", 1), ("ammo", 24), ("power", 400), ("time", 8)] },
    ToolDefault { tool: "turbo",        params: &[("enabled", 1), ("ammo", 24), ("power", 400)] },
    ToolDefault { tool: "explosive",    params: &[("enabled", 1), ("damage", 8), ("ammo", 16)] },
    ToolDefault { tool: "rifle",        params: &[("enabled", 1), ("ammo", 18)] },
    ToolDefault { tool: "steroid",      params: &[("enabled", 1), ("ammo", 4), ("time", 6)] },
];

/// Default parameter values for a tool, in table order.
pub fn lookup(tool: &str) -> Option<&'static [(&'static str, i32)]> {
    TOOL_DEFAULTS
        .iter()
        .find(|d| d.tool == tool)
        .map(|d| d.params)
}

/// Every tool with known defaults, in table order.
pub fn entries() -> impl Iterator<Item = (&'static str, &'static [(&'static str, i32)])> {
    TOOL_DEFAULTS.iter().map(|d| (d.tool, d.params))
}

/// On/off switches: tool `enabled` flags and the own values of
/// valuables, characters and reward ranks.
pub const FLAG_RANGE: RangeInclusive<i32> = 0..=1;

/// Accepted values for a tool parameter. Shells validate against this
/// before writing; the gateway itself stores whatever it is given.
pub fn param_range(attr: &str) -> RangeInclusive<i32> {
    match attr {
        "enabled" => FLAG_RANGE,
        "ammo" => 0..=2000,
        "damage" | "range" | "power" => 0..=500,
        _ => 0..=100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_params_in_table_order() {
        assert_eq!(lookup("blowtorch"), Some(&[("enabled", 1), ("ammo", 60)][..]));
        let shotgun = lookup("shotgun").expect("shotgun defaults");
        let keys: Vec<&str> = shotgun.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["enabled", "ammo", "range", "damage"]);
    }

    #[test]
    fn unknown_tool_has_no_defaults() {
        assert_eq!(lookup("laser"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn every_tool_is_enabled_by_default_and_within_range() {
        assert_eq!(entries().count(), 17);
        for (tool, params) in entries() {
            assert_eq!(params.first(), Some(&("enabled", 1)), "{tool}");
            for (attr, value) in params {
                assert!(param_range(attr).contains(value), "{tool}.{attr}={value}");
            }
        }
    }

    #[test]
    fn ranges_follow_parameter_kind() {
        assert_eq!(param_range("ammo"), 0..=2000);
        assert_eq!(param_range("power"), 0..=500);
        assert_eq!(param_range("stretch"), 0..=100);
        assert_eq!(param_range("enabled"), 0..=1);
    }
}
