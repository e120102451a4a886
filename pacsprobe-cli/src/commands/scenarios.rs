//! `pacsprobe scenarios` command handler

use std::io::Write;

use serde::Serialize;

use pacsprobe_scenario::scenario::{self, BreakLeg, EndpointRole, IdentifierClass, Scenario};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scenarios` command.
pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    let table = ScenarioTable {
        scenarios: scenario::all().to_vec(),
    };
    writer.render(&table)
}

/// The full scenario matrix.
#[derive(Serialize)]
pub struct ScenarioTable {
    pub scenarios: Vec<Scenario>,
}

impl Render for ScenarioTable {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{:<3} {:<5} {:<10} {:<17} {:<9} {:<32} {}",
            "#".bold(),
            "Tool".bold(),
            "Identifier".bold(),
            "Unknown name".bold(),
            "Break".bold(),
            "Rule".bold(),
            "Intent".bold()
        )?;
        writeln!(w, "{}", "-".repeat(110))?;

        for s in &self.scenarios {
            writeln!(
                w,
                "{:<3} {:<5} {:<10} {:<17} {:<9} {:<32} {}",
                s.index,
                s.tool.as_str(),
                identifier_label(s.identifier),
                s.unknown_endpoint.map_or("-", endpoint_label),
                s.break_leg.map_or("-", break_label),
                s.rule.to_string(),
                s.intent
            )?;
        }

        Ok(())
    }
}

fn identifier_label(class: IdentifierClass) -> &'static str {
    match class {
        IdentifierClass::HasData => "has-data",
        IdentifierClass::NoData => "empty",
        IdentifierClass::Invalid => "invalid",
    }
}

fn endpoint_label(role: EndpointRole) -> &'static str {
    match role {
        EndpointRole::SelfName => "self",
        EndpointRole::Remote => "remote",
        EndpointRole::MoveDestination => "move-destination",
    }
}

fn break_label(leg: BreakLeg) -> &'static str {
    match leg {
        BreakLeg::Outbound => "outbound",
        BreakLeg::Inbound => "inbound",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ScenarioTable {
        ScenarioTable {
            scenarios: scenario::all().to_vec(),
        }
    }

    #[test]
    fn test_scenario_table_render_text() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        table()
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 13, "header, rule, and 11 scenarios");
        assert!(lines[2].starts_with("1 "));
        assert!(lines[8].contains("outbound"), "scenario 7 breaks outbound");
        assert!(lines[9].contains("inbound"), "scenario 8 breaks inbound");
        assert!(lines[12].contains("move-destination"));
        assert!(output.contains("MoveDestinationUnknown"));
    }

    #[test]
    fn test_scenario_table_json_serialization() {
        let json = serde_json::to_value(table()).expect("JSON serialization should succeed");
        let scenarios = json["scenarios"].as_array().expect("should be array");
        assert_eq!(scenarios.len(), 11);
        assert_eq!(scenarios[0]["tool"], "echo");
        assert_eq!(scenarios[6]["break_leg"], "outbound");
        assert_eq!(scenarios[6]["identifier"], "invalid");
    }
}
