//! Render command handler

use crate::cli::RenderArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;
use std::collections::BTreeMap;

/// Machine-readable form of a rendered closure
#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub name: String,
    pub signature: String,
    pub source: String,
    /// Captured names with a description of their values
    pub captures: BTreeMap<String, String>,
}

/// Handle the render command
pub fn handle_render(args: RenderArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let closure = super::load_converter(&args.plan_file, config)?;

    let report = RenderReport {
        name: closure.name().to_string(),
        signature: closure.signature().to_string(),
        source: closure.source().to_string(),
        captures: closure
            .captures()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    };

    if !output.is_human() {
        return output.data(&report);
    }

    output.write(&report.source)?;
    if args.show_captures || config.output.show_captures {
        output.section("Captures")?;
        if report.captures.is_empty() {
            output.info("no captured names")?;
        }
        for (name, value) in &report.captures {
            output.writeln(&format!("{} = {}", name, value))?;
        }
    }
    Ok(())
}
