//! Functions command handler

use crate::error::Result;
use crate::output::OutputWriter;
use morphic_core::FunctionRegistry;

/// Handle the functions command
pub fn handle_functions(output: &mut OutputWriter) -> Result<()> {
    let registry = FunctionRegistry::with_builtins();
    let names: Vec<&str> = registry.names().collect();

    if !output.is_human() {
        return output.data(&names);
    }

    output.section("Built-in functions")?;
    for name in names {
        output.writeln(name)?;
    }
    Ok(())
}
