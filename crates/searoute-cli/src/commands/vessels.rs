//! Vessels command handler.

use anyhow::Result;

use crate::output::OutputFormat;

/// List the supported vessel classes and their routing speeds.
pub fn handle_list_vessels(format: OutputFormat) -> Result<()> {
    format.render_vessels()
}
