//! Version command implementation.

use anyhow::Result;
use serde::Serialize;

use super::CommandContext;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    library: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if ctx.json {
        return ctx.print_json(&VersionOutput {
            version,
            build,
            library: gtm_lib::VERSION,
        });
    }

    println!("gtmx version {version} ({build})");
    Ok(())
}
