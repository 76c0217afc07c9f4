//! Type command
//!
//! Usage: dirmap type <PATH>

use clap::Args;

use super::Context;

#[derive(Debug, Args)]
pub struct TypeArgs {
    /// Path of the entry
    pub path: String,
}

/// Print the variant the entry at the path resolves to
pub fn execute(args: TypeArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let server = ctx.populated_server()?;
    let variant = server.determine_type(&args.path)?;
    println!("{}", variant);
    Ok(())
}
