//! List command
//!
//! Usage: dirmap list <TYPE> [--sort <ATTR>] [--from N] [--to N]

use clap::Args;
use dirmap_core::{ListParams, Variant};

use super::Context;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Object type to list
    pub variant: Variant,

    /// Sort attribute (default: the type's own)
    #[arg(long)]
    pub sort: Option<String>,

    /// First position of the listing to show
    #[arg(long)]
    pub from: Option<usize>,

    /// Position after the last one to show
    #[arg(long)]
    pub to: Option<usize>,

    /// Group whose members are left out, relative to the base
    #[arg(long)]
    pub exclude_group: Option<String>,
}

/// Print the path of every listed object, one per line
pub fn execute(args: ListArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let server = ctx.populated_server()?;
    let params = ListParams {
        sort: args.sort,
        from: args.from,
        to: args.to,
        required_group: args.exclude_group,
        ..ListParams::default()
    };
    let objects = server.list_objects(args.variant, &params)?;
    // The listing only carries the hints; paging happens here
    let from = args.from.unwrap_or(0);
    let to = args.to.unwrap_or(usize::MAX);
    for object in objects.iter().skip(from).take(to.saturating_sub(from)) {
        println!("{}", object.path());
    }
    Ok(())
}
