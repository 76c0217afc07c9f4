//! Uid command
//!
//! Usage: dirmap uid <TYPE> --set name=value... [--kind <KIND>] [--hidden]

use clap::Args;
use dirmap_core::{CreationInfo, UserKind, Variant};

use super::{parse_assignments, Context};

#[derive(Debug, Args)]
pub struct UidArgs {
    /// Object type, e.g. user or distlist
    pub variant: Variant,

    /// Attribute values of the new object (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    pub assignments: Vec<String>,

    /// User kind: standard, internal, group or resource
    #[arg(long)]
    pub kind: Option<UserKind>,

    /// Place a list or group with the internal objects
    #[arg(long)]
    pub hidden: bool,
}

/// Print the path a new object with the given attributes would get
pub fn execute(args: UidArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let server = ctx.server()?;
    let info = CreationInfo {
        kind: args.kind,
        visible: args.hidden.then_some(false),
    };
    let changes = parse_assignments(&args.assignments)?;
    let object = server.create_object(args.variant, changes, &info)?;
    println!("{}", object.path());
    Ok(())
}
