//! Filter command
//!
//! Usage: dirmap filter [<CRITERIA_JSON>] [--type <TYPE>]

use clap::Args;
use dirmap_core::criteria::legacy::from_legacy;
use dirmap_core::{Criteria, DirectoryObject, Variant};

use super::Context;

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Criteria in the AND/OR map format; omitted means match everything
    pub criteria: Option<String>,

    /// Restrict to the listing filter of an object type
    #[arg(short = 't', long = "type")]
    pub variant: Option<Variant>,
}

/// Print the native filter a search with these criteria would send
pub fn execute(args: FilterArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let server = ctx.server()?;
    let criteria = match args.criteria.as_deref() {
        Some(json) => from_legacy(&serde_json::from_str(json)?)?,
        None => Criteria::all(),
    };
    let criteria = match args.variant {
        Some(variant) => {
            let def = server.registry().get(variant)?;
            DirectoryObject::list_filter(&def, Some(criteria))
        }
        None => criteria,
    };
    println!("{}", server.search_filter(&criteria)?);
    Ok(())
}
