//! Show command
//!
//! Usage: dirmap show <PATH> [--attr <NAME>...]

use clap::Args;
use dirmap_core::Value;

use super::Context;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Path of the entry
    pub path: String,

    /// Only these attributes (repeatable); default is every declared one
    #[arg(short, long = "attr")]
    pub attributes: Vec<String>,
}

/// Print the type and the non-empty attribute values of an entry
pub fn execute(args: ShowArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let server = ctx.populated_server()?;
    let object = server.fetch(&args.path)?;

    let names: Vec<String> = if args.attributes.is_empty() {
        object
            .def()
            .attributes
            .iter()
            .map(|spec| spec.external.clone())
            .collect()
    } else {
        args.attributes.iter().map(|a| a.to_lowercase()).collect()
    };

    println!("type: {}", object.variant());
    for name in names {
        match object.get(&name)? {
            Value::Empty => {}
            value => println!("{}: {}", name, value),
        }
    }
    Ok(())
}
