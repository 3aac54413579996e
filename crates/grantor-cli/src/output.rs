//! Shared output helpers for human and JSON modes.
//!
//! JSON mode wraps responses in `{ data }` and respects `--pretty`. Human mode
//! prints the command's own rendering when it has one.

use anyhow::Result;
use serde_json::{Value, json};

use crate::opts::GlobalOpts;

pub fn print_success(opts: &GlobalOpts, data: Value, human: Option<String>) -> Result<()> {
    if opts.pretty || opts.json {
        let root = json!({ "data": data });
        if opts.pretty {
            println!("{}", serde_json::to_string_pretty(&root)?);
        } else {
            println!("{}", serde_json::to_string(&root)?);
        }
        return Ok(());
    }
    match (human, data) {
        (Some(text), _) => print!("{text}"),
        (None, Value::String(s)) => println!("{s}"),
        (None, other) => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}
