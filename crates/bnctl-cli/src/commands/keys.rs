//! Key listing and dump template commands.

use super::Context;
use crate::error::CliError;

/// Run the keys command
pub fn run_keys(ctx: &Context) -> Result<(), CliError> {
    println!("{}", ctx.formatter().format_keys(ctx.family));
    Ok(())
}

/// Run the template command
pub fn run_template(ctx: &Context) -> Result<(), CliError> {
    let template = ctx.family.dump_template();
    if ctx.json {
        println!("{}", ctx.formatter().format_message(&template));
    } else {
        print!("{}", template);
    }
    Ok(())
}
