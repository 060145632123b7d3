//! Scan command implementation.

use bnctl_core::discovery::discover;

use super::{pause, Context};
use crate::cli::ScanArgs;
use crate::error::CliError;

/// Run the scan command
pub async fn run_scan(args: ScanArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let transport = ctx.transport().await?;

    loop {
        let devices = discover(&transport, ctx.family, args.host, ctx.timeout).await?;
        println!("{}", formatter.format_devices(&devices));

        if !pause(&args.repeat).await {
            break;
        }
    }

    Ok(())
}
