//! Reset command implementation.

use bnctl_core::device::reset;

use super::{target_device, Context};
use crate::cli::ResetArgs;
use crate::error::CliError;

/// Run the reset command
pub async fn run_reset(args: ResetArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let transport = ctx.transport().await?;
    let device = target_device(&args.target);
    let target = device.mac.to_string();

    if let Err(e) = reset(&transport, &device).await {
        println!(
            "{}",
            formatter.format_result("reset", &target, false, "Reset failed!")
        );
        return Err(e.into());
    }

    println!(
        "{}",
        formatter.format_result("reset", &target, true, "Reset succeeded!")
    );
    Ok(())
}
