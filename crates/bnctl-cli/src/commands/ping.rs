//! Ping command implementation.

use bnctl_core::device::ping;

use super::{pause, target_device, Context};
use crate::cli::PingArgs;
use crate::error::CliError;

/// Run the ping command
pub async fn run_ping(args: PingArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let transport = ctx.transport().await?;
    let device = target_device(&args.target);
    let target = device.mac.to_string();

    loop {
        match ping(&transport, &device).await {
            Ok(()) => println!(
                "{}",
                formatter.format_result("ping", &target, true, "Ping succeeded!")
            ),
            Err(e) if args.repeat.continuous => {
                tracing::debug!(error = %e, "Ping failed");
                println!(
                    "{}",
                    formatter.format_result("ping", &target, false, "Ping failed!")
                );
            }
            Err(e) => {
                println!(
                    "{}",
                    formatter.format_result("ping", &target, false, "Ping failed!")
                );
                return Err(e.into());
            }
        }

        if !pause(&args.repeat).await {
            break;
        }
    }

    Ok(())
}
