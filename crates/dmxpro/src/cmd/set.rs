use std::io::Write;

use dmxpro_controller::{Controller, Submission, SubmitAfter};

use crate::cmd::universe::print_submission;
use crate::cmd::{ChannelValue, SetArgs};
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let (port, mut controller) = super::open_controller(&args.target, &args.controller)?;
    let submission = apply_channels(&mut controller, &args.channels)?;
    print_submission(&port, submission, format);
    Ok(SUCCESS)
}

fn apply_channels<W: Write>(
    controller: &mut Controller<W>,
    channels: &[ChannelValue],
) -> CliResult<Submission> {
    // Validate every assignment before anything is sent.
    for cv in channels {
        controller
            .set_channel_checked(cv.channel, cv.value, SubmitAfter::Never)
            .map_err(|err| controller_error(&format!("channel {}", cv.channel), err))?;
    }

    // Channels left at zero still have to reach the widget.
    controller
        .submit_full()
        .map_err(|err| controller_error("submit", err))
}
