use std::io::Write;

use dmxpro_controller::{Controller, Submission, SubmitAfter};
use serde::Serialize;

use crate::cmd::UniverseArgs;
use crate::exit::{controller_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct SubmissionOutput<'a> {
    port: &'a str,
    sent: bool,
    first_channel: Option<usize>,
    last_channel: Option<usize>,
    frame_bytes: usize,
}

/// Set the whole universe to `value` and send it.
pub fn run(args: UniverseArgs, value: u8, format: OutputFormat) -> CliResult<i32> {
    let (port, mut controller) = super::open_controller(&args.target, &args.controller)?;
    let submission = fill_universe(&mut controller, value)?;
    print_submission(&port, submission, format);
    Ok(SUCCESS)
}

// A fresh controller has no idea what the widget is outputting, so the
// whole universe goes out even under dynamic submission.
fn fill_universe<W: Write>(controller: &mut Controller<W>, value: u8) -> CliResult<Submission> {
    controller
        .set_all_channels(value, SubmitAfter::Never)
        .map_err(|err| controller_error("set channels", err))?;
    controller
        .submit_full()
        .map_err(|err| controller_error("submit", err))
}

pub fn print_submission(port: &str, submission: Submission, format: OutputFormat) {
    let out = match submission {
        Submission::Sent { range, bytes } => SubmissionOutput {
            port,
            sent: true,
            first_channel: Some(*range.channels().start()),
            last_channel: Some(*range.channels().end()),
            frame_bytes: bytes,
        },
        Submission::Skipped => SubmissionOutput {
            port,
            sent: false,
            first_channel: None,
            last_channel: None,
            frame_bytes: 0,
        },
    };

    let channels = match (out.first_channel, out.last_channel) {
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => "none".to_string(),
    };
    let fields = [
        ("port", out.port.to_string()),
        ("channels", channels),
        ("frame_bytes", out.frame_bytes.to_string()),
    ];
    print_record(&out, &fields, format);
}
