use dmxpro_transport::list_ports;

use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat, PortOutput};

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let ports = list_ports().map_err(|err| transport_error("list ports", err))?;
    let rows: Vec<PortOutput> = ports.iter().map(PortOutput::from).collect();
    print_ports(&rows, format);
    Ok(SUCCESS)
}
