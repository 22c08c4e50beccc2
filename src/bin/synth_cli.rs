use std::{error::Error, io, time::Duration};

use clap::Parser;
use windfreak::{
    Command, Connection, Connector, SerialConnector,
    cli::{CliError, FlushingWriter, execute},
    prompt,
    sim::SimulatedSynth,
    synth_nv_pro::attribute_table,
};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Serial device path, e.g. /dev/ttyACM0
    path: String,
    /// Serial baud rate
    #[arg(long, default_value_t = 115_200)]
    baud: u32,
    /// Reply timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
    /// Talk to an in-process simulated synthesizer instead of a serial port
    #[arg(long)]
    simulate: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    if cli.simulate {
        let conn = Connection::new(cli.path, SimulatedSynth::synth_nv_pro(), attribute_table())?;
        run(conn)
    } else {
        let connector =
            SerialConnector::new(cli.baud).with_timeout(Duration::from_secs(cli.timeout));
        let conn = Connection::new(cli.path, connector, attribute_table())?;
        run(conn)
    }
}

fn run<C: Connector>(mut conn: Connection<C>) -> Result<(), Box<dyn Error>> {
    let stdio = io::stdin();
    let stdout = io::stdout();

    loop {
        let cmd = match prompt(stdio.lock(), FlushingWriter::new(stdout.lock())) {
            Ok(c) => c,
            Err(CliError::Command(e)) => {
                eprintln!("{e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let exit = cmd == Command::Exit;
        match execute(&mut conn, cmd) {
            Ok(None) => {}
            Ok(Some(out)) => println!("{out}"),
            Err(e) => eprintln!("error: {e}"),
        }
        if exit {
            break;
        }
    }

    Ok(())
}
