#[macro_use]
extern crate log;

use std::{io, process};

use clap::Parser;
use simple_logger::SimpleLogger;
use sinwave::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = SimpleLogger::new().with_level(cli.log_level()).init() {
        eprintln!("logger: {}", e);
    }

    let stdout = io::stdout();
    let stderr = io::stderr();
    match sinwave::run(&cli, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(stats) => debug!("{:?}", stats),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
