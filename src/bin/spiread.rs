//! spiread - dump the start of a SPI flash chip to a file
//!
//! Usage: spiread -l <length> [-s <speed MHz>] [-o <output file>]

use spiflash::cli::{parse_or_exit, ReadCli};
use spiflash::commands::read::{self, CounterProgress, ReadOptions};
use spiflash::ToolError;
use std::process::ExitCode;

fn run(cli: &ReadCli) -> Result<(), ToolError> {
    let opts = ReadOptions::from(cli);
    let mut spi = read::open_device(&cli.device, opts.speed)?;

    let mut progress = CounterProgress::stdout();
    read::run_read(&mut spi, &opts, &mut progress)?;
    progress.saved(&opts.output);
    Ok(())
}

fn main() -> ExitCode {
    let cli: ReadCli = parse_or_exit();
    spiflash::init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("spiread: {}", e);
            ExitCode::FAILURE
        }
    }
}
