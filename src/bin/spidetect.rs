//! spidetect - print the JEDEC ID of the SPI flash chip
//!
//! Usage: spidetect [-D /dev/spidevX.Y]

use spiflash::cli::{parse_or_exit, DetectCli};
use spiflash::commands::detect;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli: DetectCli = parse_or_exit();
    spiflash::init_logging(cli.verbose);

    let result = detect::open_device(&cli.device).and_then(|mut spi| {
        let mut stdout = std::io::stdout().lock();
        detect::run_detect(&mut spi, &mut stdout)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("spidetect: {}", e);
            ExitCode::FAILURE
        }
    }
}
