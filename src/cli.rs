//! CLI argument parsing

use clap::error::ErrorKind;
use clap::Parser;
use spiflash_core::config::{SpeedMhz, DEFAULT_MAX_CHUNK};
use spiflash_core::spi::ADDRESS_SPACE_3B;
use spiflash_linux_spi::DEFAULT_DEVICE;
use std::path::PathBuf;

/// Parse a string as a hex or decimal usize
fn parse_hex_usize(s: &str) -> Result<usize, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<usize>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse the read length: positive and within the 24-bit address space
pub fn parse_length(s: &str) -> Result<usize, String> {
    match parse_hex_usize(s)? {
        0 => Err("Invalid length specified".to_string()),
        len if len > ADDRESS_SPACE_3B => Err(format!(
            "Invalid length specified. Maximum is {} bytes.",
            ADDRESS_SPACE_3B
        )),
        len => Ok(len),
    }
}

/// Parse the SPI speed in MHz
pub fn parse_speed(s: &str) -> Result<SpeedMhz, String> {
    let mhz = s
        .parse::<u32>()
        .map_err(|_| "Invalid speed specified. Maximum is 133 MHz.".to_string())?;
    SpeedMhz::new(mhz).map_err(|e| e.to_string())
}

/// Parse the maximum chunk size
fn parse_chunk_size(s: &str) -> Result<usize, String> {
    match parse_hex_usize(s)? {
        0 => Err("Chunk size must be at least 1 byte".to_string()),
        n => Ok(n),
    }
}

/// Parse command-line arguments, exiting with status 1 on any problem
///
/// `-h` prints the usage to standard error and also exits with status 1.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => {
            print!("{}", e.render());
            std::process::exit(0);
        }
        Err(e) => {
            eprint!("{}", e.render());
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "spidetect")]
#[command(author, version, about = "Identify a SPI flash chip via JEDEC Read-ID", long_about = None)]
pub struct DetectCli {
    /// spidev device node
    #[arg(short = 'D', long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Parser, Debug)]
#[command(name = "spiread")]
#[command(
    author,
    version,
    about = "Read data from SPI flash chip and save to a .bin file",
    long_about = None
)]
pub struct ReadCli {
    /// Length of data to read in bytes (decimal or 0x hex)
    #[arg(short, long, value_parser = parse_length)]
    pub length: usize,

    /// SPI speed in MHz (1-133)
    #[arg(short, long, default_value = "5", value_parser = parse_speed)]
    pub speed: SpeedMhz,

    /// Output file name
    #[arg(short, long, default_value = "output.bin")]
    pub output: PathBuf,

    /// spidev device node
    #[arg(short = 'D', long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Maximum data bytes per SPI transfer
    #[arg(short = 'c', long, default_value_t = DEFAULT_MAX_CHUNK, value_parser = parse_chunk_size)]
    pub chunk_size: usize,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
