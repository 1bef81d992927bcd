//! spiflash - Identify and dump SPI NOR flash chips
//!
//! Two small tools share this library:
//!
//! - `spidetect` reads the JEDEC ID (0x9F) and prints manufacturer, memory
//!   type and capacity
//! - `spiread` reads the first N bytes of the chip in bounded chunks and
//!   saves them to a raw binary file
//!
//! Both talk to the chip through the Linux spidev transport in
//! `spiflash-linux-spi`; everything above the transport lives in
//! `spiflash-core` and is tested against the in-memory emulator in
//! `spiflash-dummy`.

pub mod cli;
pub mod commands;
pub mod error;

pub use error::ToolError;

/// Initialize the logger
///
/// Defaults to `warn` so the tools' own output is left alone; `RUST_LOG`
/// and each `-v` raise it.
pub fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }

    builder.init();
}
