//! Read command implementation

use crate::cli::ReadCli;
use crate::error::ToolError;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use spiflash_core::config::{ReadConfig, SpeedMhz};
use spiflash_core::reader::{read_flash, ReadProgress};
use spiflash_core::transport::SpiTransport;
use spiflash_linux_spi::{LinuxSpi, LinuxSpiConfig, SpiModeFlags};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Options for a bulk read
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Bytes to read from address 0
    pub length: usize,
    /// Clock for every read transfer
    pub speed: SpeedMhz,
    /// Output file, overwritten if it exists
    pub output: PathBuf,
    /// Maximum data bytes per transfer
    pub max_chunk: usize,
}

impl From<&ReadCli> for ReadOptions {
    fn from(cli: &ReadCli) -> Self {
        Self {
            length: cli.length,
            speed: cli.speed,
            output: cli.output.clone(),
            max_chunk: cli.chunk_size,
        }
    }
}

impl ReadOptions {
    fn read_config(&self) -> ReadConfig {
        ReadConfig::default()
            .with_max_chunk(self.max_chunk)
            .with_speed(self.speed)
    }
}

/// In-place `Bytes read: N / TOTAL` counter on standard output
///
/// On a terminal the counter is an indicatif bar. indicatif draws nothing
/// when stdout is not a terminal, so output piped or redirected gets plain
/// `\rBytes read: N / TOTAL` lines instead.
pub struct CounterProgress {
    sink: CounterSink,
    total: usize,
    bytes_read: usize,
}

enum CounterSink {
    Bar(ProgressBar),
    Plain(Box<dyn Write + Send>),
    Hidden,
}

impl CounterProgress {
    /// Create a counter on stdout
    pub fn stdout() -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stdout());
        if pb.is_hidden() {
            log::debug!("stdout is not a terminal, printing plain progress");
            return Self::with_writer(Box::new(io::stdout()));
        }
        pb.set_style(
            ProgressStyle::with_template("Bytes read: {pos} / {len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self::with_sink(CounterSink::Bar(pb))
    }

    /// Create a counter that prints plain lines to `out`
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self::with_sink(CounterSink::Plain(out))
    }

    /// Create a counter that draws nowhere
    pub fn hidden() -> Self {
        Self::with_sink(CounterSink::Hidden)
    }

    fn with_sink(sink: CounterSink) -> Self {
        Self {
            sink,
            total: 0,
            bytes_read: 0,
        }
    }

    /// Bytes reported so far
    pub fn position(&self) -> u64 {
        self.bytes_read as u64
    }

    /// Close the counter line and announce the saved file
    ///
    /// Only called once the data is on disk; a failed read leaves the
    /// counter as it was.
    pub fn saved(&mut self, output: &Path) {
        let msg = format!("Data successfully read and saved to '{}'", output.display());
        match &mut self.sink {
            CounterSink::Bar(pb) => {
                pb.finish();
                println!();
                println!("{}", msg);
            }
            CounterSink::Plain(out) => {
                let _ = writeln!(out, "\n{}", msg);
                let _ = out.flush();
            }
            CounterSink::Hidden => {}
        }
    }

    fn draw(&mut self) {
        match &mut self.sink {
            CounterSink::Bar(pb) => {
                pb.set_length(self.total as u64);
                pb.set_position(self.bytes_read as u64);
            }
            CounterSink::Plain(out) => {
                let _ = write!(out, "\rBytes read: {} / {}", self.bytes_read, self.total);
                let _ = out.flush();
            }
            CounterSink::Hidden => {}
        }
    }
}

impl ReadProgress for CounterProgress {
    fn reading(&mut self, total_bytes: usize) {
        self.total = total_bytes;
        self.bytes_read = 0;
        if let CounterSink::Bar(_) = self.sink {
            self.draw();
        }
    }

    fn read_progress(&mut self, bytes_read: usize) {
        self.bytes_read = bytes_read;
        self.draw();
    }
}

/// Open and configure the device for reading
///
/// The handle's maximum speed is set to the requested speed; every transfer
/// carries it again on its own descriptor.
pub fn open_device(device: &str, speed: SpeedMhz) -> Result<LinuxSpi, ToolError> {
    let config = LinuxSpiConfig::new(device)
        .with_mode(SpiModeFlags::MODE_0)
        .with_speed(speed.to_hz());
    Ok(LinuxSpi::open(&config)?)
}

/// Read `opts.length` bytes and save them to `opts.output`
///
/// The file is written once, after every chunk has been fetched. A failed
/// transfer leaves the output path untouched.
pub fn run_read<T, P>(transport: &mut T, opts: &ReadOptions, progress: &mut P) -> Result<(), ToolError>
where
    T: SpiTransport + ?Sized,
    P: ReadProgress + ?Sized,
{
    let data = read_flash(transport, opts.length, opts.read_config(), progress)?;
    save_data(&opts.output, &data)?;
    log::info!("Wrote {} bytes to {}", data.len(), opts.output.display());
    Ok(())
}

/// Write the whole buffer to `path`, creating or truncating it
fn save_data(path: &Path, data: &[u8]) -> Result<(), ToolError> {
    std::fs::write(path, data).map_err(|e| ToolError::FileWrite {
        path: path.display().to_string(),
        source: e,
    })
}
