//! Man page generator for spidetect and spiread
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use spiflash::cli::{DetectCli, ReadCli};
use std::fs;
use std::path::{Path, PathBuf};

fn render(cmd: clap::Command, output_dir: &Path) -> std::io::Result<PathBuf> {
    let output_path = output_dir.join(format!("{}.1", cmd.get_name()));
    let man = clap_mangen::Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(&output_path, buffer)?;
    Ok(output_path)
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Default to ./man directory
    let output_dir = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("man")
    };

    fs::create_dir_all(&output_dir)?;

    for cmd in [DetectCli::command(), ReadCli::command()] {
        let path = render(cmd, &output_dir)?;
        println!("Man page generated at: {}", path.display());
    }

    println!("\nTo view a man page:");
    println!("  man -l {}", output_dir.join("spiread.1").display());

    Ok(())
}
