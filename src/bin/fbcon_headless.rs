//! Mochi Headless Framebuffer Console Runner
//!
//! Renders a byte stream into an in-memory framebuffer for testing and
//! automation. Reads input from stdin or a file, prints the resulting
//! terminal state and any device status replies, and can dump the pixels
//! as a binary PGM image.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use mochi_fbcon::blit::SoftwareAccelerator;
use mochi_fbcon::core::{CellHeight, FramebufferInfo};
use mochi_fbcon::renderer::{FontSet, FontTable};
use mochi_fbcon::{Console, ConsoleConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut width = 640u32;
    let mut height = 480u32;
    let mut pitch: Option<u32> = None;
    let mut cell_height: Option<u32> = None;
    let mut config_file: Option<String> = None;
    let mut font_file: Option<String> = None;
    let mut pgm_file: Option<String> = None;
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-W" | "--width" => {
                i += 1;
                if i < args.len() {
                    width = args[i].parse().unwrap_or(640);
                }
            },
            "-H" | "--height" => {
                i += 1;
                if i < args.len() {
                    height = args[i].parse().unwrap_or(480);
                }
            },
            "-p" | "--pitch" => {
                i += 1;
                if i < args.len() {
                    pitch = args[i].parse().ok();
                }
            },
            "-s" | "--cell-height" => {
                i += 1;
                if i < args.len() {
                    cell_height = args[i].parse().ok();
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            },
            "--font" => {
                i += 1;
                if i < args.len() {
                    font_file = Some(args[i].clone());
                }
            },
            "--pgm" => {
                i += 1;
                if i < args.len() {
                    pgm_file = Some(args[i].clone());
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(args[i].clone());
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    // Load configuration
    let mut config = match &config_file {
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| ConsoleConfig::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error loading config '{}': {}", path, e);
                    return ExitCode::FAILURE;
                },
            }
        },
        None => ConsoleConfig::default(),
    };
    if let Some(h) = cell_height {
        match CellHeight::try_from(h) {
            Ok(cell) => config.cell_height = cell,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            },
        }
    }

    // Load glyphs
    let mut fonts = FontSet::outline();
    if let Some(path) = &font_file {
        let table = std::fs::read(path)
            .ok()
            .and_then(|data| FontTable::new(config.cell_height, data));
        match table {
            Some(table) => fonts.insert(table),
            None => {
                eprintln!(
                    "Error loading font '{}' for {}-pixel cells",
                    path,
                    config.cell_height.height()
                );
                return ExitCode::FAILURE;
            },
        }
    }

    // Create console
    let info = FramebufferInfo::new(width, height, pitch.unwrap_or(width));
    if let Err(e) = info.validate(info.size as usize) {
        eprintln!("Error creating console: {}", e);
        return ExitCode::FAILURE;
    }
    let memory = vec![0u8; info.size as usize];
    let mut console = match Console::new(
        &config,
        info,
        memory,
        SoftwareAccelerator::new(),
        fonts,
        Vec::new(),
    ) {
        Ok(console) => console,
        Err(e) => {
            eprintln!("Error creating console: {}", e);
            return ExitCode::FAILURE;
        },
    };

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            // Read from stdin
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    // Process input
    if let Err(e) = console.feed(&input_data) {
        eprintln!("Error rendering input: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(path) = &pgm_file {
        if let Err(e) = write_pgm(Path::new(path), console.surface().info(), console.framebuffer()) {
            eprintln!("Error writing '{}': {}", path, e);
            return ExitCode::FAILURE;
        }
    }

    // Output result
    let snapshot = console.snapshot();
    match output_format {
        OutputFormat::Text => {
            print!("{}", snapshot.to_text());
            if !console.output().is_empty() {
                println!("replies: {}", escape_bytes(console.output()));
            }
        },
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

/// Write the visible part of the framebuffer as a binary (P5) PGM. Palette
/// indices are stored as grey levels 0-255.
fn write_pgm(path: &Path, info: &FramebufferInfo, framebuffer: &[u8]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write!(file, "P5\n{} {}\n255\n", info.width, info.height)?;
    for row in framebuffer
        .chunks(info.pitch as usize)
        .take(info.height as usize)
    {
        file.write_all(&row[..info.width as usize])?;
    }
    file.flush()
}

/// Render reply bytes with ESC spelled out
fn escape_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x1B => "\\e".to_string(),
            0x20..=0x7E => (b as char).to_string(),
            _ => format!("\\x{:02x}", b),
        })
        .collect()
}

fn print_help() {
    println!("Mochi Headless Framebuffer Console");
    println!();
    println!("Usage: fbcon-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -W, --width <N>        Framebuffer width in pixels (default: 640)");
    println!("  -H, --height <N>       Framebuffer height in pixels (default: 480)");
    println!("  -p, --pitch <N>        Bytes per row (default: width)");
    println!("  -s, --cell-height <N>  Glyph cell height: 8, 14, 16 or 20");
    println!("      --config <PATH>    Load a JSON configuration");
    println!("      --font <PATH>      Byte-per-pixel font table for the cell height");
    println!("      --pgm <PATH>       Write the framebuffer as a PGM image");
    println!("  -f, --file <PATH>      Read input from file");
    println!("  -j, --json             Output snapshot as JSON");
    println!("  -t, --text             Output snapshot as text (default)");
    println!("  -h, --help             Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\033[31mWorld\\033[0m' | fbcon-headless");
    println!("  fbcon-headless -s 8 --pgm screen.pgm input.txt");
    println!("  fbcon-headless --json < test.bin > snapshot.json");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_pgm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.pgm");
        let info = FramebufferInfo::new(3, 2, 4);
        let framebuffer = [1, 2, 3, 99, 4, 5, 6, 99];

        write_pgm(&path, &info, &framebuffer).unwrap();

        let data = std::fs::read(&path).unwrap();
        let header = b"P5\n3 2\n255\n";
        assert_eq!(&data[..header.len()], header);
        assert_eq!(&data[header.len()..], &[1u8, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_escape_bytes() {
        assert_eq!(escape_bytes(b"\x1b[01;01R"), "\\e[01;01R");
        assert_eq!(escape_bytes(&[0x00]), "\\x00");
    }
}
