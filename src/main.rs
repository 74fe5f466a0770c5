use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use koginkit::{init_logging, Pattern, ReadOptions, RenderMode, WriteOptions};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_DATE"), ")");

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Thin line along the grain
    LineGrain,
    /// Cell-high bar along the grain
    FillGrain,
    /// Rounded stroke crossing the grain lines
    OverGrain,
    /// Rounded stroke crossing the warp threads
    OverWarp,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::LineGrain => RenderMode::LineGrain,
            Mode::FillGrain => RenderMode::FillGrain,
            Mode::OverGrain => RenderMode::OverGrain,
            Mode::OverWarp => RenderMode::OverWarp,
        }
    }
}

/// Re-renders a KoginKit pattern file.
#[derive(Debug, Parser)]
#[command(name = "koginkit")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
struct Args {
    /// Pattern file to read
    input: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print layout (millimetres, print grid)
    #[arg(long)]
    print: bool,

    /// Render mode of the output
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Number the grid lines
    #[arg(long)]
    grid_number: bool,

    /// Omit the embedded pattern data
    #[arg(long)]
    no_data: bool,
}

impl Args {
    fn write_options(&self) -> WriteOptions {
        let options = if self.print {
            WriteOptions::print()
        } else {
            WriteOptions::screen()
        };
        let options = if self.grid_number {
            options.with_grid_number(true)
        } else {
            options
        };
        if self.no_data {
            options.with_no_data(true)
        } else {
            options
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    init_logging()?;

    let args = Args::parse();
    let input = &args.input;

    let mut pattern = Pattern::new();
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    pattern
        .read(&text, &ReadOptions::default())
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    tracing::info!(
        "Loaded {}: {} layers, {} stitches",
        input.display(),
        pattern.tree().layer_count(),
        pattern.tree().stitch_count()
    );

    if let Some(mode) = args.mode {
        pattern.set_render_mode(mode.into(), false);
    }
    let svg = pattern.write(&args.write_options());
    if svg.is_empty() {
        bail!("Pattern has no stitches to render");
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("koginkit").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command() {
        let args = parse(&["in.svg", "--print", "--mode", "fill-grain", "-o", "out.svg"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.svg"));
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));
        assert_eq!(args.mode.map(RenderMode::from), Some(RenderMode::FillGrain));
        assert!(args.print);
        assert!(args.write_options().for_printing);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--mode", "sideways", "in.svg"]).is_err());
        assert!(parse(&["in.svg", "--mode"]).is_err());
        assert!(parse(&["in.svg", "--bogus"]).is_err());
        assert!(parse(&["a.svg", "b.svg"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_flags_map_to_write_options() {
        let args = parse(&["in.svg", "--grid-number", "--no-data"]).unwrap();
        let options = args.write_options();
        assert_eq!(options.grid_number, Some(true));
        assert_eq!(options.no_data, Some(true));
        assert!(!options.for_printing);
    }
}
