use anyhow::{Context, Result, bail};
use clap::Parser;
use image_placeholder_wasm::{Placeholder, PlaceholderOptions, to_hex};
use log::{Level, info};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

/// Generate low quality image placeholders (palette, CSS gradients, BMP data URI).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image paths
    inputs: Vec<PathBuf>,

    /// Build the placeholder from a blurhash instead of an image
    #[arg(short, long, conflicts_with = "inputs")]
    blurhash: Option<String>,

    /// Number of palette colors
    #[arg(short = 'k', long, default_value_t = 8)]
    colors: usize,

    /// Longest side of the CSS/BMP grid taken from an image
    #[arg(short, long, default_value_t = 4)]
    grid: u32,

    /// Columns and rows decoded from a blurhash, e.g. 4x3
    #[arg(long, default_value = "4x3", value_parser = parse_size)]
    hash_grid: (u32, u32),

    /// Bitmap size decoded from a blurhash, e.g. 8x8
    #[arg(long, default_value = "8x8", value_parser = parse_size)]
    bmp_size: (u32, u32),

    /// Prefix for the CSS custom property names
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Cluster the palette in Lab space
    #[arg(long)]
    lab: bool,

    /// Seed for palette extraction, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Don't compute a blurhash for input images
    #[arg(long)]
    no_blurhash: bool,

    /// Write `<stem>.json` files here instead of printing
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn setup_logger(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    simple_logger::init_with_level(level).context("logger already initialized")?;
    Ok(())
}

fn to_json(placeholder: &Placeholder) -> Value {
    json!({
        "palette": placeholder.palette.iter().map(|c| to_hex(*c)).collect::<Vec<_>>(),
        "dominant": to_hex(placeholder.dominant),
        "columns": placeholder.columns,
        "rows": placeholder.rows,
        "gradients": placeholder.gradients,
        "vars": placeholder.vars,
        "class": placeholder.class,
        "bmp": placeholder.bmp,
        "blurhash": placeholder.blurhash,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger(args.verbose)?;

    let options = PlaceholderOptions {
        palette_colors: args.colors,
        grid_size: args.grid,
        hash_grid: args.hash_grid,
        hash_bmp_size: args.bmp_size,
        var_prefix: args.prefix.clone(),
        perceptual: args.lab,
        blurhash_components: if args.no_blurhash { None } else { Some((4, 3)) },
        seed: args.seed,
        ..PlaceholderOptions::default()
    };

    if let Some(hash) = &args.blurhash {
        let placeholder = Placeholder::from_blurhash(hash, &options)
            .with_context(|| format!("building placeholder from blurhash {hash:?}"))?;
        println!("{}", serde_json::to_string_pretty(&to_json(&placeholder))?);
        return Ok(());
    }

    if args.inputs.is_empty() {
        bail!("no input images given (pass paths or --blurhash)");
    }

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let placeholder = Placeholder::from_image_bytes(&bytes, &options)
            .with_context(|| format!("processing {}", input.display()))?;
        let document = serde_json::to_string_pretty(&to_json(&placeholder))?;

        match &args.out_dir {
            Some(dir) => {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let out_path = dir.join(format!("{stem}.json"));
                fs::create_dir_all(dir)?;
                fs::write(&out_path, document)?;
                info!("{} -> {}", input.display(), out_path.display());
                println!("Saved → {}", out_path.display());
            }
            None => println!("{document}"),
        }
    }

    Ok(())
}
