use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use fourier_sieve::{data, fourier::sparse, pipeline, FilterConfig, KeepFraction};

/// Filter and sparsify an image in the Fourier domain.
#[derive(Debug, Parser)]
#[command(name = "fourier-sieve", version, about)]
struct Args {
    /// Input image (PNG or JPEG).
    input: PathBuf,

    /// Output path for the low-pass reconstruction.
    #[arg(long, default_value = "recon_low.png")]
    low_pass_out: PathBuf,

    /// Output path for the top-K reconstruction (only written with --top-k).
    #[arg(long, default_value = "recon_topk.png")]
    top_k_out: PathBuf,

    /// Fraction of low frequencies to keep along both axes, in [0, 1].
    #[arg(long, default_value_t = 0.1)]
    keep_frac: f64,

    /// Row-axis keep fraction (overrides --keep-frac; requires --keep-frac-cols).
    #[arg(long, requires = "keep_frac_cols")]
    keep_frac_rows: Option<f64>,

    /// Column-axis keep fraction (overrides --keep-frac; requires --keep-frac-rows).
    #[arg(long, requires = "keep_frac_rows")]
    keep_frac_cols: Option<f64>,

    /// Also keep only the K largest-magnitude coefficients.
    #[arg(long, short = 'k')]
    top_k: Option<usize>,

    /// Keep input integer-scaled (0–255) instead of normalizing to [0, 1].
    #[arg(long)]
    no_normalize: bool,

    /// Export the retained coefficients as a sparse map (.json or .csv).
    #[arg(long)]
    export: Option<PathBuf>,

    /// Fail when the inverse transform's imaginary residue exceeds this.
    #[arg(long)]
    imag_tolerance: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let keep_fraction = match (args.keep_frac_rows, args.keep_frac_cols) {
        (Some(rows), Some(cols)) => KeepFraction::Anisotropic { rows, cols },
        _ => KeepFraction::Isotropic(args.keep_frac),
    };
    let config = FilterConfig {
        keep_fraction,
        top_k: args.top_k,
        normalize: !args.no_normalize,
        imag_tolerance: args.imag_tolerance,
    };

    let image = data::loader::load_file(&args.input, config.normalize)
        .with_context(|| format!("loading {}", args.input.display()))?;

    let result = pipeline::run(&config, &image).context("running pipeline")?;

    data::writer::save_file(&args.low_pass_out, &result.low_pass.reconstruction)
        .with_context(|| format!("writing {}", args.low_pass_out.display()))?;
    log::info!("wrote {}", args.low_pass_out.display());

    if let Some(stage) = &result.top_k {
        data::writer::save_file(&args.top_k_out, &stage.reconstruction)
            .with_context(|| format!("writing {}", args.top_k_out.display()))?;
        log::info!("wrote {}", args.top_k_out.display());
    }

    if let Some(export) = &args.export {
        let map = result.preferred().sparse_map();
        sparse::save_file(export, &map)
            .with_context(|| format!("exporting {}", export.display()))?;
        log::info!("exported {} coefficient(s) to {}", map.len(), export.display());
    }

    Ok(())
}
