//! Command-line driver for the tiled smoother.
//!
//! Fills a square field with the `x + y` ramp, smooths it on the selected
//! backend, and prints the transfer and compute intervals. The ramp makes
//! verification cheap: the mean of a linear function over a symmetric window
//! equals its value at the center, so every interior output cell must equal
//! its own `x + y`.

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tilesmooth::{CpuBackend, Field, GridGeometry, SmoothBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendChoice {
    /// Pick the GPU when one is available, otherwise the CPU.
    Auto,
    /// CPU emulation of the tiled kernel.
    Cpu,
    /// WebGPU compute shader.
    #[cfg(feature = "wgpu")]
    Wgpu,
}

/// Tiled 2D box-kernel smoother
#[derive(Parser)]
#[command(name = "smooth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Side length of the square field
    #[arg(long, default_value_t = 514)]
    grid_width: u32,

    /// Side length of the averaging window (must be odd)
    #[arg(long, default_value_t = 3)]
    kernel_width: u32,

    /// Side length of one output tile
    #[arg(long, default_value_t = 16)]
    tile_width: u32,

    /// Compute backend
    #[arg(long, value_enum, default_value_t = BackendChoice::Auto)]
    backend: BackendChoice,

    /// Check interior results against the linear-ramp oracle
    #[arg(long)]
    verify: bool,

    /// Print the interior region of the result
    #[arg(long)]
    print: bool,
}

fn run(cli: &Cli, backend: &dyn SmoothBackend) -> tilesmooth::Result<()> {
    let geometry = GridGeometry::new(cli.grid_width, cli.kernel_width, cli.tile_width)?;
    let input = Field::from_fn(cli.grid_width, |x, y| (x + y) as f32);
    let mut output = Field::new(cli.grid_width);

    let timings = backend.smooth(&input, &mut output, &geometry)?;
    println!("backend: {}", backend.name());
    println!("{timings}");

    if cli.verify {
        let koffset = geometry.kernel_offset();
        let mut mismatches = 0usize;
        for y in koffset..cli.grid_width - koffset {
            for x in koffset..cli.grid_width - koffset {
                let got = output.get(x, y).unwrap_or(f32::NAN);
                // GPU division is not guaranteed correctly rounded, so
                // compare against the oracle with a small tolerance.
                if (got - (x + y) as f32).abs() > 1e-3 {
                    mismatches += 1;
                }
            }
        }
        if mismatches == 0 {
            println!("verify: OK ({} interior cells)", geometry.interior_width().pow(2));
        } else {
            println!("verify: FAILED ({mismatches} mismatched cells)");
        }
    }

    if cli.print {
        let interior = geometry.interior_width() as usize;
        for row in output.interior(&geometry).chunks(interior) {
            let line: Vec<String> = row.iter().map(|v| format!("{v:7.2}")).collect();
            println!("{}", line.join(" "));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> tilesmooth::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.backend {
        BackendChoice::Cpu => run(&cli, &CpuBackend::new()),
        #[cfg(feature = "wgpu")]
        BackendChoice::Wgpu => {
            let backend = tilesmooth::WgpuBackend::new().await?;
            tracing::info!("Using adapter {}", backend.adapter_name());
            run(&cli, &backend)
        }
        BackendChoice::Auto => {
            #[cfg(feature = "wgpu")]
            match tilesmooth::WgpuBackend::new().await {
                Ok(backend) => {
                    tracing::info!("Using adapter {}", backend.adapter_name());
                    return run(&cli, &backend);
                }
                Err(e) => {
                    tracing::info!("No GPU backend ({e}), falling back to CPU");
                }
            }
            run(&cli, &CpuBackend::new())
        }
    }
}
