use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use ewald2d_backend_cpu::CpuBackend;
use ewald2d_core::{
    io::{EwaldJob, JobConfig},
    ColumnMatrix, Kernel, SpreadStrategy,
};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "ewald2d",
    about = "Reciprocal-space spectral Ewald sums for doubly-periodic 2D Stokes flow"
)]
struct Cli {
    /// Path to a TOML job file
    #[arg(short, long)]
    config: PathBuf,
    /// Path to CSV output (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Override the spreading strategy from the job file
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Also evaluate the brute-force k-space sum and log the deviation
    #[arg(long)]
    validate: bool,
    /// Only log warnings and errors (stderr)
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    ColumnLocked,
    ThreadLocal,
}

impl From<StrategyArg> for SpreadStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::ColumnLocked => SpreadStrategy::ColumnLocked,
            StrategyArg::ThreadLocal => SpreadStrategy::ThreadLocal,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    info!("[cli] loading config {}", cli.config.display());
    let mut config = JobConfig::load(&cli.config)?;
    if let Some(strategy) = cli.strategy {
        config.spreading = strategy.into();
        info!("[cli] overriding spreading strategy with {}", config.spreading);
    }
    let metrics_recorder = config.metrics.build_recorder()?;
    let job = EwaldJob::try_from(config)?;

    match &cli.output {
        Some(dest) => info!("[cli] writing CSV to {}", dest.display()),
        None => info!("[cli] streaming CSV to stdout"),
    }
    let result = job.run(CpuBackend::new(), metrics_recorder.as_ref())?;

    if cli.validate {
        let reference = job.run_reference()?;
        let deviation = max_relative_deviation(&result, &reference);
        if deviation > 1e-6 {
            warn!("[cli] spectral sum deviates from brute force by {deviation:.3e} (relative)");
        } else {
            info!("[cli] spectral sum matches brute force to {deviation:.3e} (relative)");
        }
    }

    emit_csv(job.kernel, &job.targets, &result, cli.output.as_deref())?;
    match cli.output {
        Some(path) => info!("wrote {} rows to {}", result.cols(), path.display()),
        None => info!("wrote {} rows to stdout", result.cols()),
    }
    Ok(())
}

fn max_relative_deviation(result: &ColumnMatrix, reference: &ColumnMatrix) -> f64 {
    let scale = reference.max_abs();
    if scale == 0.0 {
        return result.max_abs();
    }
    result
        .as_slice()
        .iter()
        .zip(reference.as_slice())
        .fold(0.0, |acc: f64, (a, b)| acc.max((a - b).abs()))
        / scale
}

fn emit_csv(
    kernel: Kernel,
    targets: &ColumnMatrix,
    result: &ColumnMatrix,
    dest: Option<&Path>,
) -> io::Result<()> {
    let mut writer: Box<dyn Write> = match dest {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    match kernel {
        Kernel::Stokeslet => writeln!(writer, "target,x,y,u1,u2")?,
        Kernel::Stresslet => writeln!(writer, "target,x,y,t11,t21,t12,t22")?,
    }

    for (idx, (point, values)) in targets.columns().zip(result.columns()).enumerate() {
        write!(writer, "{idx},{},{}", point[0], point[1])?;
        for value in values {
            write!(writer, ",{value}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}
