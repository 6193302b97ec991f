use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rpmgate::config::RpmGateConfig;
use rpmgate::ratelimit::{AsyncPeakRpmLimiter, PeakRpmLimiter};

/// Issue a burst of gated calls and report how the limiter spaced them.
#[derive(Debug, Parser)]
#[command(version, about = "rpmgate: client-side RPM limiter", long_about = None)]
struct Args {
    /// Path to a configuration file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum calls per minute, overriding the configuration
    #[arg(short = 'r', long)]
    max_rpm: Option<f64>,

    /// Number of back-to-back gated calls to issue
    #[arg(short = 'n', long, default_value_t = 3)]
    calls: u32,

    /// Use the async limiter on a tokio runtime
    #[arg(long = "async")]
    use_async: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let mut config = RpmGateConfig::load(args.config.as_deref())?;
    if let Some(max_rpm) = args.max_rpm {
        config.limiter.max_rpm = max_rpm;
    }
    let (interval, elapsed) = if args.use_async {
        let limiter = AsyncPeakRpmLimiter::from_config(&config.limiter)?;
        info!(
            max_rpm = limiter.max_rpm(),
            interval_ms = limiter.interval().as_millis() as u64,
            "Async limiter initialized"
        );
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        (limiter.interval(), runtime.block_on(run_async(&limiter, args.calls)))
    } else {
        let limiter = PeakRpmLimiter::from_config(&config.limiter)?;
        info!(
            max_rpm = limiter.max_rpm(),
            interval_ms = limiter.interval().as_millis() as u64,
            "Limiter initialized"
        );
        (limiter.interval(), run_blocking(&limiter, args.calls))
    };

    let lower_bound = spacing_lower_bound(interval, args.calls);
    info!(
        calls = args.calls,
        elapsed_ms = elapsed.as_millis() as u64,
        lower_bound_ms = lower_bound.as_millis() as u64,
        "Finished"
    );
    if elapsed < lower_bound {
        warn!("Calls completed faster than the configured rate allows");
    }

    Ok(())
}

/// Minimum total time `calls` back-to-back gates can take.
fn spacing_lower_bound(interval: Duration, calls: u32) -> Duration {
    interval.saturating_mul(calls.saturating_sub(1))
}

fn run_blocking(limiter: &PeakRpmLimiter, calls: u32) -> Duration {
    let start = Instant::now();
    for call in 1..=calls {
        let before = Instant::now();
        limiter.gate();
        info!(call, wait_ms = before.elapsed().as_millis() as u64, "Call allowed");
    }
    start.elapsed()
}

async fn run_async(limiter: &AsyncPeakRpmLimiter, calls: u32) -> Duration {
    let start = Instant::now();
    for call in 1..=calls {
        let before = Instant::now();
        limiter.gate().await;
        info!(call, wait_ms = before.elapsed().as_millis() as u64, "Call allowed");
    }
    start.elapsed()
}
