use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wd_core::Report;
use wd_diagnose::{Fixer, IssueDetector, optimize};
use wd_probe::{ProbeStrategy, perf};

#[derive(Parser)]
#[command(name = "wifidoc")]
#[command(version, about = "WiFi troubleshooting and network diagnostics for macOS and Linux", long_about = None)]
struct Cli {
    /// Scan for nearby WiFi networks
    #[arg(long)]
    scan: bool,

    /// Run the network speed test
    #[arg(long = "speed-test")]
    speed_test: bool,

    /// Diagnose issues and apply automatic fixes
    #[arg(long)]
    fix: bool,

    /// Apply network performance optimizations
    #[arg(long)]
    optimize: bool,

    /// Emit the JSON report instead of the text summary
    #[arg(long)]
    report: bool,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    // Each phase runs when its own flag is set, or when no other phase was
    // requested (the default phase set).
    fn do_scan(&self) -> bool {
        self.scan || !(self.speed_test || self.fix || self.optimize || self.report)
    }

    fn do_speed_test(&self) -> bool {
        self.speed_test || !(self.scan || self.fix || self.optimize || self.report)
    }

    fn do_fix(&self) -> bool {
        self.fix || !(self.scan || self.speed_test || self.optimize || self.report)
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {}", err);
            std::process::exit(1);
        }
    };

    // The select must resolve (not exit) on ctrl-c so the pipeline future is
    // dropped and any in-flight child process gets its kill_on_drop signal.
    let outcome = runtime.block_on(async {
        tokio::select! {
            result = run(cli) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        }
    });
    drop(runtime);

    match outcome {
        Some(Ok(())) => {}
        Some(Err(err)) => {
            error!("fatal error: {:#}", err);
            std::process::exit(1);
        }
        None => {
            eprintln!("\n🛑 Operation cancelled");
            std::process::exit(130);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let strategy = ProbeStrategy::detect().await?;
    info!(system = strategy.system_label(), "wifidoc starting");

    // Interface detection always runs; later phases build on its records.
    info!("detecting network interfaces");
    let interfaces = wd_probe::collect_interfaces(&strategy).await;
    info!(count = interfaces.len(), "interfaces found");

    let networks = if cli.do_scan() {
        info!("scanning for WiFi networks");
        let networks = wd_probe::scan_networks(&strategy, &interfaces).await;
        info!(count = networks.len(), "WiFi networks found");
        networks
    } else {
        Vec::new()
    };

    let performance = if cli.do_speed_test() {
        Some(perf::measure(&strategy).await)
    } else {
        None
    };

    let (issues, fixes) = if cli.do_fix() {
        let detector = IssueDetector::new(strategy);
        let issues = detector
            .detect(&interfaces, &networks, performance.as_ref())
            .await?;
        let fixes = Fixer::new(strategy).apply_all(&issues, &interfaces).await;
        (issues, fixes)
    } else {
        (Vec::new(), Vec::new())
    };

    let optimizations = if cli.optimize {
        optimize::apply(&strategy).await
    } else {
        Vec::new()
    };

    let report = Report::build(
        strategy.system_label(),
        interfaces,
        networks,
        performance,
        issues,
        fixes,
        optimizations,
    );

    if cli.report {
        let json = report.to_json()?;
        match &cli.output {
            Some(path) => {
                tokio::fs::write(path, &json).await?;
                println!("📄 Report saved to {}", path.display());
            }
            None => println!("{}", json),
        }
    } else {
        report.display();
    }

    Ok(())
}
