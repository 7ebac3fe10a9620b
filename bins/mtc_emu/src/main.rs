mod config;

use clap::Parser;
use config::Config;
use mtc_assembler::diagnostics::Diagnostics;
use mtc_emulator::{Processor, Radix};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, Level};

/// Assemble a program and run it, one instruction per clock tick.
#[derive(Parser, Debug)]
#[command(name = "mtc-emu", version, about)]
struct Args {
    /// Assembly source to run.
    source: PathBuf,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many steps.
    #[arg(short, long)]
    steps: Option<u64>,

    /// Milliseconds between steps.
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Number of memory cells.
    #[arg(long)]
    capacity: Option<usize>,

    /// Base used to print registers (hex, oct, int or bin).
    #[arg(short, long)]
    radix: Option<Radix>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(steps) = self.steps {
            config.max_steps = Some(steps);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.clock_interval_ms = interval_ms;
        }
        if let Some(capacity) = self.capacity {
            config.memory_capacity = capacity;
        }
        if let Some(radix) = self.radix {
            config.radix = radix;
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{} ({})", err, path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    args.apply(&mut config);

    let source = match std::fs::read_to_string(&args.source) {
        Ok(source) => source,
        Err(err) => {
            error!("Could not read source file. ({}) ({})", args.source.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let program = match mtc_assembler::load(&source) {
        Ok(program) => program,
        Err(err) => {
            let mut diags = Diagnostics::new(&source, args.source.display().to_string());
            diags.report(&err);
            if let Err(err) = diags.print(&mut std::io::stderr()) {
                error!("{}", err);
            }
            return ExitCode::FAILURE;
        }
    };

    let mut processor = match Processor::with_capacity(config.memory_capacity) {
        Ok(processor) => processor,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = processor.load(program.image(), program.entry()) {
        error!("{}", err);
        return ExitCode::FAILURE;
    }
    info!(
        "Loaded {} ({} words, entry at {:#06x})",
        args.source.display(),
        program.len(),
        program.entry()
    );

    let interval = Duration::from_millis(config.clock_interval_ms);
    let mut steps = 0u64;

    println!("{:>6}  {}", steps, processor.readout(config.radix));

    while config.max_steps.map_or(true, |max| steps < max) {
        std::thread::sleep(interval);

        if let Err(err) = processor.step() {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
        steps += 1;

        let instruction = processor
            .last_instruction()
            .map(|entry| entry.to_string())
            .unwrap_or_default();
        println!(
            "{:>6}  {}  {}",
            steps,
            processor.readout(config.radix),
            instruction
        );
    }

    ExitCode::SUCCESS
}
