use clap::{Parser, Subcommand};
use robolang_core::diagnostics::format_runtime_error;
use robolang_core::{
    build_match, format_syntax_error, parse_program, trace_program, MatchConfig, Program,
    RuntimeError, SensorReadings, Side,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "robolang")]
#[command(about = "RoboLang - program two robots and let them fight for fuel", long_about = None)]
struct Cli {
    /// Log engine internals (per-tick resolution, faults)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a program and print its canonical tree
    Parse {
        /// Path to the program source file
        file: PathBuf,
    },

    /// Print a program in normalized source form
    Fmt {
        file: PathBuf,
    },

    /// Run a single program against fixed sensor readings and list its actions
    Trace {
        file: PathBuf,

        /// Maximum number of ticks to run
        #[arg(long, default_value_t = 20)]
        ticks: usize,
    },

    /// Play a match between two programs
    Run {
        /// Red program (default program if omitted)
        #[arg(long)]
        red: Option<PathBuf>,

        /// Blue program (default program if omitted)
        #[arg(long)]
        blue: Option<PathBuf>,

        /// JSON match configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured tick limit
        #[arg(long)]
        ticks: Option<u64>,

        /// Print the match result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse { file } => parse_file(&file),
        Commands::Fmt { file } => format_file(&file),
        Commands::Trace { file, ticks } => trace_file(&file, ticks),
        Commands::Run {
            red,
            blue,
            config,
            seed,
            ticks,
            json,
        } => run_file(red.as_deref(), blue.as_deref(), config.as_deref(), seed, ticks, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // RUST_LOG wins when set; otherwise the -v flag picks the level
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_program(file: &Path) -> Result<Program, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let program = parse_program(&source).map_err(|e| format_syntax_error(&e, &source))?;
    Ok(program)
}

fn parse_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let program = load_program(file)?;
    println!("{}", program);
    Ok(())
}

fn format_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let program = load_program(file)?;
    print!("{}", program.to_source());
    Ok(())
}

fn trace_file(file: &Path, ticks: usize) -> Result<(), Box<dyn std::error::Error>> {
    let program = load_program(file)?;
    let trace = trace_program(&program, ticks, SensorReadings::default())?;
    println!("{}", trace);
    Ok(())
}

fn run_file(
    red: Option<&Path>,
    blue: Option<&Path>,
    config: Option<&Path>,
    seed: Option<u64>,
    ticks: Option<u64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config {
        Some(path) => MatchConfig::from_path(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some(ticks) = ticks {
        config.max_ticks = ticks;
    }

    let red_source = red.map(fs::read_to_string).transpose()?;
    let blue_source = blue.map(fs::read_to_string).transpose()?;

    let game = build_match(red_source.as_deref(), blue_source.as_deref(), config).map_err(|e| {
        match &e {
            RuntimeError::Parse { side, source } => {
                let text = match side {
                    Side::Red => red_source.as_deref(),
                    Side::Blue => blue_source.as_deref(),
                };
                format!("{} program: {}", side, format_syntax_error(source, text.unwrap_or_default()))
            }
            _ => format_runtime_error(&e),
        }
    })?;

    let result = game.run().map_err(|e| format_runtime_error(&e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for report in &result.trace {
            println!("{}", report);
        }
        println!("{} (after {} ticks)", result.outcome, result.ticks);
    }

    Ok(())
}
