use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use exactlp_lang::{SAMPLES, Sample};
use exactlp_solver::{Path, Problem, Solver};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exactlp")]
#[command(about = "Exact rational linear programming solver", long_about = None)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Minimize the objective of a problem file
    Solve {
        /// The problem file
        file: PathBuf,
        /// Tableau to optimize on
        #[arg(long, value_enum, default_value = "auto")]
        path: PathArg,
        /// Give up after this many pivots
        #[arg(long)]
        max_iterations: Option<usize>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Decide whether a problem file has a feasible point
    Check {
        /// The problem file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Parse a problem file and print it back
    Parse {
        /// The problem file
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Check and solve the built-in sample problems
    Demo {
        /// Run only this sample
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum PathArg {
    Auto,
    Primal,
    Dual,
}

impl From<PathArg> for Path {
    fn from(arg: PathArg) -> Self {
        match arg {
            PathArg::Auto => Path::Auto,
            PathArg::Primal => Path::Primal,
            PathArg::Dual => Path::Dual,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn read_problem(file: &PathBuf) -> Problem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => fail(format!("Error reading file: {}", e)),
    };
    match exactlp_lang::Parser::parse(&source) {
        Ok(problem) => problem,
        Err(e) => fail(format!("Parse error in {}: {}", file.display(), e)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Error writing JSON: {}", e)),
    }
}

fn run_sample(sample: &Sample) {
    println!("======== {} ({}) ========", sample.name, sample.description);
    let problem = match exactlp_lang::Parser::parse(sample.source) {
        Ok(p) => p,
        Err(e) => fail(format!("Parse error in sample {}: {}", sample.name, e)),
    };
    let solver = Solver::new();

    println!("--------CHECKING FEASIBILITY--------");
    match solver.check_feasibility(&problem) {
        Ok(report) => println!("{}", report),
        Err(e) => fail(format!("Solve error: {}", e)),
    }

    println!("--------SOLVING--------");
    match solver.solve(&problem) {
        Ok(solution) => print!("{}", solution),
        Err(e) => fail(format!("Solve error: {}", e)),
    }
    println!();
}

fn main() {
    let cli = Cli::parse();
    Builder::new()
        .filter_level(level(cli.verbose))
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Solve {
            file,
            path,
            max_iterations,
            format,
        } => {
            let problem = read_problem(&file);
            let mut solver = Solver::new().with_path(path.into());
            if let Some(max) = max_iterations {
                solver = solver.with_max_iterations(max);
            }

            let solution = match solver.solve(&problem) {
                Ok(s) => s,
                Err(e) => fail(format!("Solve error: {}", e)),
            };
            log::info!(
                "{:?} on the {} path after {} pivots",
                solution.status,
                solution.path,
                solution.iterations
            );

            match format {
                OutputFormat::Json => print_json(&solution),
                OutputFormat::Text => print!("{}", solution),
            }
        }
        Commands::Check { file, format } => {
            let problem = read_problem(&file);
            let report = match Solver::new().check_feasibility(&problem) {
                Ok(r) => r,
                Err(e) => fail(format!("Solve error: {}", e)),
            };

            match format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Text => {
                    println!("{}", report);
                    for index in &report.violated {
                        println!("  violated: constraint {}", index);
                    }
                }
            }
        }
        Commands::Parse { file, format } => {
            let problem = read_problem(&file);
            match format {
                OutputFormat::Json => print_json(&problem),
                OutputFormat::Text => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                    println!("  {} free variables", problem.free_variables().len());
                    println!();
                    print!("{}", problem);
                }
            }
        }
        Commands::Demo { name } => match name {
            Some(name) => match exactlp_lang::sample(&name) {
                Some(sample) => run_sample(sample),
                None => {
                    let names: Vec<&str> = SAMPLES.iter().map(|s| s.name).collect();
                    fail(format!(
                        "Unknown sample {:?}, expected one of: {}",
                        name,
                        names.join(", ")
                    ))
                }
            },
            None => SAMPLES.iter().for_each(run_sample),
        },
    }
}
