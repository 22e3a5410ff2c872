use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bvsynth::cnf::{parse_dimacs, Problem, WORD_WIDTH};
use bvsynth::solver::{solve, Outcome, SolverCmd};
use bvsynth::synth::Program;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "bvsynth")]
#[command(about = "bvsynth - SAT-based straight-line program synthesizer")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a program consistent with the given input/output examples
    Synth {
        /// Number of instruction slots
        #[arg(long, default_value_t = 3)]
        slots: usize,

        /// Word width in bits
        #[arg(long, default_value_t = WORD_WIDTH)]
        width: usize,

        /// Example pair as IN=OUT (decimal or 0x-hex), repeatable
        #[arg(long = "example", value_name = "IN=OUT", required = true)]
        examples: Vec<String>,

        /// How many distinct programs to enumerate via blocking clauses
        #[arg(long, default_value_t = 1)]
        enumerate: usize,

        /// Solver binary to run (defaults to probing PATH)
        #[arg(long)]
        solver: Option<PathBuf>,
    },

    /// Run the solver bridge over a DIMACS file and report the verdict
    Solve {
        /// CNF input file, `-` for stdin
        input: PathBuf,

        /// Solver binary to run (defaults to probing PATH)
        #[arg(long)]
        solver: Option<PathBuf>,
    },
}

// --- Main Function ---
fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Synth { slots, width, examples, enumerate, solver } => {
            run_synth(slots, width, &examples, enumerate, solver)
        }
        Commands::Solve { input, solver } => run_solve(&input, solver),
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

fn pick_solver(requested: Option<PathBuf>) -> Result<SolverCmd, String> {
    match requested {
        Some(path) => Ok(SolverCmd::new(path)),
        None => SolverCmd::probe().ok_or_else(|| {
            "no SAT solver found on PATH (tried cadical, picosat, kissat); pass --solver"
                .to_string()
        }),
    }
}

fn parse_word(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        text.parse()
    };
    parsed.map_err(|_| format!("invalid word value `{}`", text))
}

fn parse_example(text: &str) -> Result<(u64, u64), String> {
    let (input, output) = text
        .split_once('=')
        .ok_or_else(|| format!("example `{}` is not of the form IN=OUT", text))?;
    Ok((parse_word(input)?, parse_word(output)?))
}

fn run_synth(
    slots: usize,
    width: usize,
    example_args: &[String],
    enumerate: usize,
    solver: Option<PathBuf>,
) -> Result<(), String> {
    if width == 0 || width > 64 {
        return Err(format!("width must be between 1 and 64, got {}", width));
    }
    if slots == 0 {
        return Err("a program needs at least one slot".to_string());
    }
    let solver = pick_solver(solver)?;
    let examples: Vec<(u64, u64)> = example_args
        .iter()
        .map(|e| parse_example(e))
        .collect::<Result<_, _>>()?;

    let mut prob = Problem::new();
    let mut program = Program::new(&mut prob, slots, width);
    for &(input, output) in &examples {
        program.add_example(&mut prob, input, output);
    }

    let mut found = 0;
    while found < enumerate {
        match solve(&prob, &solver).map_err(|e| e.to_string())? {
            Outcome::Unsatisfiable => {
                if found == 0 {
                    println!(
                        "unsatisfiable: no {}-slot program matches all {} examples",
                        slots,
                        examples.len()
                    );
                } else {
                    println!("no further programs exist");
                }
                return Ok(());
            }
            Outcome::Indeterminate(reason) => {
                return Err(format!("solver run was indeterminate: {}", reason));
            }
            Outcome::Satisfiable(soln) => {
                let candidate = program.decode(&soln);
                found += 1;
                println!("program {}:", found);
                print!("{}", candidate);
                // Block this assignment so the next round must differ.
                prob.add_clause(soln.blocking_clause());
            }
        }
    }
    Ok(())
}

fn run_solve(input: &PathBuf, solver: Option<PathBuf>) -> Result<(), String> {
    let solver = pick_solver(solver)?;
    let problem = if input.as_os_str() == "-" {
        parse_dimacs(BufReader::new(io::stdin())).map_err(|e| e.to_string())?
    } else {
        let file = File::open(input).map_err(|e| format!("{}: {}", input.display(), e))?;
        parse_dimacs(BufReader::new(file)).map_err(|e| e.to_string())?
    };

    match solve(&problem, &solver).map_err(|e| e.to_string())? {
        Outcome::Unsatisfiable => println!("unsatisfiable"),
        Outcome::Indeterminate(reason) => {
            return Err(format!("solver run was indeterminate: {}", reason));
        }
        Outcome::Satisfiable(soln) => {
            println!("satisfiable ({} variables assigned)", soln.len());
        }
    }
    Ok(())
}
