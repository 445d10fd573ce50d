use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use lexgen::{INITIAL, ParseOptions, ScanError, Universe, compile_rules};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Rule file
    #[arg(value_name = "RULES")]
    rules: PathBuf,

    /// Bytes that `.` and `[^...]` range over
    #[arg(short = 'u', long, value_enum, default_value_t = UniverseArg::Ascii)]
    universe: UniverseArg,

    /// Log compilation phases
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the transition table and accept vector of every state
    Tables,
    /// Print each state's minimized DFA as Graphviz
    Dot,
    /// Tokenize a file with the INITIAL state
    Scan {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UniverseArg {
    /// 0 to 127
    Ascii,
    /// 0 to 255
    Bytes,
}

impl From<UniverseArg> for Universe {
    fn from(arg: UniverseArg) -> Self {
        match arg {
            UniverseArg::Ascii => Universe::Ascii,
            UniverseArg::Bytes => Universe::Bytes,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let text = fs::read_to_string(&args.rules)
        .with_context(|| format!("Failed to read {}", args.rules.display()))?;
    let options = ParseOptions {
        universe: args.universe.into(),
    };
    let mut lexer = compile_rules(&text, &options)
        .with_context(|| format!("Failed to compile {}", args.rules.display()))?;

    match &args.command {
        Command::Tables => {
            for state in lexer.export()? {
                println!("{state}");
            }
        }
        Command::Dot => {
            lexer.compile();
            let names: Vec<String> = lexer.state_names().map(str::to_string).collect();
            for name in names {
                if let Some(dfa) = lexer.matcher(&name).and_then(|m| m.dfa()) {
                    println!("// {name}");
                    print!("{}", dfa.dot());
                }
            }
        }
        Command::Scan { input } => {
            let bytes =
                fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
            lexer.set_state(INITIAL)?;
            for item in lexer.scanner(&bytes) {
                match item {
                    Ok(token) => println!("{}\t{}", token.rule, token.bytes.escape_ascii()),
                    Err(err @ ScanError::UnexpectedByte { .. }) => {
                        eprintln!("{}: {err}", input.display());
                        return Ok(ExitCode::FAILURE);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
