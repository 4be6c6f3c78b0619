use std::io::{self, Write};
use std::process;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ram::{Input, Mnemonic, Processor, Program, Tracer, Value};

const EXAMPLE: &str = "\
EXAMPLE: ram 1 2 < prog

where the file prog contains this code:

    # The content of the line after '#' will be ignored
    READ 1  # r0 <- i1
    STORE 1 # r1 <- r0
    READ 2  # r0 <- i2
    ADD 1   # r0 <- r0 + r1
    ADD =1  # r0 <- r0 + 1
    # the value stored in r0 is the output of the machine

Output: 4";

/// Random access machine simulator. Reads a program from standard input.
#[derive(Debug, Parser)]
#[command(name = "ram", version, after_help = EXAMPLE)]
struct Cli {
    /// Values of the input registers, starting with register 1
    #[arg(value_name = "INPUT_REGISTERS", allow_negative_numbers = true)]
    inputs: Vec<String>,

    /// Runs the machine in debug mode, printing its state after every step
    #[arg(short, long)]
    debug: bool,

    /// Prints a list of instructions and their usage
    #[arg(short, long)]
    instructions: bool,

    /// Logs more details (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Parses the input registers, returning the first invalid argument on failure
    fn input(&self) -> Result<Input, &str> {
        self.inputs
            .iter()
            .map(|arg| arg.parse::<Value>().map_err(|_| arg.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map(Input::from)
    }
}

fn print_instructions() {
    println!(">>> Random access machine simulator <<<");
    println!("Types of arguments :");
    println!("X : direct address of a register (or a line of the code)");
    println!("(X) : indirect address of a register");
    println!("=X : constant (or a line of the code)");
    println!();
    println!("Instructions:");
    for mnemonic in Mnemonic::ALL {
        let usage = mnemonic
            .class()
            .forms()
            .iter()
            .map(|form| format!("{}{}", mnemonic, form))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<24} : {}", usage, mnemonic.description());
    }
}

/// Parses the program from standard input and runs it
fn run(cli: &Cli, input: Input) -> ram::Result<()> {
    let stdin = io::stdin();
    let program = Program::from_reader(stdin.lock())?;
    let mut processor = Processor::new(program, input);

    if cli.debug {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, ">>> Debugging mode <<<")?;
        writeln!(out, "-----------------------")?;
        Tracer::new(processor, out).run()?;
    } else {
        println!("{}", processor.run()?);
    }

    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let cli = Cli::parse();
    SimpleLogger::new()
        .with_level(cli.log_level())
        .init()
        .wrap_err("failed to set up logging")?; // logging

    if cli.instructions {
        print_instructions();
        return Ok(());
    }

    let input = match cli.input() {
        Ok(input) => input,
        Err(arg) => {
            println!("Error : Invalid non-numeric argument {}", arg);
            println!("Rerun with 'ram --help' to see a brief help");
            process::exit(1);
        }
    };

    if let Err(err) = run(&cli, input) {
        println!("{}", err);
        process::exit(1);
    }

    Ok(())
}
