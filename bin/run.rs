use accumulator::{
    bytecode,
    assembler::assemble_with_logger,
    emulator::{CpuState, Emulator, StopReason},
    error::{Diagnostic, ErrorKind, LoadError},
    event::Event,
    instruction::Word,
    symbolic,
};

use clap::{App, Arg, ArgMatches};
use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

enum Error {
    Parse(Vec<Diagnostic>),
    Load(LoadError),
    Argument(String),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<Vec<Diagnostic>> for Error {
    fn from(diagnostics: Vec<Diagnostic>) -> Error {
        Error::Parse(diagnostics)
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Error {
        Error::Load(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("accrun")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Utility for assembling and executing accumulator machine programs")
        .arg(Arg::with_name("source")
             .help("File containing assembly source (.asm) or a numeric program")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("input")
             .help("Values given to READ instructions, in order")
             .long("input")
             .short("i")
             .value_name("VALUE")
             .multiple(true)
             .allow_hyphen_values(true))
        .arg(Arg::with_name("max-steps")
             .help("Maximum number of fetch and execute phases")
             .long("max-steps")
             .short("m")
             .value_name("N")
             .default_value("10000"))
        .arg(Arg::with_name("trace")
             .help("Prints every executed instruction")
             .long("trace")
             .short("t"))
        .arg(Arg::with_name("verbose")
             .help("Enables verbose logging")
             .long("verbose")
             .short("v"))
        .arg(Arg::with_name("emit-binary")
             .help("Prints the numeric program instead of running it")
             .long("emit-binary"))
        .get_matches()
}

fn main() {
    let args = parse_arguments();

    let logger = if args.is_present("verbose") {
        let decorator = TermDecorator::new().build();
        let drain = FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Some(Logger::root(drain, o!()))
    } else {
        None
    };

    match run(&args, logger) {
        Ok(()) => (),
        Err(Error::IO(io)) => eprintln!("IO error: {}", io),
        Err(Error::Load(e)) => eprintln!("Load error: {}", e),
        Err(Error::Argument(msg)) => eprintln!("Invalid argument: {}", msg),
        Err(Error::Parse(diagnostics)) => {
            for diagnostic in diagnostics {
                report(&diagnostic);
            }
        }
    }
}

fn report(diagnostic: &Diagnostic) {
    eprintln!("error: {}", diagnostic);

    if let ErrorKind::UnknownInstruction { token } = &diagnostic.kind {
        if let Some(suggestion) = symbolic::suggest_mnemonic(token) {
            eprintln!("  did you mean `{}`?", suggestion);
        }
    }
}

fn parse_value(text: &str) -> Result<Word, Error> {
    let words = bytecode::Program::parse(text)
        .map_err(|_| Error::Argument(format!("`{}` is not a value in [-999, 999]", text)))?
        .words;

    match words.as_slice() {
        [value] => Ok(*value),
        _ => Err(Error::Argument(format!("`{}` is not a single value", text))),
    }
}

fn load(file_path: &str, logger: Option<Logger>) -> Result<bytecode::Program, Error> {
    let file = std::fs::read_to_string(file_path)?;

    if file_path.ends_with(".asm") {
        let symbolic = symbolic::Program::parse(&file);

        if !symbolic.is_valid() {
            return Err(Error::Parse(symbolic.diagnostics));
        }

        let assembly = assemble_with_logger(&symbolic.statements, logger)?;

        Ok(assembly.program)
    } else {
        Ok(bytecode::Program::parse(&file)?)
    }
}

fn run(args: &ArgMatches, logger: Option<Logger>) -> Result<(), Error> {
    let file_path = args.value_of("source").unwrap_or_default();
    let program = load(file_path, logger.clone())?;

    if args.is_present("emit-binary") {
        print!("{}", program);
        return Ok(());
    }

    let input = args
        .values_of("input")
        .map(|values| values.map(parse_value).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    let max_steps = args
        .value_of("max-steps")
        .unwrap_or("10000")
        .parse::<usize>()
        .map_err(|e| Error::Argument(format!("max-steps: {}", e)))?;

    let mut emulator = Emulator::with_logger(&program.words, logger)?;
    emulator.push_input(input);

    emulator.add_listener(|event: &Event| {
        if let Event::Output { value } = event {
            println!("{}", value);
        }
    });

    if args.is_present("trace") {
        emulator.add_listener(|event: &Event| {
            if let Event::Fetched { .. } = event {
                eprintln!("{}", event);
            }
        });
    }

    emulator.run(max_steps);

    match emulator.cpu {
        CpuState::Stopped(StopReason::Stop) => (),
        CpuState::Stopped(StopReason::NoInput) => {
            eprintln!("Program stopped waiting for input at address {}", emulator.state.program_counter);
        }
        _ => eprintln!("Program did not stop within {} steps", max_steps),
    }

    Ok(())
}
