use accumulator::{
    emulator::{CpuState, Emulator, StopReason},
    parsing::{Position, SourceSpan},
    symbolic,
    bytecode,
};

use slog::{Logger, Drain, o};
use slog_term::{TermDecorator, FullFormat};

fn parse_program() -> symbolic::Program {
    let source_code = include_str!("countdown.asm");

    let program = symbolic::Program::parse(source_code);
    assert!(program.is_valid(), "{:?}", program.diagnostics);

    program
}

fn logger() -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

#[test]
fn test_countdown_compile() {
    let program = parse_program().compile().unwrap();

    assert_eq!(program.words, vec![800, 490, 606, 900, 299, 502, 0]);
}

#[test]
fn test_countdown_run() {
    let program = parse_program().compile().unwrap();

    let mut emulator = Emulator::with_logger(&program.words, logger())
        .expect("could not initialize the emulator");
    emulator.push_input(vec![3]);

    emulator.run(1000);

    assert_eq!(emulator.output.values(), &[3, 2, 1]);
    assert_eq!(emulator.cpu, CpuState::Stopped(StopReason::Stop));
    assert_eq!(emulator.state.memory.read(90), 3);
}

#[test]
fn test_countdown_never_stops_on_negative_input() {
    let program = parse_program().compile().unwrap();

    let mut emulator = Emulator::new(&program.words).unwrap();
    emulator.push_input(vec![-1]);

    assert_eq!(emulator.run(20000), 20000);
    assert!(!emulator.halted());
    assert_eq!(emulator.state.data_register, -999);
}

#[test]
fn test_countdown_source_map() {
    let assembly = parse_program().compile_program().unwrap();

    assert_eq!(assembly.source_map.address_of_line(4), Some(2));
    assert_eq!(assembly.source_map.get_source_span(2), Some(&SourceSpan::new(4, 8, 17)));
    assert_eq!(assembly.symbols.label("loop"), Some(2));
    assert_eq!(assembly.symbols.label("end"), Some(6));
    assert_eq!(assembly.symbols.variable("n"), Some(90));
}

#[test]
fn test_countdown_highlight() {
    let program = parse_program();

    assert_eq!(
        program.highlight(Position::new(4, 15)),
        vec![SourceSpan::new(4, 14, 17), SourceSpan::new(8, 0, 3)]
    );
    assert_eq!(program.highlight(Position::new(2, 14)), vec![SourceSpan::new(2, 14, 15)]);
    assert_eq!(program.highlight(Position::new(0, 5)), vec![]);
}

#[test]
fn test_countdown_emit_binary() {
    let program = parse_program().compile().unwrap();
    let text = program.to_string();

    assert_eq!(text, "800\n490\n606\n900\n299\n502\n0\n");
    assert_eq!(bytecode::Program::parse(&text), Ok(program));
}
