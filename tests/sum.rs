use accumulator::{
    bytecode::Program,
    emulator::{self, CpuState, Emulator, InputStream, MachineState, OutputStream, StopReason},
    instruction::Instruction,
};

fn read_program() -> Program {
    let bytecode_file = include_str!("sum.bin");

    Program::parse(bytecode_file).unwrap()
}

#[test]
fn test_sum_read_program() {
    let p = read_program();

    assert_eq!(p.words, vec![800, 606, 190, 490, 500, 0, 390, 900, 0]);

    let listing: Vec<Instruction> = p
        .disassemble()
        .into_iter()
        .map(|(_, _, ins)| ins)
        .collect();

    assert_eq!(
        listing,
        vec![
            Instruction::Read,
            Instruction::GotoZ(6),
            Instruction::Add(90),
            Instruction::Store(90),
            Instruction::Goto(0),
            Instruction::Stop,
            Instruction::Load(90),
            Instruction::Write,
            Instruction::Stop,
        ]
    );
}

#[test]
fn test_sum_execute() {
    let p = read_program();

    let mut emulator = Emulator::new(&p.words).unwrap();
    emulator.push_input(vec![5, 7, -2, 0]);
    emulator.run(1000);

    assert_eq!(emulator.output.values(), &[10]);
    assert_eq!(emulator.cpu, CpuState::Stopped(StopReason::Stop));
    assert_eq!(emulator.state.memory.cell(90), Some(10));
    assert!(emulator.input.is_exhausted());
}

#[test]
fn test_sum_driver_loop() {
    let p = read_program();
    let state = MachineState::new(p.to_memory().unwrap());

    let waiting = emulator::run(
        state,
        CpuState::PendingFetch,
        InputStream::new(vec![4, 4]),
        OutputStream::new(),
        1000,
    );

    assert_eq!(waiting.cpu, CpuState::Stopped(StopReason::NoInput));
    assert_eq!(waiting.state.memory.read(90), 8);
    assert_eq!(waiting.state.program_counter, 0);
    assert!(waiting.output.values().is_empty());

    let mut input = waiting.input;
    input.push(0);

    let done = emulator::run(
        waiting.state,
        CpuState::PendingExecute,
        input,
        waiting.output,
        1000,
    );

    assert_eq!(done.output.into_values(), vec![8]);
    assert_eq!(done.cpu, CpuState::Stopped(StopReason::Stop));
}

#[test]
fn test_sum_step_by_step() {
    let p = read_program();
    let mut emulator = Emulator::new(&p.words).unwrap();
    emulator.push_input(vec![1]);

    assert_eq!(emulator.step(), CpuState::PendingExecute);
    assert_eq!(emulator.current_instruction(), Instruction::Read);
    assert_eq!(emulator.state.program_counter, 0);

    assert_eq!(emulator.step(), CpuState::PendingFetch);
    assert_eq!(emulator.state.data_register, 1);
    assert_eq!(emulator.state.program_counter, 1);
    assert_eq!(emulator.input.cursor(), 1);
}
