//! [Emulator] for executing [numeric programs](crate::bytecode::Program).
//!
//! The machine is modelled as pure transitions over [MachineState]: [fetch] and [execute]
//! never mutate their input, and [run] alternates them according to the [CpuState].
//! The [Emulator] type wraps these transitions with logging and [events](crate::event).

use slog::{debug, o, trace, Discard, Logger};

use crate::error::LoadError;
use crate::event::{Event, EventDispatcher, EventListener, Register};
use crate::instruction::{Address, Instruction, Word};

/// Number of memory cells.
pub const MEMORY_SIZE: usize = 100;

/// Largest program that can be loaded, leaving room for the two constants.
pub const MAX_PROGRAM_LENGTH: usize = 98;

/// Address of the built-in constant `zero`.
pub const ZERO_ADDRESS: Address = 98;

/// Address of the built-in constant `one`.
pub const ONE_ADDRESS: Address = 99;

pub const WORD_MIN: Word = -999;
pub const WORD_MAX: Word = 999;

/// Saturates `value` into the range of a machine word.
pub fn saturate(value: i32) -> Word {
    if value < WORD_MIN as i32 {
        WORD_MIN
    } else if value > WORD_MAX as i32 {
        WORD_MAX
    } else {
        value as Word
    }
}

/// The 100 memory cells of the machine.
///
/// A cell that was never written is blank. Blank cells read as 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    cells: [Option<Word>; MEMORY_SIZE],
}

impl Memory {
    /// Blank memory holding only the constants `zero` and `one`.
    pub fn new() -> Memory {
        let mut cells = [None; MEMORY_SIZE];
        cells[ZERO_ADDRESS] = Some(0);
        cells[ONE_ADDRESS] = Some(1);

        Memory { cells }
    }

    /// Places `program` at addresses `0..program.len()`.
    pub fn load(program: &[Word]) -> Result<Memory, LoadError> {
        if program.len() > MAX_PROGRAM_LENGTH {
            return Err(LoadError::TooLong {
                length: program.len(),
            });
        }

        let mut memory = Memory::new();

        for (address, word) in program.iter().enumerate() {
            if *word < WORD_MIN || *word > WORD_MAX {
                return Err(LoadError::ValueOutOfRange {
                    address,
                    value: *word as i32,
                });
            }

            memory.cells[address] = Some(*word);
        }

        Ok(memory)
    }

    /// Value of the cell at `address`. Blank cells and addresses outside of memory read as 0.
    pub fn read(&self, address: Address) -> Word {
        self.cell(address).unwrap_or(0)
    }

    /// The cell at `address`, `None` if it is blank.
    pub fn cell(&self, address: Address) -> Option<Word> {
        self.cells.get(address).copied().flatten()
    }

    /// Writes `value` to `address`. Writes outside of memory are ignored.
    ///
    /// The constant cells are writable too.
    pub fn write(&mut self, address: Address, value: Word) {
        if let Some(cell) = self.cells.get_mut(address) {
            *cell = Some(value);
        }
    }

    /// True for the addresses of the built-in constants.
    pub fn is_constant(address: Address) -> bool {
        address == ZERO_ADDRESS || address == ONE_ADDRESS
    }

    pub fn cells(&self) -> &[Option<Word>] {
        &self.cells[..]
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

/// Registers and memory of the machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachineState {
    pub instruction_register: Word,
    pub data_register: Word,

    /// Address of the next instruction to fetch.
    pub program_counter: Address,

    pub memory: Memory,
}

impl MachineState {
    pub fn new(memory: Memory) -> MachineState {
        MachineState {
            instruction_register: 0,
            data_register: 0,
            program_counter: 0,
            memory,
        }
    }

    pub fn load(program: &[Word]) -> Result<MachineState, LoadError> {
        Memory::load(program).map(MachineState::new)
    }

    /// Decodes the instruction register.
    pub fn current_instruction(&self) -> Instruction {
        Instruction::decode(self.instruction_register)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// A `STOP` instruction was executed.
    Stop,

    /// A `READ` was executed with no input left. Executing it again after
    /// adding input continues the program.
    NoInput,
}

/// The execution phase of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuState {
    PendingFetch,
    PendingExecute,
    Stopped(StopReason),
}

impl CpuState {
    pub fn is_stopped(&self) -> bool {
        match self {
            CpuState::Stopped(_) => true,
            _ => false,
        }
    }
}

impl Default for CpuState {
    fn default() -> CpuState {
        CpuState::PendingFetch
    }
}

/// Values available to `READ`, consumed front to back.
///
/// Values outside of `[-999, 999]` are saturated when they are added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputStream {
    values: Vec<Word>,
    cursor: usize,
}

impl InputStream {
    pub fn new(values: Vec<Word>) -> InputStream {
        InputStream {
            values: values.into_iter().map(|v| saturate(v as i32)).collect(),
            cursor: 0,
        }
    }

    /// The next unread value.
    pub fn peek(&self) -> Option<Word> {
        self.values.get(self.cursor).copied()
    }

    /// Marks the next value as read.
    pub fn advance(&mut self) {
        if self.cursor < self.values.len() {
            self.cursor += 1;
        }
    }

    pub fn push(&mut self, value: Word) {
        self.values.push(saturate(value as i32));
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.values.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn values(&self) -> &[Word] {
        &self.values[..]
    }

    /// Values not read yet.
    pub fn remaining(&self) -> &[Word] {
        &self.values[self.cursor..]
    }
}

/// Values written by `WRITE`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputStream {
    values: Vec<Word>,
}

impl OutputStream {
    pub fn new() -> OutputStream {
        OutputStream::default()
    }

    pub fn push(&mut self, value: Word) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[Word] {
        &self.values[..]
    }

    pub fn into_values(self) -> Vec<Word> {
        self.values
    }
}

/// The result of executing a single instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub state: MachineState,

    /// True if the instruction took the input value it was given.
    pub consumed_input: bool,

    /// The value written by a `WRITE`.
    pub output: Option<Word>,

    /// Set if the instruction stopped the machine.
    pub stop_reason: Option<StopReason>,
}

/// Loads the word at the program counter into the instruction register.
pub fn fetch(state: &MachineState) -> MachineState {
    MachineState {
        instruction_register: state.memory.read(state.program_counter),
        ..state.clone()
    }
}

/// Executes the instruction in the instruction register.
///
/// `next_input` is the value a `READ` would take. Without it, a `READ` leaves the state
/// untouched and stops the machine with [StopReason::NoInput].
pub fn execute(state: &MachineState, next_input: Option<Word>) -> Execution {
    let mut next = state.clone();
    let mut consumed_input = false;
    let mut output = None;
    let mut stop_reason = None;

    let pc = state.program_counter;
    let data = state.data_register;

    match state.current_instruction() {
        Instruction::Add(addr) => {
            next.data_register = saturate(data as i32 + state.memory.read(addr) as i32);
            next.program_counter = pc + 1;
        }
        Instruction::Sub(addr) => {
            next.data_register = saturate(data as i32 - state.memory.read(addr) as i32);
            next.program_counter = pc + 1;
        }
        Instruction::Load(addr) => {
            next.data_register = state.memory.read(addr);
            next.program_counter = pc + 1;
        }
        Instruction::Store(addr) => {
            next.memory.write(addr, data);
            next.program_counter = pc + 1;
        }
        Instruction::Goto(addr) => next.program_counter = addr,
        Instruction::GotoZ(addr) => {
            next.program_counter = if data == 0 { addr } else { pc + 1 };
        }
        Instruction::GotoP(addr) => {
            next.program_counter = if data > 0 { addr } else { pc + 1 };
        }
        Instruction::Read => match next_input {
            Some(value) => {
                next.data_register = value;
                next.program_counter = pc + 1;
                consumed_input = true;
            }
            None => stop_reason = Some(StopReason::NoInput),
        },
        Instruction::Write => {
            output = Some(data);
            next.program_counter = pc + 1;
        }
        Instruction::Stop => stop_reason = Some(StopReason::Stop),
    }

    Execution {
        state: next,
        consumed_input,
        output,
        stop_reason,
    }
}

/// The machine after a call to [run].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub state: MachineState,
    pub cpu: CpuState,
    pub input: InputStream,
    pub output: OutputStream,
}

/// Alternates fetch and execute until the machine stops or `max_iterations`
/// phases have been performed.
pub fn run(
    state: MachineState,
    cpu: CpuState,
    input: InputStream,
    output: OutputStream,
    max_iterations: usize,
) -> Run {
    let mut emulator = Emulator::from_parts(state, cpu, input, output);
    emulator.run(max_iterations);
    emulator.into_run()
}

/// The emulator contains the machine, its input and output and
/// the listeners interested in its state changes.
pub struct Emulator {
    pub state: MachineState,
    pub cpu: CpuState,
    pub input: InputStream,
    pub output: OutputStream,
    events: EventDispatcher,
    logger: Logger,
}

impl Emulator {
    /// Creates an emulator with `program` loaded at address 0.
    pub fn new(program: &[Word]) -> Result<Emulator, LoadError> {
        Emulator::with_logger(program, None)
    }

    pub fn with_logger<L>(program: &[Word], logger: L) -> Result<Emulator, LoadError>
    where
        L: Into<Option<Logger>>,
    {
        let state = MachineState::load(program)?;
        let mut emulator = Emulator::from_parts(
            state,
            CpuState::PendingFetch,
            InputStream::default(),
            OutputStream::default(),
        );
        emulator.set_logger(logger);

        Ok(emulator)
    }

    pub fn from_parts(
        state: MachineState,
        cpu: CpuState,
        input: InputStream,
        output: OutputStream,
    ) -> Emulator {
        Emulator {
            state,
            cpu,
            input,
            output,
            events: EventDispatcher::default(),
            logger: Logger::root(Discard, o!()).new(o!("stage" => "emulation")),
        }
    }

    pub fn set_logger<L: Into<Option<Logger>>>(&mut self, logger: L) {
        self.logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "emulation"));
    }

    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.events.add_listener(listener);
    }

    /// Appends `values` to the input.
    ///
    /// A machine stopped waiting for input is moved back to re-execute its `READ`.
    pub fn push_input<I: IntoIterator<Item = Word>>(&mut self, values: I) {
        for value in values {
            self.input.push(value);
        }

        if self.cpu == CpuState::Stopped(StopReason::NoInput) && !self.input.is_exhausted() {
            debug!(self.logger, "input available, resuming");
            self.cpu = CpuState::PendingExecute;
        }
    }

    pub fn halted(&self) -> bool {
        self.cpu.is_stopped()
    }

    /// Decodes the instruction register.
    pub fn current_instruction(&self) -> Instruction {
        self.state.current_instruction()
    }

    /// Performs the next phase, a fetch or an execute. Does nothing once stopped.
    pub fn step(&mut self) -> CpuState {
        match self.cpu {
            CpuState::PendingFetch => self.fetch(),
            CpuState::PendingExecute => self.execute(),
            CpuState::Stopped(_) => {}
        }

        self.cpu
    }

    /// Runs for at most `max_iterations` phases. Returns the number of phases performed.
    pub fn run(&mut self, max_iterations: usize) -> usize {
        let mut iterations = 0;

        while iterations < max_iterations && !self.halted() {
            self.step();
            iterations += 1;
        }

        if !self.halted() {
            debug!(self.logger, "iteration limit reached"; "iterations" => iterations);
        }

        iterations
    }

    pub fn into_run(self) -> Run {
        Run {
            state: self.state,
            cpu: self.cpu,
            input: self.input,
            output: self.output,
        }
    }

    fn fetch(&mut self) {
        let address = self.state.program_counter;
        self.state = fetch(&self.state);
        self.cpu = CpuState::PendingExecute;

        let word = self.state.instruction_register;
        trace!(self.logger, "fetch"; "address" => address, "word" => word);

        self.events.dispatch(Event::Fetched { address, word });
        self.events.dispatch(Event::RegisterChange {
            register: Register::Instruction,
            data: word as i32,
        });
    }

    fn execute(&mut self) {
        let instruction = self.current_instruction();
        let execution = execute(&self.state, self.input.peek());

        trace!(self.logger, "execute"; "instruction" => %instruction, "address" => self.state.program_counter);

        let previous = std::mem::replace(&mut self.state, execution.state);

        if execution.consumed_input {
            if let Some(value) = self.input.peek() {
                self.events.dispatch(Event::InputConsumed { value });
            }
            self.input.advance();
        }

        if let Instruction::Store(address) = instruction {
            self.events.dispatch(Event::MemoryChange {
                address,
                data: self.state.data_register,
            });
        }

        if previous.data_register != self.state.data_register {
            self.events.dispatch(Event::RegisterChange {
                register: Register::Data,
                data: self.state.data_register as i32,
            });
        }

        if previous.program_counter != self.state.program_counter {
            self.events.dispatch(Event::RegisterChange {
                register: Register::ProgramCounter,
                data: self.state.program_counter as i32,
            });
        }

        if let Some(value) = execution.output {
            self.output.push(value);
            self.events.dispatch(Event::Output { value });
        }

        self.cpu = match execution.stop_reason {
            Some(reason) => {
                debug!(self.logger, "machine stopped"; "reason" => ?reason, "address" => self.state.program_counter);
                self.events.dispatch(Event::Stopped { reason });
                CpuState::Stopped(reason)
            }
            None => CpuState::PendingFetch,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    fn state(program: &[Word]) -> MachineState {
        MachineState::load(program).unwrap()
    }

    #[test]
    fn fresh_memory() {
        let memory = Memory::new();

        assert_eq!(memory.cell(0), None);
        assert_eq!(memory.read(0), 0);
        assert_eq!(memory.read(ZERO_ADDRESS), 0);
        assert_eq!(memory.cell(ZERO_ADDRESS), Some(0));
        assert_eq!(memory.read(ONE_ADDRESS), 1);
        assert_eq!(memory.read(150), 0);
        assert!(Memory::is_constant(98));
        assert!(!Memory::is_constant(97));
    }

    #[test]
    fn load_rejects_bad_programs() {
        assert_eq!(
            Memory::load(&[0; 99]),
            Err(LoadError::TooLong { length: 99 })
        );
        assert_eq!(
            Memory::load(&[1, 2, 1000]),
            Err(LoadError::ValueOutOfRange { address: 2, value: 1000 })
        );
        assert!(Memory::load(&[0; 98]).is_ok());
    }

    #[test]
    fn fetch_leaves_program_counter() {
        let fetched = fetch(&state(&[303, 900]));

        assert_eq!(fetched.instruction_register, 303);
        assert_eq!(fetched.program_counter, 0);
    }

    #[test]
    fn fetch_past_memory_reads_stop() {
        let mut machine = state(&[]);
        machine.program_counter = 120;
        machine.instruction_register = 900;

        assert_eq!(fetch(&machine).instruction_register, 0);
    }

    #[test]
    fn execute_arithmetic() {
        let mut machine = state(&[103, 203, 0, 40]);
        machine.data_register = 2;

        machine.instruction_register = 103;
        let added = execute(&machine, None);
        assert_eq!(added.state.data_register, 42);
        assert_eq!(added.state.program_counter, 1);

        machine.instruction_register = 203;
        let subtracted = execute(&machine, None);
        assert_eq!(subtracted.state.data_register, -38);
    }

    #[test]
    fn arithmetic_saturates() {
        let mut machine = state(&[]);
        machine.memory.write(10, 900);
        machine.data_register = 500;

        machine.instruction_register = 110;
        assert_eq!(execute(&machine, None).state.data_register, 999);

        machine.data_register = -500;
        machine.instruction_register = 210;
        assert_eq!(execute(&machine, None).state.data_register, -999);
    }

    #[test]
    fn store_writes_memory() {
        let mut machine = state(&[]);
        machine.data_register = 7;
        machine.instruction_register = 450;

        let stored = execute(&machine, None);

        assert_eq!(stored.state.memory.cell(50), Some(7));
        assert_eq!(machine.memory.cell(50), None);
    }

    #[test]
    fn constants_are_writable() {
        let mut machine = state(&[]);
        machine.data_register = 5;
        machine.instruction_register = 498;

        assert_eq!(execute(&machine, None).state.memory.read(ZERO_ADDRESS), 5);
    }

    #[test]
    fn conditional_jumps() {
        let mut machine = state(&[]);
        machine.program_counter = 4;

        machine.instruction_register = 620;
        assert_eq!(execute(&machine, None).state.program_counter, 20);
        machine.instruction_register = 720;
        assert_eq!(execute(&machine, None).state.program_counter, 5);

        machine.data_register = 3;
        machine.instruction_register = 620;
        assert_eq!(execute(&machine, None).state.program_counter, 5);
        machine.instruction_register = 720;
        assert_eq!(execute(&machine, None).state.program_counter, 20);

        machine.data_register = -3;
        assert_eq!(execute(&machine, None).state.program_counter, 5);

        machine.instruction_register = 520;
        assert_eq!(execute(&machine, None).state.program_counter, 20);
    }

    #[test]
    fn read_without_input() {
        let mut machine = state(&[800]);
        machine.data_register = 12;
        machine.instruction_register = 800;

        let execution = execute(&machine, None);

        assert_eq!(execution.stop_reason, Some(StopReason::NoInput));
        assert_eq!(execution.state, machine);
        assert!(!execution.consumed_input);
    }

    #[test]
    fn read_and_write() {
        let mut machine = state(&[]);
        machine.instruction_register = 800;

        let read = execute(&machine, Some(-17));
        assert!(read.consumed_input);
        assert_eq!(read.state.data_register, -17);

        let mut machine = read.state;
        machine.instruction_register = 900;
        let written = execute(&machine, None);
        assert_eq!(written.output, Some(-17));
        assert_eq!(written.state.program_counter, 2);
    }

    #[test]
    fn stop_codes() {
        let mut machine = state(&[]);

        for code in &[0, 42, 99, -5, -300, 950] {
            machine.instruction_register = *code;
            let execution = execute(&machine, None);
            assert_eq!(execution.stop_reason, Some(StopReason::Stop), "{}", code);
            assert_eq!(execution.state.program_counter, 0);
        }
    }

    #[test]
    fn run_writes_loaded_value() {
        let result = run(
            state(&[303, 900, 0, 42]),
            CpuState::PendingFetch,
            InputStream::default(),
            OutputStream::default(),
            100,
        );

        assert_eq!(result.output.values(), &[42]);
        assert_eq!(result.cpu, CpuState::Stopped(StopReason::Stop));
        assert_eq!(result.state.program_counter, 2);
    }

    #[test]
    fn run_stops_at_iteration_limit() {
        let result = run(
            state(&[500]),
            CpuState::PendingFetch,
            InputStream::default(),
            OutputStream::default(),
            7,
        );

        assert_eq!(result.cpu, CpuState::PendingExecute);
    }

    #[test]
    fn run_waits_for_input() {
        let result = run(
            state(&[800, 900, 0]),
            CpuState::PendingFetch,
            InputStream::default(),
            OutputStream::default(),
            100,
        );

        assert_eq!(result.cpu, CpuState::Stopped(StopReason::NoInput));
        assert_eq!(result.input.cursor(), 0);
        assert_eq!(result.state.program_counter, 0);
    }

    #[test]
    fn input_is_saturated() {
        let input = InputStream::new(vec![5000, -1000, 12]);
        assert_eq!(input.values(), &[999, -999, 12]);

        let mut emulator = Emulator::new(&[800, 900, 800, 900, 0]).unwrap();
        emulator.push_input(vec![5000, Word::MIN]);
        emulator.run(100);

        assert_eq!(emulator.output.values(), &[999, -999]);
        assert_eq!(emulator.cpu, CpuState::Stopped(StopReason::Stop));
    }

    #[test]
    fn push_input_resumes() {
        let mut emulator = Emulator::new(&[800, 900, 500]).unwrap();

        emulator.run(100);
        assert_eq!(emulator.cpu, CpuState::Stopped(StopReason::NoInput));

        emulator.push_input(vec![5]);
        assert_eq!(emulator.cpu, CpuState::PendingExecute);

        emulator.run(100);
        assert_eq!(emulator.output.values(), &[5]);
        assert_eq!(emulator.cpu, CpuState::Stopped(StopReason::NoInput));
        assert!(emulator.input.is_exhausted());
    }

    #[test]
    fn events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();

        let mut emulator = Emulator::new(&[800, 450, 900, 0]).unwrap();
        emulator.add_listener(move |event: &Event| sink.borrow_mut().push(event.clone()));
        emulator.push_input(vec![3]);
        emulator.run(100);

        let events = events.borrow();

        assert!(events.contains(&Event::InputConsumed { value: 3 }));
        assert!(events.contains(&Event::MemoryChange { address: 50, data: 3 }));
        assert!(events.contains(&Event::Output { value: 3 }));
        assert!(events.contains(&Event::Fetched { address: 2, word: 900 }));
        assert_eq!(
            events.last(),
            Some(&Event::Stopped { reason: StopReason::Stop })
        );
    }
}
