//! types for representing instructions and their parts

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

/// A machine word. Every memory cell and register holds a value in `[-999, 999]`.
pub type Word = i16;

/// A memory address in `[0, 99]`.
pub type Address = usize;

/// Instructions that take no operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NullaryOp {
    /// Reads the next input value into the data register.
    Read,

    /// Appends the data register to the output.
    Write,

    /// Halts the machine.
    Stop,
}

/// Instructions that take a symbolic operand, encoded as an address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Adds the value of a variable to the data register.
    Add,

    /// Subtracts the value of a variable from the data register.
    Sub,

    /// Copies the value of a variable into the data register.
    Load,

    /// Copies the data register into a variable.
    Store,

    /// Jumps to a label unconditionally.
    Goto,

    /// Jumps to a label if the data register is zero.
    GotoZ,

    /// Jumps to a label if the data register is positive.
    GotoP,
}

/// What an operand name refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Variable,
    Label,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OperandKind::Variable => write!(f, "variable"),
            OperandKind::Label => write!(f, "label"),
        }
    }
}

/// Any of the ten mnemonics of the machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    Nullary(NullaryOp),
    Unary(UnaryOp),
}

lazy_static! {
    /// Mnemonics keyed by their lowercase spelling.
    static ref MNEMONICS: HashMap<&'static str, OpCode> = {
        let mut table = HashMap::new();

        for op in OpCode::ALL.iter() {
            table.insert(op.mnemonic(), *op);
        }

        table
    };
}

impl OpCode {
    pub const ALL: [OpCode; 10] = [
        OpCode::Unary(UnaryOp::Add),
        OpCode::Unary(UnaryOp::Sub),
        OpCode::Unary(UnaryOp::Load),
        OpCode::Unary(UnaryOp::Store),
        OpCode::Unary(UnaryOp::Goto),
        OpCode::Unary(UnaryOp::GotoZ),
        OpCode::Unary(UnaryOp::GotoP),
        OpCode::Nullary(NullaryOp::Read),
        OpCode::Nullary(NullaryOp::Write),
        OpCode::Nullary(NullaryOp::Stop),
    ];

    /// Looks up a mnemonic case-insensitively.
    pub fn from_mnemonic(word: &str) -> Option<OpCode> {
        MNEMONICS.get(word.to_lowercase().as_str()).copied()
    }

    /// Lowercase spelling of the mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Nullary(op) => op.mnemonic(),
            OpCode::Unary(op) => op.mnemonic(),
        }
    }

    /// The hundreds part of the numeric encoding.
    pub fn category(&self) -> Word {
        match self {
            OpCode::Nullary(op) => op.code(),
            OpCode::Unary(op) => op.category(),
        }
    }
}

impl FromStr for OpCode {
    type Err = ();

    fn from_str(input: &str) -> Result<OpCode, ()> {
        OpCode::from_mnemonic(input).ok_or(())
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic().to_uppercase())
    }
}

impl NullaryOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            NullaryOp::Read => "read",
            NullaryOp::Write => "write",
            NullaryOp::Stop => "stop",
        }
    }

    /// The complete numeric encoding of the instruction.
    pub fn code(&self) -> Word {
        match self {
            NullaryOp::Read => 800,
            NullaryOp::Write => 900,
            NullaryOp::Stop => 0,
        }
    }
}

impl fmt::Display for NullaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic().to_uppercase())
    }
}

impl UnaryOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            UnaryOp::Add => "add",
            UnaryOp::Sub => "sub",
            UnaryOp::Load => "load",
            UnaryOp::Store => "store",
            UnaryOp::Goto => "goto",
            UnaryOp::GotoZ => "gotoz",
            UnaryOp::GotoP => "gotop",
        }
    }

    /// Data instructions name variables, jumps name labels.
    pub fn operand_kind(&self) -> OperandKind {
        match self {
            UnaryOp::Add | UnaryOp::Sub | UnaryOp::Load | UnaryOp::Store => OperandKind::Variable,
            UnaryOp::Goto | UnaryOp::GotoZ | UnaryOp::GotoP => OperandKind::Label,
        }
    }

    pub fn category(&self) -> Word {
        match self {
            UnaryOp::Add => 100,
            UnaryOp::Sub => 200,
            UnaryOp::Load => 300,
            UnaryOp::Store => 400,
            UnaryOp::Goto => 500,
            UnaryOp::GotoZ => 600,
            UnaryOp::GotoP => 700,
        }
    }

    /// Encodes the instruction with the given operand address.
    pub fn encode(&self, address: Address) -> Word {
        self.category() + address as Word
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic().to_uppercase())
    }
}

/// A decoded instruction, as executed by the [emulator](crate::emulator).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Add(Address),
    Sub(Address),
    Load(Address),
    Store(Address),
    Goto(Address),
    GotoZ(Address),
    GotoP(Address),
    Read,
    Write,
    Stop,
}

impl Instruction {
    /// Decodes a word. Decoding is total: everything without a known category,
    /// including the whole range `[0, 99]`, is `STOP`.
    pub fn decode(word: Word) -> Instruction {
        let remainder = word % 100;
        let category = word - remainder;
        let address = remainder as Address;

        match category {
            100 => Instruction::Add(address),
            200 => Instruction::Sub(address),
            300 => Instruction::Load(address),
            400 => Instruction::Store(address),
            500 => Instruction::Goto(address),
            600 => Instruction::GotoZ(address),
            700 => Instruction::GotoP(address),
            800 => Instruction::Read,
            900 => Instruction::Write,
            _ => Instruction::Stop,
        }
    }

    /// Canonical encoding. `decode(ins.encode()) == ins` for every instruction.
    pub fn encode(&self) -> Word {
        match self.opcode() {
            OpCode::Nullary(op) => op.code(),
            OpCode::Unary(op) => op.encode(self.address().unwrap_or(0)),
        }
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Add(_) => OpCode::Unary(UnaryOp::Add),
            Instruction::Sub(_) => OpCode::Unary(UnaryOp::Sub),
            Instruction::Load(_) => OpCode::Unary(UnaryOp::Load),
            Instruction::Store(_) => OpCode::Unary(UnaryOp::Store),
            Instruction::Goto(_) => OpCode::Unary(UnaryOp::Goto),
            Instruction::GotoZ(_) => OpCode::Unary(UnaryOp::GotoZ),
            Instruction::GotoP(_) => OpCode::Unary(UnaryOp::GotoP),
            Instruction::Read => OpCode::Nullary(NullaryOp::Read),
            Instruction::Write => OpCode::Nullary(NullaryOp::Write),
            Instruction::Stop => OpCode::Nullary(NullaryOp::Stop),
        }
    }

    /// The operand address, for addressed instructions.
    pub fn address(&self) -> Option<Address> {
        match *self {
            Instruction::Add(addr)
            | Instruction::Sub(addr)
            | Instruction::Load(addr)
            | Instruction::Store(addr)
            | Instruction::Goto(addr)
            | Instruction::GotoZ(addr)
            | Instruction::GotoP(addr) => Some(addr),
            Instruction::Read | Instruction::Write | Instruction::Stop => None,
        }
    }
}

impl From<Word> for Instruction {
    fn from(word: Word) -> Instruction {
        Instruction::decode(word)
    }
}

impl From<Instruction> for Word {
    fn from(ins: Instruction) -> Word {
        ins.encode()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.address() {
            Some(addr) => write!(f, "{} {}", self.opcode(), addr),
            None => write!(f, "{}", self.opcode()),
        }
    }
}
