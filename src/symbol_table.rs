//! Label and variable addresses resolved by the [assembler](crate::assembler).

use std::collections::HashMap;

use crate::emulator::{ONE_ADDRESS, ZERO_ADDRESS};
use crate::instruction::{Address, OperandKind};

/// Address given to the first variable of a program.
pub const FIRST_VARIABLE_SLOT: Address = 90;

/// The slot after `slot` in the variable allocation order.
///
/// Slots run `90, 91, ..., 97`, continue at `89` and count down to `0`, where
/// they stay. Addresses 98 and 99 hold the built-in constants and are never handed out.
pub fn next_variable_slot(slot: Address) -> Address {
    match slot {
        90..=96 => slot + 1,
        97 => 89,
        1..=89 => slot - 1,
        _ => 0,
    }
}

/// Labels and variables of a program, keyed by their lowercase names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    labels: HashMap<String, Address>,
    variables: HashMap<String, Address>,
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

impl SymbolTable {
    /// A table holding only the built-in variables `zero` and `one`.
    pub fn new() -> SymbolTable {
        let mut variables = HashMap::new();
        variables.insert("zero".to_string(), ZERO_ADDRESS);
        variables.insert("one".to_string(), ONE_ADDRESS);

        SymbolTable {
            labels: HashMap::new(),
            variables,
        }
    }

    pub fn label(&self, name: &str) -> Option<Address> {
        self.labels.get(&name.to_lowercase()).copied()
    }

    pub fn variable(&self, name: &str) -> Option<Address> {
        self.variables.get(&name.to_lowercase()).copied()
    }

    pub fn get(&self, name: &str, kind: OperandKind) -> Option<Address> {
        match kind {
            OperandKind::Label => self.label(name),
            OperandKind::Variable => self.variable(name),
        }
    }

    /// Declares a label. Returns `false` and keeps the old address if the label exists.
    pub fn define_label(&mut self, name: &str, address: Address) -> bool {
        let key = name.to_lowercase();

        if self.labels.contains_key(&key) {
            return false;
        }

        self.labels.insert(key, address);
        true
    }

    /// Declares a variable. Returns `false` and keeps the old address if the variable exists.
    pub fn define_variable(&mut self, name: &str, address: Address) -> bool {
        let key = name.to_lowercase();

        if self.variables.contains_key(&key) {
            return false;
        }

        self.variables.insert(key, address);
        true
    }

    /// Labels sorted by address.
    pub fn labels(&self) -> Vec<(&str, Address)> {
        sorted(&self.labels)
    }

    /// Variables sorted by address, including `zero` and `one`.
    pub fn variables(&self) -> Vec<(&str, Address)> {
        sorted(&self.variables)
    }
}

fn sorted(map: &HashMap<String, Address>) -> Vec<(&str, Address)> {
    let mut entries: Vec<_> = map.iter().map(|(name, addr)| (name.as_str(), *addr)).collect();
    entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
    entries
}
