//! Observing a running machine.
//!
//! Every phase the [Emulator](crate::emulator::Emulator) performs is reported as
//! one or more [Events](Event) to the listeners registered with
//! [add_listener](crate::emulator::Emulator::add_listener). Visualizers use these to
//! animate the registers and memory cells without diffing machine states themselves.
//!
//! Closures taking `&Event` are listeners.

use std::fmt;

use crate::emulator::StopReason;
use crate::instruction::{Address, Instruction, Word};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    Instruction,
    Data,
    ProgramCounter,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Register::Instruction => write!(f, "IR"),
            Register::Data => write!(f, "DR"),
            Register::ProgramCounter => write!(f, "PC"),
        }
    }
}

/// A state change of the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// `word` was loaded from `address` into the instruction register.
    Fetched { address: Address, word: Word },

    /// A `STORE` wrote `data` to `address`.
    MemoryChange { address: Address, data: Word },

    /// A register got a new value.
    RegisterChange { register: Register, data: i32 },

    /// A `READ` took `value` from the input.
    InputConsumed { value: Word },

    /// A `WRITE` produced `value`.
    Output { value: Word },

    Stopped { reason: StopReason },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Fetched { address, word } => {
                write!(f, "{:>2}: {:>4}  {}", address, word, Instruction::decode(*word))
            }
            Event::MemoryChange { address, data } => write!(f, "[{}] <- {}", address, data),
            Event::RegisterChange { register, data } => write!(f, "{} <- {}", register, data),
            Event::InputConsumed { value } => write!(f, "read {}", value),
            Event::Output { value } => write!(f, "write {}", value),
            Event::Stopped { reason: StopReason::Stop } => write!(f, "stopped"),
            Event::Stopped { reason: StopReason::NoInput } => write!(f, "waiting for input"),
        }
    }
}

pub trait EventListener {
    fn event(&mut self, event: &Event);
}

impl<F> EventListener for F where F: Fn(&Event) {
    fn event(&mut self, event: &Event) {
        self(event)
    }
}

/// Fans events out to every registered listener, in registration order.
#[derive(Default)]
pub(crate) struct EventDispatcher {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventDispatcher {
    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&mut self, event: Event) {
        self.listeners
            .iter_mut()
            .for_each(|listener| listener.event(&event));
    }
}
