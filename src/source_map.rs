//! Mapping between memory locations and source code spans.

use std::collections::HashMap;
use std::iter::FromIterator;

use crate::instruction::Address;
use crate::parsing::SourceSpan;

/// Memory addresses mapped to where their contents came from. Assembled programs
/// use [SourceSpan] as `V`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap<V> {
    inner: HashMap<Address, V>,
}

impl<V> Default for SourceMap<V> {
    fn default() -> Self {
        SourceMap {
            inner: HashMap::new(),
        }
    }
}

impl<V> FromIterator<(Address, V)> for SourceMap<V> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Address, V)>,
    {
        SourceMap {
            inner: HashMap::from_iter(iter),
        }
    }
}

impl<V> SourceMap<V> {
    /// The span of the statement that produced the word at `addr`.
    pub fn get_source_span(&self, addr: Address) -> Option<&V> {
        self.inner.get(&addr)
    }

    pub fn insert(&mut self, addr: Address, span: V) {
        self.inner.insert(addr, span);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl SourceMap<SourceSpan> {
    /// The memory address whose instruction was written on `line`, if any.
    pub fn address_of_line(&self, line: usize) -> Option<Address> {
        self.inner
            .iter()
            .find(|(_, span)| span.line == line)
            .map(|(addr, _)| *addr)
    }
}
