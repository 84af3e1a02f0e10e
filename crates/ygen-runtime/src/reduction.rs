//! Semantic values passed through reduction handlers.

use std::{
    fmt, mem,
    ops::{Index, IndexMut},
};

/// The trait for abstracting the semantic values produced by reduction handlers.
///
/// The rule families installed by [`RuleSet::install_family`] only need to
/// produce a null value and to build or open up sequences, so this is all the
/// runtime asks of the value type chosen by a grammar.
///
/// [`RuleSet::install_family`]: crate::definition::RuleSet::install_family
pub trait SemanticValue: Sized {
    /// The value of an empty (epsilon) reduction.
    fn null() -> Self;

    /// Return `true` if this value is the one returned by [`null`](Self::null).
    fn is_null(&self) -> bool;

    /// Wrap an ordered sequence of values.
    fn from_seq(items: Vec<Self>) -> Self;

    /// Unwrap a value built by [`from_seq`](Self::from_seq).
    ///
    /// Values that are not sequences are handed back in `Err`.
    fn into_seq(self) -> Result<Vec<Self>, Self>;
}

/// The argument of a reduction handler.
///
/// Slot `0` receives the result of the reduction (`$$` in Yacc terms) and
/// slots `1..len()` hold the values of the right-hand side symbols, in order.
pub struct Reduction<V> {
    slots: Vec<V>,
}

impl<V> fmt::Debug for Reduction<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.slots).finish()
    }
}

impl<V> Reduction<V>
where
    V: SemanticValue,
{
    /// Create a reduction over the values of the right-hand side symbols.
    pub fn new(children: Vec<V>) -> Self {
        let mut slots = Vec::with_capacity(children.len() + 1);
        slots.push(V::null());
        slots.extend(children);
        Self { slots }
    }

    /// Return the number of slots, including the result slot.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Move the value out of the specified slot, leaving a null value behind.
    pub fn take(&mut self, index: usize) -> V {
        mem::replace(&mut self.slots[index], V::null())
    }

    /// Store the result of this reduction.
    pub fn set(&mut self, value: V) {
        self.slots[0] = value;
    }

    /// Consume this reduction and return its result.
    pub fn into_result(mut self) -> V {
        self.take(0)
    }
}

impl<V> Index<usize> for Reduction<V> {
    type Output = V;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slots[index]
    }
}

impl<V> IndexMut<usize> for Reduction<V> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.slots[index]
    }
}
