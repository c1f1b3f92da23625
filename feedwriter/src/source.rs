//! Source adapters.
//!
//! [`crate::Feed`] consumes any `IntoIterator`, so vectors, slices and
//! iterators are used directly. Sources that expose a pull cursor instead
//! (`has_current` / `current` / `advance`, the shape of a database result
//! set) are wrapped once with [`from_cursor`].

/// A pull-style cursor over source items.
pub trait Cursor {
    type Item;

    /// Whether the cursor points at an item.
    fn has_current(&self) -> bool;

    /// The item under the cursor. Only called while `has_current()` is true.
    fn current(&mut self) -> Self::Item;

    /// Move to the next item.
    fn advance(&mut self);
}

/// Iterator over a [`Cursor`].
#[derive(Debug)]
pub struct CursorIter<C> {
    cursor: C,
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.cursor.has_current() {
            return None;
        }
        let item = self.cursor.current();
        self.cursor.advance();
        Some(item)
    }
}

/// Adapt a cursor into an iterator.
pub fn from_cursor<C: Cursor>(cursor: C) -> CursorIter<C> {
    CursorIter { cursor }
}

/// Cursor over an owned vector, mostly useful in tests and examples.
#[derive(Debug, Clone)]
pub struct VecCursor<T> {
    items: Vec<T>,
    position: usize,
}

impl<T> VecCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, position: 0 }
    }

    /// How many times `advance` has moved the cursor.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T: Clone> Cursor for VecCursor<T> {
    type Item = T;

    fn has_current(&self) -> bool {
        self.position < self.items.len()
    }

    fn current(&mut self) -> T {
        self.items[self.position].clone()
    }

    fn advance(&mut self) {
        self.position += 1;
    }
}
