//! A bounded append/consume cursor over caller-owned storage.
//!
//! Both sides of the codec walk their buffers through this type instead
//! of raw slices and offsets. It tracks two positions: `current`, which
//! advances as items are written or consumed, and `start`, a checkpoint
//! that marks the beginning of the region being worked on. The decoder
//! relies on the checkpoint to reach back into the bytes it has already
//! emitted when it recomputes checksums and parity.

use crate::lib_error_handling::Ecm2Error;

/// Fixed-capacity buffer with a consuming cursor and a checkpoint.
#[derive(Debug)]
pub struct DataBuffer<T> {
    data: Vec<T>,
    current: usize,
    start: usize,
}

impl<T: Copy + Default> DataBuffer<T> {
    /// Creates a buffer of `len` default-initialized items with both
    /// positions at zero.
    pub fn new(len: usize) -> Self {
        DataBuffer {
            data: vec![T::default(); len],
            current: 0,
            start: 0,
        }
    }

    /// Wraps an existing vector without copying it.
    pub fn from_vec(data: Vec<T>) -> Self {
        DataBuffer {
            data,
            current: 0,
            start: 0,
        }
    }

    /// Items between the cursor and the end of the storage.
    pub fn available(&self) -> usize {
        self.data.len().saturating_sub(self.current)
    }

    /// Current cursor position, measured from the start of the storage.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Total capacity of the underlying storage.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The region between the checkpoint and the cursor.
    pub fn since_checkpoint(&self) -> &[T] {
        &self.data[self.start..self.current]
    }

    /// Moves the cursor forward without touching the contents.
    pub fn advance(&mut self, count: usize) -> Result<(), Ecm2Error> {
        if count > self.available() {
            return Err(Ecm2Error::NotEnoughInputData);
        }
        self.current += count;
        Ok(())
    }

    /// Returns the next `count` items and advances the cursor past them.
    pub fn consume(&mut self, count: usize) -> Result<&[T], Ecm2Error> {
        if count > self.available() {
            return Err(Ecm2Error::NotEnoughInputData);
        }
        let taken = &self.data[self.current..self.current + count];
        self.current += count;
        Ok(taken)
    }

    /// Mutable variant of [`DataBuffer::consume`], used by the decoder to
    /// claim the slot it will rebuild a sector into.
    pub fn consume_mut(&mut self, count: usize) -> Result<&mut [T], Ecm2Error> {
        if count > self.available() {
            return Err(Ecm2Error::NotEnoughOutputSpace);
        }
        let taken = &mut self.data[self.current..self.current + count];
        self.current += count;
        Ok(taken)
    }

    /// Copies `items` in at the cursor and advances past them.
    pub fn write(&mut self, items: &[T]) -> Result<(), Ecm2Error> {
        if items.len() > self.available() {
            return Err(Ecm2Error::NotEnoughOutputSpace);
        }
        self.data[self.current..self.current + items.len()]
            .copy_from_slice(items);
        self.current += items.len();
        Ok(())
    }

    /// Moves the checkpoint up to the cursor.
    pub fn checkpoint(&mut self) {
        self.start = self.current;
    }

    /// Moves the cursor back to the checkpoint.
    pub fn rewind_to_checkpoint(&mut self) {
        self.current = self.start;
    }

    /// Resets both positions to the beginning of the storage.
    pub fn reset(&mut self) {
        self.current = 0;
        self.start = 0;
    }

    /// Read-only view of the whole underlying storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the buffer and hands the storage back to the caller.
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}
