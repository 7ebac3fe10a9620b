use crate::error::{Error, Result};
pub use mtc_instruction::wrap;
use mtc_instruction::WORD_MODULUS;

/// Number of cells a memory has when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 1024;

/// The largest capacity that can still be addressed with a 16-bit word.
pub const MAX_CAPACITY: usize = WORD_MODULUS as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Store,
    Retrieve,
}

/// Sent to every listener after a cell was read or written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryEvent {
    pub access: Access,
    pub address: u16,
    pub value: u16,
    /// 16 for whole words, 8 for the byte halves.
    pub width: u8,
}

pub type MemoryListener = Box<dyn Fn(&MemoryEvent)>;

/// A fixed number of 16-bit cells. Addresses wrap around the capacity and values wrap around
/// 65536.
pub struct Memory {
    cells: Vec<u16>,
    listeners: Vec<MemoryListener>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: vec![0; DEFAULT_CAPACITY],
            listeners: vec![],
        }
    }
}

impl Memory {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(Error::InvalidCapacity(capacity));
        }

        Ok(Self {
            cells: vec![0; capacity],
            listeners: vec![],
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Register a listener. Listeners are called synchronously and must not touch the memory.
    pub fn add_listener(&mut self, listener: impl Fn(&MemoryEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Read-only view of every cell.
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Wrap `address` into the capacity.
    #[inline]
    pub fn address(&self, address: impl Into<i64>) -> u16 {
        wrap(address.into(), self.capacity() as i64) as u16
    }

    pub fn get_word(&self, address: impl Into<i64>) -> u16 {
        let address = self.address(address);
        let value = self.cells[address as usize];
        self.notify(Access::Retrieve, address, value, 16);
        value
    }

    pub fn set_word(&mut self, address: impl Into<i64>, value: impl Into<i64>) {
        let address = self.address(address);
        let value = wrap(value.into(), WORD_MODULUS) as u16;
        self.cells[address as usize] = value;
        self.notify(Access::Store, address, value, 16);
    }

    pub fn get_high(&self, address: impl Into<i64>) -> u8 {
        let address = self.address(address);
        let value = (self.cells[address as usize] >> 8) as u8;
        self.notify(Access::Retrieve, address, value as u16, 8);
        value
    }

    pub fn set_high(&mut self, address: impl Into<i64>, value: u8) {
        let address = self.address(address);
        let cell = &mut self.cells[address as usize];
        *cell = (*cell & 0x00FF) | ((value as u16) << 8);
        self.notify(Access::Store, address, value as u16, 8);
    }

    pub fn get_low(&self, address: impl Into<i64>) -> u8 {
        let address = self.address(address);
        let value = (self.cells[address as usize] & 0x00FF) as u8;
        self.notify(Access::Retrieve, address, value as u16, 8);
        value
    }

    pub fn set_low(&mut self, address: impl Into<i64>, value: u8) {
        let address = self.address(address);
        let cell = &mut self.cells[address as usize];
        *cell = (*cell & 0xFF00) | value as u16;
        self.notify(Access::Store, address, value as u16, 8);
    }

    /// Write `values` to consecutive cells starting at `start`, wrapping past the end of memory.
    pub fn set_block(&mut self, start: impl Into<i64>, values: &[u16]) {
        let start = start.into();
        for (offset, value) in values.iter().enumerate() {
            self.set_word(start + offset as i64, *value);
        }
    }

    /// Clear every cell without notifying listeners.
    pub fn zero(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = 0);
    }

    fn notify(&self, access: Access, address: u16, value: u16, width: u8) {
        if self.listeners.is_empty() {
            return;
        }

        let event = MemoryEvent {
            access,
            address,
            value,
            width,
        };
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn capacity_limits() {
        assert_eq!(DEFAULT_CAPACITY, Memory::default().capacity());
        assert_eq!(16, Memory::with_capacity(16).unwrap().capacity());
        assert_eq!(
            MAX_CAPACITY,
            Memory::with_capacity(MAX_CAPACITY).unwrap().capacity()
        );
        assert!(matches!(
            Memory::with_capacity(0),
            Err(Error::InvalidCapacity(0))
        ));
        assert!(matches!(
            Memory::with_capacity(MAX_CAPACITY + 1),
            Err(Error::InvalidCapacity(_))
        ));
    }

    #[test]
    fn addresses_and_values_wrap() {
        let mut memory = Memory::with_capacity(16).unwrap();

        memory.set_word(-1, 70_000);
        assert_eq!(4464, memory.get_word(15));
        assert_eq!(4464, memory.get_word(31));

        memory.set_word(16, -1);
        assert_eq!(0xFFFF, memory.get_word(0));
    }

    #[test]
    fn byte_halves() {
        let mut memory = Memory::default();
        memory.set_word(3, 0x1234);

        assert_eq!(0x12, memory.get_high(3));
        assert_eq!(0x34, memory.get_low(3));

        memory.set_high(3, 0xAB);
        assert_eq!(0xAB34, memory.get_word(3));

        memory.set_low(3, 0xCD);
        assert_eq!(0xABCD, memory.get_word(3));
    }

    #[test]
    fn block_wraps_around() {
        let mut memory = Memory::with_capacity(4).unwrap();
        memory.set_block(3, &[1, 2, 3]);
        assert_eq!(&[2, 3, 0, 1], memory.cells());

        memory.zero();
        assert_eq!(&[0, 0, 0, 0], memory.cells());
    }

    #[test]
    fn listeners_see_every_access() {
        let events = Rc::new(RefCell::new(vec![]));

        let mut memory = Memory::with_capacity(8).unwrap();
        {
            let events = Rc::clone(&events);
            memory.add_listener(move |event| events.borrow_mut().push(*event));
        }

        memory.set_word(9, 5);
        memory.get_low(1);
        memory.set_block(0, &[7, 8]);

        assert_eq!(
            vec![
                MemoryEvent {
                    access: Access::Store,
                    address: 1,
                    value: 5,
                    width: 16
                },
                MemoryEvent {
                    access: Access::Retrieve,
                    address: 1,
                    value: 5,
                    width: 8
                },
                MemoryEvent {
                    access: Access::Store,
                    address: 0,
                    value: 7,
                    width: 16
                },
                MemoryEvent {
                    access: Access::Store,
                    address: 1,
                    value: 8,
                    width: 16
                },
            ],
            *events.borrow()
        );
    }
}
