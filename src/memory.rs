use std::convert::TryFrom;
use std::collections::BTreeMap;
use std::fmt;

pub type Value = i64; // contents of a register
pub type Address = i64; // index of a register

/// Index of the accumulator
pub const ACCUMULATOR: Address = 0;

/// Sparse data registers of the machine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Registers {
    /// Every register written so far. Absent registers read as zero.
    pub data: BTreeMap<Address, Value>,
}

impl Default for Registers {
    /// Initializes the registers with an accumulator of zero
    fn default() -> Self {
        let mut data = BTreeMap::new();
        data.insert(ACCUMULATOR, 0);
        Registers { data }
    }
}

impl Registers {
    /// Reads a register, unset registers read as zero
    pub fn read(&self, address: Address) -> Value {
        self.get(address).unwrap_or(0)
    }

    /// Reads a register, `None` if it has never been written
    pub fn get(&self, address: Address) -> Option<Value> {
        self.data.get(&address).copied()
    }

    /// Returns true if the register has been written before
    pub fn is_set(&self, address: Address) -> bool {
        self.data.contains_key(&address)
    }

    /// Writes a value to a register
    pub fn write(&mut self, address: Address, value: Value) {
        self.data.insert(address, value);
    }

    /// Reads the accumulator (register 0)
    pub fn accumulator(&self) -> Value {
        self.read(ACCUMULATOR)
    }

    /// Writes the accumulator (register 0)
    pub fn set_accumulator(&mut self, value: Value) {
        self.write(ACCUMULATOR, value);
    }

    /// Reads the register whose index is stored in `address`.
    /// Both levels read as zero when unset.
    pub fn read_indirect(&self, address: Address) -> Value {
        self.read(self.read(address))
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (address, value)) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", address, value)?;
        }
        f.write_str("}")
    }
}

/// Read-only input registers, addressed starting at 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Input {
    values: Vec<Value>,
}

impl Input {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Reads the input register at `index` (1-based)
    pub fn get(&self, index: Value) -> Option<Value> {
        let index = usize::try_from(index).ok()?.checked_sub(1)?;
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Input {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_accumulator_starts_at_zero() -> Result<()> {
        let regs = Registers::default();
        assert!(regs.is_set(ACCUMULATOR));
        assert_eq!(regs.accumulator(), 0);
        assert_eq!(regs.data.len(), 1);

        Ok(())
    }

    #[test]
    fn test_unset_register_reads_zero() -> Result<()> {
        let regs = Registers::default();
        assert_eq!(regs.read(42), 0);
        assert_eq!(regs.get(42), None);
        assert!(!regs.is_set(42));

        Ok(())
    }

    #[test]
    fn test_write_register() -> Result<()> {
        let mut regs = Registers::default();
        regs.write(7, -3);
        assert_eq!(regs.read(7), -3);
        assert!(regs.is_set(7));

        // written zero is still set
        regs.write(8, 0);
        assert_eq!(regs.get(8), Some(0));

        Ok(())
    }

    #[test]
    fn test_read_indirect() -> Result<()> {
        let mut regs = Registers::default();
        regs.write(1, 5);
        regs.write(5, 99);
        assert_eq!(regs.read_indirect(1), 99);
        // pointer to unset register
        regs.write(2, 6);
        assert_eq!(regs.read_indirect(2), 0);
        // unset pointer points at the accumulator
        regs.set_accumulator(11);
        assert_eq!(regs.read_indirect(3), 11);

        Ok(())
    }

    #[test]
    fn test_display_registers() -> Result<()> {
        let mut regs = Registers::default();
        regs.write(3, 4);
        regs.write(1, 2);
        assert_eq!(regs.to_string(), "{0: 0, 1: 2, 3: 4}");

        Ok(())
    }

    #[test]
    fn test_input_is_one_indexed() -> Result<()> {
        let input = Input::new(vec![10, 20, 30]);
        assert_eq!(input.get(1), Some(10));
        assert_eq!(input.get(3), Some(30));
        assert_eq!(input.get(0), None);
        assert_eq!(input.get(4), None);
        assert_eq!(input.get(-1), None);
        assert_eq!(input.to_string(), "[10, 20, 30]");

        Ok(())
    }
}
