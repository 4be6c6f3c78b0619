//! READ 1
//! STORE 1
//! READ 2
//! ADD 1
//! ADD =1

use std::fmt;
use std::io::BufRead;
use std::ops::Index;
use std::str::FromStr;

use crate::memory::{Address, Value};

pub mod parse;
pub mod scan;

/// Which argument forms a mnemonic accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentClass {
    /// No argument
    None,
    /// `X` or `(X)`
    DirectIndirect,
    /// `X` or `=X`, both naming a line of the program
    Line,
    /// `X`, `(X)` or `=X`
    DirectIndirectConstant,
}

impl ArgumentClass {
    /// The source forms accepted by this class
    pub fn forms(&self) -> &'static [&'static str] {
        match self {
            ArgumentClass::None => &[""],
            ArgumentClass::DirectIndirect => &[" X", " (X)"],
            ArgumentClass::Line => &[" X", " =X"],
            ArgumentClass::DirectIndirectConstant => &[" X", " (X)", " =X"],
        }
    }
}

macro_rules! mnemonics {
    ( $( $( #[doc = $doc:literal] )+ $name:ident => $class:ident , )+ ) => {
        /// The instruction set of the machine
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Mnemonic {
            $(
                $( #[doc = $doc] )+
                $name,
            )+
        }

        impl Mnemonic {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            pub fn class(&self) -> ArgumentClass {
                match self {
                    $( Self::$name => ArgumentClass::$class , )+
                }
            }

            /// Human readable description, taken from the doc comments
            pub fn description(&self) -> &'static str {
                match self {
                    $( Self::$name => concat!( $( $doc ),+ ).trim_start() , )+
                }
            }
        }

        impl ::std::fmt::Display for Mnemonic {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $( Self::$name => f.write_str(stringify!($name)) , )+
                }
            }
        }
    }
}

mnemonics! {
    /// Puts the value of an input register into r0
    READ => DirectIndirect,
    /// Puts the value of r0 into a register
    STORE => DirectIndirect,
    /// Puts a value into r0
    LOAD => DirectIndirectConstant,
    /// Adds a value to r0
    ADD => DirectIndirectConstant,
    /// Subtracts a value from r0
    SUB => DirectIndirectConstant,
    /// Halves the value of r0, rounding down
    HALF => None,
    /// Continues from the given line
    JUMP => Line,
    /// Continues from the given line if r0 > 0
    JPOS => Line,
    /// Continues from the given line if r0 = 0
    JZERO => Line,
    /// Continues from the given line if r0 < 0
    JNEG => Line,
    /// Stops the execution of the program
    HALT => None,
    /// Does nothing
    PASS => None,
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mnemonic::ALL
            .iter()
            .find(|mnemonic| s == mnemonic.name())
            .copied()
            .ok_or(())
    }
}

/// The argument of an instruction together with its addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    None,
    /// `X`: the register X, or line X for jumps
    Direct(Address),
    /// `(X)`: the register whose index is stored in register X
    Indirect(Address),
    /// `=X`: the value X itself, or line X for jumps
    Constant(Value),
}

impl Operand {
    /// The raw number written in the source, if any
    pub fn value(&self) -> Option<Value> {
        match *self {
            Operand::None => None,
            Operand::Direct(x) | Operand::Indirect(x) | Operand::Constant(x) => Some(x),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Direct(x) => write!(f, "{}", x),
            Operand::Indirect(x) => write!(f, "({})", x),
            Operand::Constant(x) => write!(f, "={}", x),
        }
    }
}

/// A single parsed line of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operand: Operand,
    /// Source line the instruction was read from
    pub line: usize,
}

impl Instruction {
    pub fn new(mnemonic: Mnemonic, operand: Operand, line: usize) -> Self {
        Self {
            mnemonic,
            operand,
            line,
        }
    }

    /// Placeholder for blank and comment-only lines
    pub fn pass(line: usize) -> Self {
        Self::new(Mnemonic::PASS, Operand::None, line)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{}", self.mnemonic),
            operand => write!(f, "{} {}", self.mnemonic, operand),
        }
    }
}

/// A parsed program. Instruction `i` comes from source line `i`, starting at 1.
/// Index 0 holds nothing: a program counter of 0 means the machine halted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Reads and parses a whole program from `reader`
    pub fn from_reader<R: BufRead>(reader: R) -> crate::Result<Self> {
        parse::Parser::new(scan::Scanner::new(reader)).parse()
    }

    /// Appends the instruction of the next source line
    pub(crate) fn push(&mut self, instruction: Instruction) {
        debug_assert_eq!(instruction.line, self.instructions.len() + 1);
        self.instructions.push(instruction);
    }

    /// Instruction at line `line`, `None` for line 0 or past the end
    pub fn get(&self, line: usize) -> Option<&Instruction> {
        self.instructions.get(line.checked_sub(1)?)
    }

    /// Number of source lines, which is also the highest valid jump target
    pub fn line_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}

impl Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, line: usize) -> &Self::Output {
        &self.instructions[line - 1]
    }
}

impl FromStr for Program {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}
