//! Simulator for the Random Access Machine used in computability courses.
//!
//! A program is read line by line by the [`Scanner`](program::scan::Scanner),
//! turned into a [`Program`](program::Program) by the
//! [`Parser`](program::parse::Parser) and executed by the
//! [`Processor`](processor::Processor).

pub mod error;
pub mod memory;
pub mod processor;
pub mod program;
pub mod trace;

pub use error::{Error, Result};
pub use memory::{Address, Input, Registers, Value};
pub use processor::Processor;
pub use program::{Instruction, Mnemonic, Operand, Program};
pub use trace::Tracer;
