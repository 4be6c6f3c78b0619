use std::convert::TryFrom;
use std::error;
use std::fmt;

use crate::memory::{Address, Input, Registers, Value};
use crate::program::{Instruction, Mnemonic, Operand, Program};
use log::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    InputIndexOutOfRange { index: Value, len: usize },
    UndefinedIndirectRegister { address: Address },
    JumpTargetOutOfRange { target: Value, last_line: usize },
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorKind::InputIndexOutOfRange { index, len } => write!(
                f,
                "there is no input register {} (input registers are 1 to {})",
                index, len
            ),
            RuntimeErrorKind::UndefinedIndirectRegister { address } => write!(
                f,
                "invalid indirect addressing, data register {} has not been used yet",
                address
            ),
            RuntimeErrorKind::JumpTargetOutOfRange { target, last_line } => write!(
                f,
                "invalid jump, there is no line {} in the code (last line is {})",
                target, last_line
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    kind: RuntimeErrorKind,
    instruction: Instruction,
}

impl RuntimeError {
    fn new(kind: RuntimeErrorKind, instruction: Instruction) -> Self {
        Self { kind, instruction }
    }

    pub fn kind(&self) -> RuntimeErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.instruction.line
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error [ln: {}]: runtime error, {} - `{}`",
            self.instruction.line, self.kind, self.instruction
        )
    }
}

impl error::Error for RuntimeError {}

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

/// Emulates the random access machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    /// Program counter. Line of the next instruction, 0 once halted.
    pub pc: usize,
    pub registers: Registers,
    program: Program,
    input: Input,
}

impl Processor {
    /// Initializes a machine at the first line of `program`
    pub fn new<I: Into<Input>>(program: Program, input: I) -> Self {
        Self {
            pc: 1,
            registers: Registers::default(),
            program,
            input: input.into(),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Returns true once the program counter reached 0
    pub fn is_halted(&self) -> bool {
        self.pc == 0
    }

    /// The instruction the next step will execute, if any
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.program.get(self.pc)
    }

    /// Executes a single instruction
    pub fn execute_instruction(&mut self, instruction: Instruction) -> Result<()> {
        let Instruction {
            mnemonic, operand, ..
        } = instruction;

        match mnemonic {
            Mnemonic::READ => {
                let index = match operand {
                    Operand::Indirect(address) => match self.registers.get(address) {
                        Some(index) => index,
                        None => {
                            return Err(RuntimeError::new(
                                RuntimeErrorKind::UndefinedIndirectRegister { address },
                                instruction,
                            ))
                        }
                    },
                    operand => operand.value().unwrap_or_default(),
                };
                let value = self.input.get(index).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::InputIndexOutOfRange {
                            index,
                            len: self.input.len(),
                        },
                        instruction,
                    )
                })?;
                self.registers.set_accumulator(value);
                self.pc += 1;

                debug!("READ {}: {}", operand, value);
            }
            Mnemonic::STORE => {
                let value = self.registers.accumulator();
                let address = match operand {
                    // an unused pointer leaves everything as it is
                    Operand::Indirect(address) => self.registers.get(address),
                    operand => Some(operand.value().unwrap_or_default()),
                };
                if let Some(address) = address {
                    self.registers.write(address, value);
                }
                self.pc += 1;

                debug!("STORE {}: {}", operand, value);
            }
            Mnemonic::LOAD => {
                let value = self.fetch(operand);
                self.registers.set_accumulator(value);
                self.pc += 1;

                debug!("LOAD {}: {}", operand, value);
            }
            Mnemonic::ADD => {
                let a = self.registers.accumulator();
                let b = self.fetch(operand);
                let result = a.wrapping_add(b);
                self.registers.set_accumulator(result);
                self.pc += 1;

                debug!("ADD {} {}: {}", a, b, result);
            }
            Mnemonic::SUB => {
                let a = self.registers.accumulator();
                let b = self.fetch(operand);
                let result = a.wrapping_sub(b);
                self.registers.set_accumulator(result);
                self.pc += 1;

                debug!("SUB {} {}: {}", a, b, result);
            }
            Mnemonic::HALF => {
                let value = self.registers.accumulator();
                // rounds towards negative infinity
                let result = value.div_euclid(2);
                self.registers.set_accumulator(result);
                self.pc += 1;

                debug!("HALF {}: {}", value, result);
            }
            Mnemonic::JUMP => {
                self.pc = self.jump_target(instruction)?;

                debug!("JUMP {}", self.pc);
            }
            Mnemonic::JPOS | Mnemonic::JZERO | Mnemonic::JNEG => {
                let target = self.jump_target(instruction)?;
                let value = self.registers.accumulator();
                let taken = match mnemonic {
                    Mnemonic::JPOS => value > 0,
                    Mnemonic::JZERO => value == 0,
                    _ => value < 0,
                };
                if taken {
                    self.pc = target;
                } else {
                    self.pc += 1;
                }

                debug!("{} {}: {} (taken: {})", mnemonic, target, value, taken);
            }
            Mnemonic::HALT => {
                self.pc = 0;

                debug!("HALT");
            }
            Mnemonic::PASS => {
                self.pc += 1;

                trace!("PASS");
            }
        }

        Ok(())
    }

    /// Value of a LOAD, ADD or SUB operand. Unset registers read as zero.
    fn fetch(&self, operand: Operand) -> Value {
        match operand {
            Operand::None => 0,
            Operand::Direct(address) => self.registers.read(address),
            Operand::Indirect(address) => self.registers.read_indirect(address),
            Operand::Constant(value) => value,
        }
    }

    /// Checks that the target of a jump is a line of the program
    fn jump_target(&self, instruction: Instruction) -> Result<usize> {
        let target = instruction.operand.value().unwrap_or_default();
        let last_line = self.program.line_count();

        usize::try_from(target)
            .ok()
            .filter(|&line| line <= last_line)
            .ok_or_else(|| {
                RuntimeError::new(
                    RuntimeErrorKind::JumpTargetOutOfRange { target, last_line },
                    instruction,
                )
            })
    }

    /// Runs one execution step. Running past the last line halts the machine.
    pub fn execute(&mut self) -> Result<()> {
        match self.current_instruction().copied() {
            Some(instruction) => self.execute_instruction(instruction),
            None => {
                self.pc = 0;
                Ok(())
            }
        }
    }

    /// Runs the program until the machine halts and returns the accumulator
    pub fn run(&mut self) -> Result<Value> {
        while !self.is_halted() {
            self.execute()?;
        }

        let result = self.registers.accumulator();
        info!("Program terminated. Result: {}", result);

        Ok(result)
    }
}
