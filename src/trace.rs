use std::io::Write;

use crate::memory::Value;
use crate::processor::Processor;

const SEPARATOR: &str = "-----------------------";

/// Runs a [`Processor`] step by step, writing its state around every step.
#[derive(Debug)]
pub struct Tracer<W> {
    processor: Processor,
    out: W,
    step: usize,
}

impl<W: Write> Tracer<W> {
    pub fn new(processor: Processor, out: W) -> Self {
        Self {
            processor,
            out,
            step: 0,
        }
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Gives back the writer, e.g. to inspect a buffer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_initial_state(&mut self) -> crate::Result<()> {
        writeln!(self.out, "Initial state:")?;
        writeln!(self.out, "Input registers : {}", self.processor.input())?;
        writeln!(self.out, "Data registers : {}", self.processor.registers)?;
        writeln!(self.out, "Program counter : {}", self.processor.pc)?;
        writeln!(self.out, "{}", SEPARATOR)?;

        Ok(())
    }

    /// Executes one instruction and writes the state before and after it.
    /// Running past the last line halts silently, like [`Processor::execute`].
    pub fn step(&mut self) -> crate::Result<()> {
        let instruction = match self.processor.current_instruction().copied() {
            Some(instruction) => instruction,
            None => {
                self.processor.execute()?;
                return Ok(());
            }
        };

        self.step += 1;
        writeln!(self.out, "Step : {}", self.step)?;
        writeln!(self.out, "Program counter value : {}", self.processor.pc)?;
        writeln!(self.out, "Executing an instruction : {}", instruction)?;

        self.processor.execute_instruction(instruction)?;

        writeln!(self.out, "Input registers : {}", self.processor.input())?;
        writeln!(self.out, "Data registers : {}", self.processor.registers)?;
        if self.processor.is_halted() {
            writeln!(self.out, "Program has ended successfully.")?;
        } else {
            writeln!(self.out, "New program counter value : {}", self.processor.pc)?;
        }
        writeln!(self.out, "{}", SEPARATOR)?;

        Ok(())
    }

    /// Runs the program to the end, tracing every step, and returns the
    /// accumulator.
    pub fn run(&mut self) -> crate::Result<Value> {
        self.write_initial_state()?;

        while !self.processor.is_halted() {
            self.step()?;
        }

        let result = self.processor.registers.accumulator();
        writeln!(self.out, "Output : {}", result)?;
        log::info!("Program terminated after {} steps. Result: {}", self.step, result);

        Ok(result)
    }
}
