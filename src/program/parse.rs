use std::error;
use std::fmt;
use std::io::BufRead;

use crate::memory::Value;
use crate::program::scan::{Scanner, Token, TokenKind};
use crate::program::{ArgumentClass, Instruction, Mnemonic, Operand, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    TooManyTokensOnLine,
    MissingInstructionName,
    MissingArgument,
    NonNumericAfterParen,
    MissingCloseParen,
    ExpectedNumberAfterEquals,
    IncompleteInstructionAtEndOfInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::TooManyTokensOnLine => {
                f.write_str("multiple instructions in one line detected")
            }
            ParseErrorKind::MissingInstructionName => {
                f.write_str("too many arguments or no instruction name")
            }
            ParseErrorKind::MissingArgument => f.write_str("incomplete instruction"),
            ParseErrorKind::NonNumericAfterParen => f.write_str("non-numeric token after `(`"),
            ParseErrorKind::MissingCloseParen => f.write_str("missing `)`"),
            ParseErrorKind::ExpectedNumberAfterEquals => {
                f.write_str("expected a numeric value after `=`")
            }
            ParseErrorKind::IncompleteInstructionAtEndOfInput => {
                f.write_str("incomplete instruction")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: String,
    /// `None` when the source ended in the middle of an instruction
    line_nr: Option<usize>,
}

impl ParseError {
    fn new<C: Into<String>>(kind: ParseErrorKind, context: C, line_nr: Option<usize>) -> Self {
        Self {
            kind,
            context: context.into(),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> Option<usize> {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_nr {
            Some(line_nr) => write!(
                f,
                "error [ln: {}]: parse error, {} - `{}`",
                line_nr, self.kind, self.context
            ),
            None => write!(
                f,
                "error [last instruction]: parse error, {} - `{}`",
                self.kind, self.context
            ),
        }
    }
}

impl error::Error for ParseError {}

/// Builds a [`Program`] from the tokens of a [`Scanner`], one instruction per
/// source line.
#[derive(Debug)]
pub struct Parser<R> {
    scanner: Scanner<R>,
    program: Program,
}

impl<R: BufRead> Parser<R> {
    pub fn new(scanner: Scanner<R>) -> Self {
        Self {
            scanner,
            program: Program::default(),
        }
    }

    /// Consumes `self` and parses the whole source into a [`Program`].
    ///
    /// # Errors
    ///
    /// Stops at the first scan or parse error.
    pub fn parse(mut self) -> crate::Result<Program> {
        while let Some(instruction) = self.parse_next_line()? {
            log::debug!("[{}] Parsed instruction {}", instruction.line, instruction);
            self.program.push(instruction);
        }

        log::debug!("Parsed {} lines", self.program.line_count());

        Ok(self.program)
    }

    fn next_token(&mut self) -> crate::Result<Option<Token>> {
        Ok(self.scanner.next_token()?)
    }

    /// Like [`Parser::next_token`], but the source may not end here.
    fn expect_token(&mut self, mnemonic: Mnemonic) -> crate::Result<Token> {
        self.next_token()?.ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::IncompleteInstructionAtEndOfInput,
                mnemonic.name(),
                None,
            )
            .into()
        })
    }

    /// Parses the instruction of the next source line, `None` at the end of
    /// the source.
    fn parse_next_line(&mut self) -> crate::Result<Option<Instruction>> {
        let token = match self.next_token()? {
            Some(token) => token,
            None => return Ok(None),
        };

        let mnemonic = match token.kind {
            // Blank or comment line; keeps line numbers and indices aligned
            TokenKind::Newline => return Ok(Some(Instruction::pass(token.line))),
            TokenKind::Keyword(mnemonic) => mnemonic,
            kind => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingInstructionName,
                    kind.to_string(),
                    Some(token.line),
                )
                .into())
            }
        };

        let operand = match mnemonic.class() {
            ArgumentClass::None => Operand::None,
            ArgumentClass::DirectIndirect => self.parse_direct_indirect(mnemonic)?,
            ArgumentClass::Line => self.parse_line(mnemonic)?,
            ArgumentClass::DirectIndirectConstant => {
                self.parse_direct_indirect_constant(mnemonic)?
            }
        };

        let end = self.expect_token(mnemonic)?;
        if end.kind != TokenKind::Newline {
            return Err(ParseError::new(
                ParseErrorKind::TooManyTokensOnLine,
                end.kind.to_string(),
                Some(end.line),
            )
            .into());
        }

        Ok(Some(Instruction::new(mnemonic, operand, token.line)))
    }

    /// Parses `X` or `(X)`.
    fn parse_direct_indirect(&mut self, mnemonic: Mnemonic) -> crate::Result<Operand> {
        let token = self.expect_token(mnemonic)?;
        match token.kind {
            TokenKind::Number(x) => Ok(Operand::Direct(x)),
            TokenKind::LeftParen => self.parse_indirect(mnemonic),
            _ => Err(missing_argument(mnemonic, &token)),
        }
    }

    /// Parses `X` or `=X`, both naming a line.
    fn parse_line(&mut self, mnemonic: Mnemonic) -> crate::Result<Operand> {
        let token = self.expect_token(mnemonic)?;
        match token.kind {
            TokenKind::Number(x) => Ok(Operand::Direct(x)),
            TokenKind::Equals => Ok(Operand::Constant(self.parse_constant(mnemonic)?)),
            _ => Err(missing_argument(mnemonic, &token)),
        }
    }

    /// Parses `X`, `(X)` or `=X`.
    fn parse_direct_indirect_constant(&mut self, mnemonic: Mnemonic) -> crate::Result<Operand> {
        let token = self.expect_token(mnemonic)?;
        match token.kind {
            TokenKind::Number(x) => Ok(Operand::Direct(x)),
            TokenKind::LeftParen => self.parse_indirect(mnemonic),
            TokenKind::Equals => Ok(Operand::Constant(self.parse_constant(mnemonic)?)),
            _ => Err(missing_argument(mnemonic, &token)),
        }
    }

    /// Parses the `X)` after an opening parenthesis.
    fn parse_indirect(&mut self, mnemonic: Mnemonic) -> crate::Result<Operand> {
        let token = self.expect_token(mnemonic)?;
        let address = match token.kind {
            TokenKind::Number(x) => x,
            kind => {
                return Err(ParseError::new(
                    ParseErrorKind::NonNumericAfterParen,
                    kind.to_string(),
                    Some(token.line),
                )
                .into())
            }
        };

        let token = self.expect_token(mnemonic)?;
        if token.kind != TokenKind::RightParen {
            return Err(ParseError::new(
                ParseErrorKind::MissingCloseParen,
                mnemonic.name(),
                Some(token.line),
            )
            .into());
        }

        Ok(Operand::Indirect(address))
    }

    /// Parses the `X` after an equals sign.
    fn parse_constant(&mut self, mnemonic: Mnemonic) -> crate::Result<Value> {
        let token = self.expect_token(mnemonic)?;
        match token.kind {
            TokenKind::Number(x) => Ok(x),
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedNumberAfterEquals,
                mnemonic.name(),
                Some(token.line),
            )
            .into()),
        }
    }
}

fn missing_argument(mnemonic: Mnemonic, token: &Token) -> crate::Error {
    ParseError::new(
        ParseErrorKind::MissingArgument,
        mnemonic.name(),
        Some(token.line),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use color_eyre::Result;

    fn parse_error(source: &str) -> ParseError {
        match source.parse::<Program>() {
            Err(Error::Parse(err)) => err,
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn parse_add() -> Result<()> {
        let data = "READ 1\nSTORE 1\nREAD 2\nADD 1\nADD =1\n";

        let program: Program = data.parse()?;

        assert_eq!(program.line_count(), 5);
        assert_eq!(program[1], Instruction::new(Mnemonic::READ, Operand::Direct(1), 1));
        assert_eq!(program[2], Instruction::new(Mnemonic::STORE, Operand::Direct(1), 2));
        assert_eq!(program[3], Instruction::new(Mnemonic::READ, Operand::Direct(2), 3));
        assert_eq!(program[4], Instruction::new(Mnemonic::ADD, Operand::Direct(1), 4));
        assert_eq!(program[5], Instruction::new(Mnemonic::ADD, Operand::Constant(1), 5));

        Ok(())
    }

    #[test]
    fn parse_comment_lines_as_pass() -> Result<()> {
        let program: Program = "# a comment\n\nHALT\n".parse()?;

        let mnemonics: Vec<_> = program.iter().map(|i| i.mnemonic).collect();
        assert_eq!(mnemonics, [Mnemonic::PASS, Mnemonic::PASS, Mnemonic::HALT]);
        for (index, instruction) in program.iter().enumerate() {
            assert_eq!(instruction.line, index + 1);
        }

        Ok(())
    }

    #[test]
    fn parse_keeps_line_alignment() -> Result<()> {
        let data = "\n# loop\nREAD 1 # first input\n\n  \nJPOS 3\nHALT";

        let program: Program = data.parse()?;

        assert_eq!(program.line_count(), data.lines().count());
        assert_eq!(program[3].mnemonic, Mnemonic::READ);
        assert_eq!(program[5].mnemonic, Mnemonic::PASS);
        assert_eq!(program[6], Instruction::new(Mnemonic::JPOS, Operand::Direct(3), 6));
        assert_eq!(program[7].mnemonic, Mnemonic::HALT);

        Ok(())
    }

    #[test]
    fn parse_addressing_modes() -> Result<()> {
        let data = "READ (2)\nSTORE (3)\nLOAD 4\nADD (5)\nSUB =6\nJUMP =1\nJNEG 1\nJZERO 2\n";

        let program: Program = data.parse()?;

        let operands: Vec<_> = program.iter().map(|i| i.operand).collect();
        assert_eq!(
            operands,
            [
                Operand::Indirect(2),
                Operand::Indirect(3),
                Operand::Direct(4),
                Operand::Indirect(5),
                Operand::Constant(6),
                Operand::Constant(1),
                Operand::Direct(1),
                Operand::Direct(2),
            ]
        );

        Ok(())
    }

    #[test]
    fn parse_empty_source() -> Result<()> {
        let program: Program = "".parse()?;
        assert!(program.is_empty());

        Ok(())
    }

    #[test]
    fn parse_multiple_instructions() -> Result<()> {
        let err = parse_error("READ 1 STORE 2\n");
        assert_eq!(err.kind(), ParseErrorKind::TooManyTokensOnLine);
        assert_eq!(err.line_nr(), Some(1));

        assert_eq!(
            parse_error("HALT 3\n").kind(),
            ParseErrorKind::TooManyTokensOnLine
        );
        assert_eq!(
            parse_error("HALT\nLOAD =1 2\n").line_nr(),
            Some(2)
        );

        Ok(())
    }

    #[test]
    fn parse_missing_instruction_name() -> Result<()> {
        let err = parse_error("HALF\n12\n");
        assert_eq!(err.kind(), ParseErrorKind::MissingInstructionName);
        assert_eq!(err.line_nr(), Some(2));
        assert_eq!(
            parse_error("(1)\n").kind(),
            ParseErrorKind::MissingInstructionName
        );

        Ok(())
    }

    #[test]
    fn parse_missing_argument() -> Result<()> {
        assert_eq!(parse_error("READ\n").kind(), ParseErrorKind::MissingArgument);
        assert_eq!(parse_error("STORE =1\n").kind(), ParseErrorKind::MissingArgument);
        assert_eq!(parse_error("JUMP (1)\n").kind(), ParseErrorKind::MissingArgument);
        assert_eq!(parse_error("LOAD )\n").kind(), ParseErrorKind::MissingArgument);

        Ok(())
    }

    #[test]
    fn parse_bad_indirect() -> Result<()> {
        assert_eq!(
            parse_error("READ (=1)\n").kind(),
            ParseErrorKind::NonNumericAfterParen
        );
        assert_eq!(
            parse_error("ADD (1\n").kind(),
            ParseErrorKind::MissingCloseParen
        );
        assert_eq!(
            parse_error("LOAD (1 2)\n").kind(),
            ParseErrorKind::MissingCloseParen
        );

        Ok(())
    }

    #[test]
    fn parse_bad_constant() -> Result<()> {
        assert_eq!(
            parse_error("LOAD =\n").kind(),
            ParseErrorKind::ExpectedNumberAfterEquals
        );
        assert_eq!(
            parse_error("JPOS =(3)\n").kind(),
            ParseErrorKind::ExpectedNumberAfterEquals
        );

        Ok(())
    }

    #[test]
    fn parse_reports_scan_errors() -> Result<()> {
        match "READ 1\nJUMP 2x\n".parse::<Program>() {
            Err(Error::Scan(err)) => assert_eq!(err.line_nr(), 2),
            other => panic!("expected a scan error, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn display_parse_error() -> Result<()> {
        assert_eq!(
            parse_error("\nSTORE =5\n").to_string(),
            "error [ln: 2]: parse error, incomplete instruction - `STORE`"
        );

        Ok(())
    }
}
