use std::borrow::Cow;
use std::collections::VecDeque;
use std::error;
use std::fmt;
use std::io::BufRead;

use crate::memory::Value;
use crate::program::Mnemonic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    InvalidSymbol,
    InvalidNumberContinuation,
    NumberOutOfRange,
    UnknownKeyword,
    InvalidKeywordContinuation,
    Unreadable,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanErrorKind::InvalidSymbol => f.write_str("invalid symbol"),
            ScanErrorKind::InvalidNumberContinuation => f.write_str("not a valid number"),
            ScanErrorKind::NumberOutOfRange => f.write_str("number out of range"),
            ScanErrorKind::UnknownKeyword => f.write_str("unknown instruction"),
            ScanErrorKind::InvalidKeywordContinuation => f.write_str("not a valid instruction"),
            ScanErrorKind::Unreadable => f.write_str("unreadable input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    kind: ScanErrorKind,
    context: Cow<'static, str>,
    line_nr: usize,
}

impl ScanError {
    fn new<S>(kind: ScanErrorKind, context: S, line_nr: usize) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into(),
            line_nr,
        }
    }

    pub fn kind(&self) -> ScanErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error [ln: {}]: scanner error, {} - `{}`",
            self.line_nr, self.kind, self.context
        )
    }
}

impl error::Error for ScanError {}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Equals,
    Newline,
    Number(Value),
    Keyword(Mnemonic),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LeftParen => f.write_str("("),
            TokenKind::RightParen => f.write_str(")"),
            TokenKind::Equals => f.write_str("="),
            TokenKind::Newline => f.write_str("end of line"),
            TokenKind::Number(value) => write!(f, "{}", value),
            TokenKind::Keyword(mnemonic) => write!(f, "{}", mnemonic),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source line the token was found on
    pub line: usize,
}

/// Splits source text into tokens, reading one line at a time.
///
/// Every line yields a [`TokenKind::Newline`] as its last token, even the
/// last one when the source does not end with a line break.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    line: VecDeque<char>,
    line_nr: usize,
    end: bool,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: VecDeque::new(),
            line_nr: 0,
            end: false,
        }
    }

    /// Number of the line currently being scanned
    pub fn line_nr(&self) -> usize {
        self.line_nr
    }

    /// Pulls the next line from the reader into the buffer. Sets
    /// [`Scanner::end`] once the reader is exhausted.
    fn next_line(&mut self) -> Result<()> {
        let mut buf = String::new();
        let read = self.reader.read_line(&mut buf).map_err(|err| {
            ScanError::new(ScanErrorKind::Unreadable, err.to_string(), self.line_nr + 1)
        })?;

        if read == 0 {
            self.end = true;
            return Ok(());
        }

        self.line_nr += 1;
        if !buf.ends_with('\n') {
            buf.push('\n');
        }
        self.line = buf.chars().collect();

        log::trace!("[{}] Read line {:?}", self.line_nr, buf);

        Ok(())
    }

    /// Takes the next character of the current line. Lines always end in a
    /// newline, so this only falls back to `'\n'` if called past it.
    fn pop(&mut self) -> char {
        self.line.pop_front().unwrap_or('\n')
    }

    fn token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            line: self.line_nr,
        }
    }

    /// Scans the next token, `None` once the source is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.line.is_empty() {
            self.next_line()?;
        }
        if self.end {
            return Ok(None);
        }

        loop {
            let c = self.pop();
            let kind = match c {
                '#' => {
                    // comment; drop the rest of the line
                    self.line.clear();
                    TokenKind::Newline
                }
                '\n' => TokenKind::Newline,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '=' => TokenKind::Equals,
                c if c.is_whitespace() => continue,
                c if c.is_ascii_digit() => self.scan_number(c)?,
                c if c.is_ascii_alphabetic() => self.scan_keyword(c)?,
                c => {
                    return Err(ScanError::new(
                        ScanErrorKind::InvalidSymbol,
                        c.to_string(),
                        self.line_nr,
                    ))
                }
            };

            log::trace!("[{}] Found token {}", self.line_nr, kind);

            return Ok(Some(self.token(kind)));
        }
    }

    /// Scans the rest of a number starting with `first`. A closing
    /// parenthesis or newline ending the number is left for the next token.
    fn scan_number(&mut self, first: char) -> Result<TokenKind> {
        let mut digits = String::from(first);

        loop {
            match self.pop() {
                c if c.is_ascii_digit() => digits.push(c),
                c @ ('\n' | ')') => {
                    self.line.push_front(c);
                    break;
                }
                c if c.is_whitespace() => break,
                c => {
                    digits.push(c);
                    return Err(ScanError::new(
                        ScanErrorKind::InvalidNumberContinuation,
                        digits,
                        self.line_nr,
                    ));
                }
            }
        }

        digits
            .parse()
            .map(TokenKind::Number)
            .map_err(|_| ScanError::new(ScanErrorKind::NumberOutOfRange, digits, self.line_nr))
    }

    /// Scans the rest of a keyword starting with `first`.
    fn scan_keyword(&mut self, first: char) -> Result<TokenKind> {
        let mut name = String::from(first);

        loop {
            match self.pop() {
                c if c.is_ascii_alphabetic() => name.push(c),
                '\n' => {
                    self.line.push_front('\n');
                    break;
                }
                c if c.is_whitespace() => break,
                c => {
                    name.push(c);
                    return Err(ScanError::new(
                        ScanErrorKind::InvalidKeywordContinuation,
                        name,
                        self.line_nr,
                    ));
                }
            }
        }

        match name.parse::<Mnemonic>() {
            Ok(mnemonic) => {
                log::debug!("[{}] Found instruction {}", self.line_nr, mnemonic);
                Ok(TokenKind::Keyword(mnemonic))
            }
            Err(()) => Err(ScanError::new(
                ScanErrorKind::UnknownKeyword,
                name,
                self.line_nr,
            )),
        }
    }
}

impl<R: BufRead> Iterator for Scanner<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    fn kinds(source: &str) -> Result<Vec<TokenKind>> {
        let tokens = Scanner::new(source.as_bytes()).collect::<super::Result<Vec<_>>>()?;
        Ok(tokens.into_iter().map(|token| token.kind).collect())
    }

    fn scan_error(source: &str) -> ScanError {
        Scanner::new(source.as_bytes())
            .find_map(|res| res.err())
            .expect("source should not scan")
    }

    #[test]
    fn scan_instruction_forms() -> Result<()> {
        use TokenKind::*;

        assert_eq!(kinds("READ 1\n")?, [Keyword(Mnemonic::READ), Number(1), Newline]);
        assert_eq!(
            kinds("LOAD (12)\n")?,
            [Keyword(Mnemonic::LOAD), LeftParen, Number(12), RightParen, Newline]
        );
        assert_eq!(
            kinds("ADD =7\n")?,
            [Keyword(Mnemonic::ADD), Equals, Number(7), Newline]
        );
        assert_eq!(kinds("HALT\n")?, [Keyword(Mnemonic::HALT), Newline]);

        Ok(())
    }

    #[test]
    fn scan_appends_missing_newline() -> Result<()> {
        use TokenKind::*;

        assert_eq!(
            kinds("HALF\nHALT")?,
            [Keyword(Mnemonic::HALF), Newline, Keyword(Mnemonic::HALT), Newline]
        );

        Ok(())
    }

    #[test]
    fn scan_comments_and_blank_lines() -> Result<()> {
        use TokenKind::*;

        assert_eq!(
            kinds("# a comment\n\nREAD 1 # r0 <- i1\n")?,
            [Newline, Newline, Keyword(Mnemonic::READ), Number(1), Newline]
        );

        Ok(())
    }

    #[test]
    fn scan_skips_whitespace() -> Result<()> {
        use TokenKind::*;

        assert_eq!(
            kinds("  STORE\t( 3 )  \r\n")?,
            [Keyword(Mnemonic::STORE), LeftParen, Number(3), RightParen, Newline]
        );

        Ok(())
    }

    #[test]
    fn scan_line_numbers() -> Result<()> {
        let lines = Scanner::new("READ 1\n\nHALT\n".as_bytes())
            .map(|res| res.map(|token| token.line))
            .collect::<super::Result<Vec<_>>>()?;

        assert_eq!(lines, [1, 1, 1, 2, 3, 3]);

        Ok(())
    }

    #[test]
    fn scan_empty_source() -> Result<()> {
        assert!(kinds("")?.is_empty());

        Ok(())
    }

    #[test]
    fn scan_invalid_symbol() -> Result<()> {
        let err = scan_error("HALT\nLOAD $1\n");
        assert_eq!(err.kind(), ScanErrorKind::InvalidSymbol);
        assert_eq!(err.line_nr(), 2);

        Ok(())
    }

    #[test]
    fn scan_invalid_number() -> Result<()> {
        assert_eq!(
            scan_error("READ 12a\n").kind(),
            ScanErrorKind::InvalidNumberContinuation
        );
        assert_eq!(
            scan_error("READ 1# comment\n").kind(),
            ScanErrorKind::InvalidNumberContinuation
        );
        assert_eq!(
            scan_error("LOAD =99999999999999999999\n").kind(),
            ScanErrorKind::NumberOutOfRange
        );

        Ok(())
    }

    #[test]
    fn scan_unknown_keyword() -> Result<()> {
        let err = scan_error("MUL 2\n");
        assert_eq!(err.kind(), ScanErrorKind::UnknownKeyword);
        assert_eq!(err.line_nr(), 1);
        assert_eq!(scan_error("halt\n").kind(), ScanErrorKind::UnknownKeyword);
        assert_eq!(scan_error("FOO\n").kind(), ScanErrorKind::UnknownKeyword);

        Ok(())
    }

    #[test]
    fn scan_invalid_keyword() -> Result<()> {
        assert_eq!(
            scan_error("LOAD=1\n").kind(),
            ScanErrorKind::InvalidKeywordContinuation
        );
        assert_eq!(
            scan_error("ADD1\n").kind(),
            ScanErrorKind::InvalidKeywordContinuation
        );

        Ok(())
    }

    #[test]
    fn display_scan_error() -> Result<()> {
        assert_eq!(
            scan_error("\n\nREAD %\n").to_string(),
            "error [ln: 3]: scanner error, invalid symbol - `%`"
        );

        Ok(())
    }
}
