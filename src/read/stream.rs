use std::io::BufRead;

use crate::error::Error;

/// Character source with one character of lookahead.
///
/// Input is pulled a line at a time, so an interactive source only blocks
/// once everything already typed has been consumed.
#[derive(Debug)]
pub struct CharStream<R> {
    input: R,
    line: Vec<char>,
    pos: usize,
    exhausted: bool,
}

impl<R: BufRead> CharStream<R> {
    pub fn new(input: R) -> Self {
        CharStream {
            input,
            line: Vec::new(),
            pos: 0,
            exhausted: false,
        }
    }

    fn fill_line(&mut self) -> Result<(), Error> {
        while self.pos >= self.line.len() && !self.exhausted {
            let mut buf = String::new();
            if self.input.read_line(&mut buf)? == 0 {
                self.exhausted = true;
            } else {
                self.line = buf.chars().collect();
                self.pos = 0;
            }
        }
        Ok(())
    }

    pub fn peek(&mut self) -> Result<Option<char>, Error> {
        self.fill_line()?;
        Ok(self.line.get(self.pos).copied())
    }

    pub fn next_char(&mut self) -> Result<Option<char>, Error> {
        let c = self.peek()?;
        if c.is_some() {
            self.pos += 1;
        }
        Ok(c)
    }

    /// Drops whatever is left of the buffered line.
    pub fn skip_line(&mut self) {
        self.pos = self.line.len();
    }
}

#[test]
fn test_peek_does_not_consume() {
    let mut stream = CharStream::new("ab\nc".as_bytes());
    assert_eq!(stream.peek(), Ok(Some('a')));
    assert_eq!(stream.peek(), Ok(Some('a')));
    assert_eq!(stream.next_char(), Ok(Some('a')));
    assert_eq!(stream.next_char(), Ok(Some('b')));
    assert_eq!(stream.next_char(), Ok(Some('\n')));
    assert_eq!(stream.next_char(), Ok(Some('c')));
    assert_eq!(stream.next_char(), Ok(None));
    assert_eq!(stream.peek(), Ok(None));
}

#[test]
fn test_skip_line() {
    let mut stream = CharStream::new("junk here\nok".as_bytes());
    stream.next_char().unwrap();
    stream.skip_line();
    assert_eq!(stream.next_char(), Ok(Some('o')));
}
