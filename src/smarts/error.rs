use thiserror::Error;

/// Errors produced when compiling a SMARTS pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmartsError {
    #[error("empty SMARTS string")]
    EmptyInput,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("unexpected end of SMARTS at position {pos}")]
    UnexpectedEnd { pos: usize },
    #[error("unclosed bracket starting at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid atomic number at position {pos}")]
    InvalidAtomicNum { pos: usize },
    #[error("unclosed recursive SMARTS at position {pos}")]
    UnclosedRecursive { pos: usize },
    #[error("number out of range at position {pos}")]
    NumberOutOfRange { pos: usize },
    #[error("bond at position {pos} is not between two atoms")]
    DanglingBond { pos: usize },
}
