//! This module contains the error and result definitions used in this crate.

use std::fmt::{self, Display, Formatter};

/// Miscellaneous errors that can occur on some methods in the
/// [root module](../index.html). This does not include errors that occur when
/// parsing grids, see [SudokuParseError](enum.SudokuParseError.html) for
/// that.
#[derive(Debug, Eq, PartialEq)]
pub enum SudokuError {

    /// Indicates that some number is invalid for a Sudoku cell. This is the
    /// case if it is less than 1 or greater than 9.
    InvalidNumber,

    /// Indicates that the specified coordinates (column and row) lie outside
    /// the 9x9 grid in question. This is the case if they are greater than or
    /// equal to 9.
    OutOfBounds
}

/// Syntactic sugar for `Result<V, SudokuError>`.
pub type SudokuResult<V> = Result<V, SudokuError>;

/// An enumeration of the errors that may occur when parsing a
/// [SudokuGrid](../struct.SudokuGrid.html).
#[derive(Debug, Eq, PartialEq)]
pub enum SudokuParseError {

    /// Indicates that the number of cell entries in the code does not equal
    /// 81, the number of cells in a 9x9 grid.
    WrongNumberOfCells,

    /// Indicates that the code contains a character that is neither a digit,
    /// nor a period representing an empty cell, nor ignorable whitespace.
    InvalidCharacter
}

impl Display for SudokuParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SudokuParseError::WrongNumberOfCells =>
                write!(f, "wrong number of cells for a 9x9 grid"),
            SudokuParseError::InvalidCharacter =>
                write!(f, "invalid character in grid code")
        }
    }
}

/// Syntactic sugar for `Result<V, SudokuParseError>`.
pub type SudokuParseResult<V> = Result<V, SudokuParseError>;

/// An enumeration of the terminal failures that can abort the generation of a
/// merged puzzle. A single request makes exactly one attempt at the full
/// pipeline and reports success or one of these reasons; there are no retries
/// and no partial results.
#[derive(Debug, Eq, PartialEq)]
pub enum GenerationError {

    /// Indicates that the provided layout contains no boards at all.
    EmptyLayout,

    /// Indicates that the provided layout contains more boards than the
    /// configured maximum.
    TooManyBoards,

    /// Indicates that the time budget of the request was exhausted before
    /// generation completed. Work done so far is discarded.
    Timeout,

    /// An error that is raised whenever it is attempted to fill a board whose
    /// fixed cells make the Sudoku rules unsatisfiable, which can happen for
    /// pathological placements where overlapping constraints contradict each
    /// other.
    Unsatisfiable,

    /// Indicates that a generated grid does not reproduce all of its fixed
    /// cells. This is an internal invariant violation and should never be
    /// observed.
    FixedCellsViolated
}

/// Syntactic sugar for `Result<V, GenerationError>`.
pub type GenerationResult<V> = Result<V, GenerationError>;

/// An enumeration of the failures a complete generation request can report to
/// the transport glue, including the policy-level quota rejection. Each
/// variant maps to a wire reason code via [RequestError::code].
#[derive(Debug, Eq, PartialEq)]
pub enum RequestError {

    /// Indicates a structurally invalid request, such as an empty layout.
    BadRequest,

    /// Indicates that the layout exceeds the configured maximum board count.
    TooManyBoards,

    /// Indicates that the client has used up its daily generation quota. No
    /// generation is attempted in this case.
    QuotaExceeded,

    /// Indicates that the time budget was exhausted in either generation
    /// phase.
    Timeout,

    /// Indicates any other generation failure.
    Generation
}

impl RequestError {

    /// The wire reason code for this error, as reported to the transport
    /// glue.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::BadRequest => "bad_request",
            RequestError::TooManyBoards => "too_many_boards",
            RequestError::QuotaExceeded => "quota",
            RequestError::Timeout => "timeout",
            RequestError::Generation => "error"
        }
    }
}

impl From<GenerationError> for RequestError {
    fn from(e: GenerationError) -> RequestError {
        match e {
            GenerationError::EmptyLayout => RequestError::BadRequest,
            GenerationError::TooManyBoards => RequestError::TooManyBoards,
            GenerationError::Timeout => RequestError::Timeout,
            GenerationError::Unsatisfiable => RequestError::Generation,
            GenerationError::FixedCellsViolated => RequestError::Generation
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn request_error_codes_match_wire_contract() {
        assert_eq!("bad_request", RequestError::BadRequest.code());
        assert_eq!("too_many_boards", RequestError::TooManyBoards.code());
        assert_eq!("quota", RequestError::QuotaExceeded.code());
        assert_eq!("timeout", RequestError::Timeout.code());
        assert_eq!("error", RequestError::Generation.code());
    }

    #[test]
    fn generation_errors_map_to_request_errors() {
        assert_eq!(RequestError::BadRequest,
            RequestError::from(GenerationError::EmptyLayout));
        assert_eq!(RequestError::TooManyBoards,
            RequestError::from(GenerationError::TooManyBoards));
        assert_eq!(RequestError::Timeout,
            RequestError::from(GenerationError::Timeout));
        assert_eq!(RequestError::Generation,
            RequestError::from(GenerationError::Unsatisfiable));
        assert_eq!(RequestError::Generation,
            RequestError::from(GenerationError::FixedCellsViolated));
    }
}
