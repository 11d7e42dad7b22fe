//! Row cursors.
//!
//! A [`Cursor`] is a `(table, row)` position that can be stepped forward without consulting the
//! image. Stepping past the last row is allowed; reads through such a cursor fail with
//! [`crate::Error::InvalidToken`].

use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// A position inside one metadata table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    table: TableId,
    row: u32,
}

impl Cursor {
    /// Create a cursor at the 1-based `row` of `table`
    #[must_use]
    pub fn new(table: TableId, row: u32) -> Self {
        Cursor { table, row }
    }

    /// Create a cursor at the row a token addresses
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the token's table is unknown.
    pub fn from_token(token: Token) -> Result<Self> {
        let table = token
            .table_id()
            .ok_or(crate::Error::InvalidToken(token))?;
        Ok(Cursor::new(table, token.row()))
    }

    /// The table this cursor walks
    #[must_use]
    pub fn table(&self) -> TableId {
        self.table
    }

    /// The 1-based row index
    #[must_use]
    pub fn row(&self) -> u32 {
        self.row
    }

    /// The token of the current row
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(self.table, self.row)
    }

    /// The cursor one row further
    #[must_use]
    pub fn next(&self) -> Cursor {
        self.at(1)
    }

    /// The cursor `offset` rows further
    #[must_use]
    pub fn at(&self, offset: u32) -> Cursor {
        Cursor::new(self.table, self.row.saturating_add(offset))
    }
}

impl From<Cursor> for Token {
    fn from(cursor: Cursor) -> Self {
        cursor.token()
    }
}
