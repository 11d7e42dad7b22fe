//! Token enumerators.
//!
//! A [`TokenEnum`] walks a set of rows of one table, either a contiguous range described by a
//! start cursor and a count, or an explicit list collected by a scan. Dynamic enumerators may
//! hold single tokens or token pairs, but never both.
//!
//! Enumerators own everything they walk and hold no lock, so the image may change while one is
//! alive; a token yielded for a row that has since been reused is still a valid token of the
//! same table.

use crate::{
    metadata::{cursor::Cursor, tables::TableId, token::Token},
    Result,
};

#[derive(Debug, Clone)]
enum Source {
    Range { start: Cursor, count: u32 },
    Tokens(Vec<Token>),
    Pairs(Vec<(Token, Token)>),
}

/// An enumerator over tokens of one table
#[derive(Debug, Clone)]
pub struct TokenEnum {
    table: TableId,
    source: Source,
    position: usize,
}

impl TokenEnum {
    /// Enumerate the rows `start..end` (1-based, end exclusive) of `table`
    #[must_use]
    pub fn range(table: TableId, start: u32, end: u32) -> Self {
        TokenEnum {
            table,
            source: Source::Range {
                start: Cursor::new(table, start),
                count: end.saturating_sub(start),
            },
            position: 0,
        }
    }

    /// Create an empty enumerator that collects single tokens
    #[must_use]
    pub fn dynamic(table: TableId) -> Self {
        TokenEnum {
            table,
            source: Source::Tokens(Vec::new()),
            position: 0,
        }
    }

    /// Create an empty enumerator that collects token pairs
    #[must_use]
    pub fn dynamic_pairs(table: TableId) -> Self {
        TokenEnum {
            table,
            source: Source::Pairs(Vec::new()),
            position: 0,
        }
    }

    /// Append a token to a single-token dynamic enumerator
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for range or pair enumerators, or
    /// [`crate::Error::OutOfMemory`] if the list can not grow.
    pub fn push(&mut self, token: Token) -> Result<()> {
        match &mut self.source {
            Source::Tokens(tokens) => {
                tokens.try_reserve(1)?;
                tokens.push(token);
                Ok(())
            }
            _ => Err(crate::Error::InvalidArgument(
                "push requires a single-token dynamic enumerator".to_string(),
            )),
        }
    }

    /// Append a pair to a pair dynamic enumerator
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] for range or single-token enumerators, or
    /// [`crate::Error::OutOfMemory`] if the list can not grow.
    pub fn push_pair(&mut self, first: Token, second: Token) -> Result<()> {
        match &mut self.source {
            Source::Pairs(pairs) => {
                pairs.try_reserve(1)?;
                pairs.push((first, second));
                Ok(())
            }
            _ => Err(crate::Error::InvalidArgument(
                "push_pair requires a pair dynamic enumerator".to_string(),
            )),
        }
    }

    /// The table the enumerated tokens belong to
    #[must_use]
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Total number of entries, pairs counting once
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.source {
            Source::Range { count, .. } => *count as usize,
            Source::Tokens(tokens) => tokens.len(),
            Source::Pairs(pairs) => pairs.len(),
        }
    }

    /// Returns true if the enumerator has no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the enumerator yields pairs
    #[must_use]
    pub fn is_pairs(&self) -> bool {
        matches!(self.source, Source::Pairs(_))
    }

    /// Number of entries already consumed
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move to `position`, clamped to the number of entries
    pub fn reset(&mut self, position: usize) {
        self.position = position.min(TokenEnum::len(self));
    }

    /// Fill `out` with the next tokens and return how many were written
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] on a pair enumerator.
    pub fn read_tokens(&mut self, out: &mut [Token]) -> Result<usize> {
        if self.is_pairs() {
            return Err(crate::Error::InvalidArgument(
                "read_tokens on a pair enumerator".to_string(),
            ));
        }

        let mut written = 0;
        for slot in out.iter_mut() {
            match self.token_at(self.position) {
                Some(token) => {
                    *slot = token;
                    self.position += 1;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }

    /// Fill `out` with the next pairs and return how many were written
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] on a single-token enumerator.
    pub fn read_token_pairs(&mut self, out: &mut [(Token, Token)]) -> Result<usize> {
        let Source::Pairs(pairs) = &self.source else {
            return Err(crate::Error::InvalidArgument(
                "read_token_pairs on a single-token enumerator".to_string(),
            ));
        };

        let available = pairs.len().saturating_sub(self.position);
        let written = available.min(out.len());
        out[..written].copy_from_slice(&pairs[self.position..self.position + written]);
        self.position += written;
        Ok(written)
    }

    fn token_at(&self, index: usize) -> Option<Token> {
        match &self.source {
            Source::Range { start, count } => {
                let offset = u32::try_from(index).ok()?;
                (offset < *count).then(|| start.at(offset).token())
            }
            Source::Tokens(tokens) => tokens.get(index).copied(),
            Source::Pairs(_) => None,
        }
    }
}

/// Yields the remaining tokens. Pair enumerators yield nothing; use
/// [`TokenEnum::read_token_pairs`] for them.
impl Iterator for TokenEnum {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.token_at(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.is_pairs() {
            0
        } else {
            self.len().saturating_sub(self.position)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TokenEnum {}
