//! The thread-safe metadata image facade.
//!
//! An [`Image`] is a cheaply cloneable handle to one storage engine guarded by a reader/writer
//! lock. Every operation acquires the lock for exactly its own duration: reads take the shared
//! lock, appends and updates take the exclusive lock. Composite operations such as
//! find-or-create are sequences of independent calls, so no lock is ever held across two of
//! them.
//!
//! # Examples
//!
//! ```rust
//! use dotlink::metadata::{storage::ImageBuilder, tables::{Column, TableId}};
//! use uguid::guid;
//!
//! let mut builder = ImageBuilder::new("App.dll", guid!("11111111-2222-3333-4444-555555555555"))?;
//! let module_ref = builder.module_ref("Native.dll")?;
//! let image = builder.build();
//!
//! assert_eq!(image.row_count(TableId::ModuleRef)?, 1);
//! assert_eq!(image.get_string(module_ref, Column::ModuleRefName)?, "Native.dll");
//! # Ok::<(), dotlink::Error>(())
//! ```

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use uguid::Guid;

use crate::{
    metadata::{
        cursor::Cursor,
        enumerator::TokenEnum,
        storage::{CellValue, RangeLookup, TableStore},
        tables::{Column, ColumnKind, TableId},
        token::Token,
    },
    Result,
};

/// A shared, lock-guarded metadata image
#[derive(Clone)]
pub struct Image {
    store: Arc<RwLock<Box<dyn TableStore>>>,
}

impl Image {
    /// Wrap a storage engine
    pub fn new<S: TableStore + 'static>(store: S) -> Self {
        Image {
            store: Arc::new(RwLock::new(Box::new(store))),
        }
    }

    /// Returns true if both handles refer to the same underlying image
    #[must_use]
    pub fn same_image(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Number of rows in `table`
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the lock is poisoned.
    pub fn row_count(&self, table: TableId) -> Result<u32> {
        with_read!(self.store, |store: &dyn TableStore| Ok(store.row_count(table)))
    }

    /// Read `column` of the row addressed by `token`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the token does not address a row of the
    /// column's table.
    pub fn get(&self, token: Token, column: Column) -> Result<CellValue> {
        check_token(token, column)?;
        with_read!(self.store, |store: &dyn TableStore| store
            .get(token.row(), column))
    }

    /// Read a constant column
    ///
    /// # Errors
    /// See [`Image::get`]; also fails if the column does not hold constants.
    pub fn get_constant(&self, token: Token, column: Column) -> Result<u32> {
        match self.get(token, column)? {
            CellValue::Constant(value) => Ok(value),
            other => Err(mismatch(column, &other)),
        }
    }

    /// Read a string column
    ///
    /// # Errors
    /// See [`Image::get`]; also fails if the column does not hold strings.
    pub fn get_string(&self, token: Token, column: Column) -> Result<String> {
        match self.get(token, column)? {
            CellValue::String(value) => Ok(value),
            other => Err(mismatch(column, &other)),
        }
    }

    /// Read a blob column
    ///
    /// # Errors
    /// See [`Image::get`]; also fails if the column does not hold blobs.
    pub fn get_blob(&self, token: Token, column: Column) -> Result<Vec<u8>> {
        match self.get(token, column)? {
            CellValue::Blob(value) => Ok(value),
            other => Err(mismatch(column, &other)),
        }
    }

    /// Read a GUID column
    ///
    /// # Errors
    /// See [`Image::get`]; also fails if the column does not hold GUIDs.
    pub fn get_guid(&self, token: Token, column: Column) -> Result<Guid> {
        match self.get(token, column)? {
            CellValue::Guid(value) => Ok(value),
            other => Err(mismatch(column, &other)),
        }
    }

    /// Read a table, coded or list index column
    ///
    /// # Errors
    /// See [`Image::get`]; also fails if the column does not hold tokens.
    pub fn get_token(&self, token: Token, column: Column) -> Result<Token> {
        match self.get(token, column)? {
            CellValue::Token(value) => Ok(value),
            other => Err(mismatch(column, &other)),
        }
    }

    /// Overwrite `column` of the row addressed by `token`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] for a bad row, or
    /// [`crate::Error::InvalidArgument`] if the value does not fit the column.
    pub fn set(&self, token: Token, column: Column, value: CellValue) -> Result<()> {
        check_token(token, column)?;
        with_write!(self.store, |store: &mut dyn TableStore| store.set(
            token.row(),
            column,
            value
        ))
    }

    /// Append a fully populated row to `table` and return its token
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if a value does not fit its column, or
    /// [`crate::Error::OutOfMemory`] if the table can not grow.
    pub fn append_row(&self, table: TableId, values: &[(Column, CellValue)]) -> Result<Token> {
        let row = with_write!(self.store, |store: &mut dyn TableStore| store
            .append_row(table, values))?;
        Ok(Token::from_parts(table, row))
    }

    /// Sorted range query, see [`TableStore::find_range`]
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the lock is poisoned.
    pub fn find_range(&self, column: Column, key: &CellValue) -> Result<RangeLookup> {
        with_read!(self.store, |store: &dyn TableStore| store
            .find_range(column, key))
    }

    /// Map an index of a list column to its row, see [`TableStore::resolve_indirect`]
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidToken`] if the pointer row does not exist.
    pub fn resolve_indirect(&self, table: TableId, index: u32) -> Result<u32> {
        with_read!(self.store, |store: &dyn TableStore| store
            .resolve_indirect(table, index))
    }

    /// Returns true if list columns into `table` go through a pointer table
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the lock is poisoned.
    pub fn has_indirection(&self, table: TableId) -> Result<bool> {
        with_read!(self.store, |store: &dyn TableStore| Ok(store
            .has_indirection(table)))
    }

    /// The module version id of `Module` row 1
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] if the image has no module row.
    pub fn mvid(&self) -> Result<Guid> {
        self.get_guid(self.module_token()?, Column::ModuleMvid)
    }

    /// The name of `Module` row 1
    ///
    /// # Errors
    /// Returns [`crate::Error::CorruptMetadata`] if the image has no module row.
    pub fn module_name(&self) -> Result<String> {
        self.get_string(self.module_token()?, Column::ModuleName)
    }

    /// Returns true if the image carries an `Assembly` row
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the lock is poisoned.
    pub fn has_assembly(&self) -> Result<bool> {
        Ok(self.row_count(TableId::Assembly)? > 0)
    }

    fn module_token(&self) -> Result<Token> {
        if self.row_count(TableId::Module)? == 0 {
            return Err(corrupt_error!("Image has no Module row"));
        }
        Ok(Token::from_parts(TableId::Module, 1))
    }

    /// Enumerate every row of `table`.
    ///
    /// `TypeDef` enumeration starts at row 2: row 1 is the `<Module>` pseudo-type, which is
    /// never a user type.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the lock is poisoned.
    pub fn enum_table(&self, table: TableId) -> Result<TokenEnum> {
        let first = if table == TableId::TypeDef { 2 } else { 1 };
        let end = self.row_count(table)? + 1;
        Ok(TokenEnum::range(table, first, end.max(first)))
    }

    /// Enumerate the rows whose `column` equals `key`.
    ///
    /// Uses the engine's sorted range when it has one, otherwise scans the whole table.
    ///
    /// # Errors
    /// Returns an error if a row can not be read.
    pub fn enum_by_key(&self, column: Column, key: Token) -> Result<TokenEnum> {
        let table = column.table();
        match self.find_range(column, &CellValue::Token(key))? {
            RangeLookup::Range { start, end } => Ok(TokenEnum::range(table, start, end)),
            RangeLookup::NotFound => Ok(TokenEnum::range(table, 1, 1)),
            RangeLookup::Unsupported => {
                log::trace!("scanning {:?} for {:?} = {}", table, column, key);

                let mut result = TokenEnum::dynamic(table);
                let key = if key.is_nil() { Token::new(0) } else { key };
                for row in 1..=self.row_count(table)? {
                    let token = Token::from_parts(table, row);
                    if self.get_token(token, column)? == key {
                        result.push(token)?;
                    }
                }
                Ok(result)
            }
        }
    }

    /// Enumerate the child rows owned by `parent` through the list column `column`, following
    /// the pointer table when one is present.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if `column` is not a list column, or an error
    /// if a row can not be read.
    pub fn enum_list(&self, parent: Token, column: Column) -> Result<TokenEnum> {
        let ColumnKind::List(target) = column.kind() else {
            return Err(crate::Error::InvalidArgument(format!(
                "{:?} is not a list column",
                column
            )));
        };

        let cursor = Cursor::from_token(parent)?;
        let start = self.get_token(parent, column)?.row();

        let indirect = self.has_indirection(target)?;
        let list_table = if indirect {
            target.pointer_table().unwrap_or(target)
        } else {
            target
        };
        let list_end = self.row_count(list_table)? + 1;

        let end = if cursor.row() < self.row_count(cursor.table())? {
            self.get_token(cursor.next().token(), column)?.row()
        } else {
            list_end
        };

        let start = start.clamp(1, list_end);
        let end = end.clamp(start, list_end);

        if !indirect {
            return Ok(TokenEnum::range(target, start, end));
        }

        let mut result = TokenEnum::dynamic(target);
        for index in start..end {
            result.push(Token::from_parts(
                target,
                self.resolve_indirect(target, index)?,
            ))?;
        }
        Ok(result)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("store", &Arc::as_ptr(&self.store))
            .finish()
    }
}

fn check_token(token: Token, column: Column) -> Result<()> {
    if token.is_nil() || !token.is_table(column.table()) {
        return Err(crate::Error::InvalidToken(token));
    }
    Ok(())
}

fn mismatch(column: Column, value: &CellValue) -> crate::Error {
    corrupt_error!("Column {:?} returned {:?}", column, value)
}
