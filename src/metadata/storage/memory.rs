//! In-memory table storage.
//!
//! [`MemoryTables`] keeps every row as a vector of raw cell values and owns one heap of each
//! kind. String, blob and GUID cells hold heap offsets; token cells hold the raw token value,
//! with every Nil token normalized to 0 the way a coded index stores it.
//!
//! Tables with an ECMA-335 sort key track whether they are still sorted. A sorted table answers
//! [`TableStore::find_range`] with a binary search; once an append or update breaks the order,
//! range queries report [`RangeLookup::Unsupported`] and the enumerator falls back to a scan.

use std::collections::HashMap;

use crate::{
    metadata::{
        storage::{CellValue, RangeLookup, TableStore},
        streams::{BlobHeap, GuidHeap, StringHeap},
        tables::{Column, ColumnKind, TableId},
        token::Token,
    },
    Result,
};

/// An in-memory [`TableStore`] engine
#[derive(Debug, Clone)]
pub struct MemoryTables {
    rows: HashMap<TableId, Vec<Vec<u32>>>,
    unsorted: HashMap<TableId, bool>,
    strings: StringHeap,
    blobs: BlobHeap,
    guids: GuidHeap,
    range_queries: bool,
}

impl MemoryTables {
    /// Create an empty engine with sorted range queries enabled
    #[must_use]
    pub fn new() -> Self {
        MemoryTables {
            rows: HashMap::new(),
            unsorted: HashMap::new(),
            strings: StringHeap::new(),
            blobs: BlobHeap::new(),
            guids: GuidHeap::new(),
            range_queries: true,
        }
    }

    /// Enable or disable sorted range queries. Without them every keyed lookup is answered
    /// with [`RangeLookup::Unsupported`].
    #[must_use]
    pub fn with_range_queries(mut self, enabled: bool) -> Self {
        self.range_queries = enabled;
        self
    }

    /// The `#Strings` heap
    #[must_use]
    pub fn strings(&self) -> &StringHeap {
        &self.strings
    }

    /// The `#Blob` heap
    #[must_use]
    pub fn blobs(&self) -> &BlobHeap {
        &self.blobs
    }

    /// The `#GUID` heap
    #[must_use]
    pub fn guids(&self) -> &GuidHeap {
        &self.guids
    }

    /// Returns true if `table` is still ordered by its sort key. Tables without one count as
    /// sorted.
    #[must_use]
    pub fn is_sorted(&self, table: TableId) -> bool {
        !self.unsorted.get(&table).copied().unwrap_or(false)
    }

    fn row(&self, table: TableId, row: u32) -> Result<&Vec<u32>> {
        if row == 0 {
            return Err(crate::Error::InvalidToken(Token::from_parts(table, row)));
        }

        self.rows
            .get(&table)
            .and_then(|rows| rows.get(row as usize - 1))
            .ok_or(crate::Error::InvalidToken(Token::from_parts(table, row)))
    }

    /// Convert `value` to the raw cell stored for `column`, interning heap data
    fn encode(&mut self, column: Column, value: &CellValue) -> Result<u32> {
        match (column.kind(), value) {
            (ColumnKind::Constant, CellValue::Constant(value)) => Ok(*value),
            (ColumnKind::String, CellValue::String(value)) => self.strings.add(value),
            (ColumnKind::Blob, CellValue::Blob(value)) => self.blobs.add(value),
            (ColumnKind::Guid, CellValue::Guid(value)) => self.guids.add(*value),
            (ColumnKind::Coded(coded), CellValue::Token(token)) => {
                let token = normalize(*token);
                if !coded.accepts(token) {
                    return Err(crate::Error::InvalidArgument(format!(
                        "token {} does not fit column {:?}",
                        token, column
                    )));
                }
                Ok(token.value())
            }
            (ColumnKind::Table(table) | ColumnKind::List(table), CellValue::Token(token)) => {
                let token = normalize(*token);
                if !token.is_null() && !token.is_table(table) {
                    return Err(crate::Error::InvalidArgument(format!(
                        "token {} does not fit column {:?}",
                        token, column
                    )));
                }
                Ok(token.value())
            }
            (kind, value) => Err(crate::Error::InvalidArgument(format!(
                "value {:?} does not fit column {:?} of kind {:?}",
                value, column, kind
            ))),
        }
    }

    fn decode(&self, column: Column, raw: u32) -> Result<CellValue> {
        Ok(match column.kind() {
            ColumnKind::Constant => CellValue::Constant(raw),
            ColumnKind::String => CellValue::String(self.strings.get(raw)?.to_string()),
            ColumnKind::Blob => CellValue::Blob(self.blobs.get(raw)?.to_vec()),
            ColumnKind::Guid => CellValue::Guid(self.guids.get(raw)?),
            ColumnKind::Table(_) | ColumnKind::Coded(_) | ColumnKind::List(_) => {
                CellValue::Token(Token::new(raw))
            }
        })
    }

    fn refresh_sorted(&mut self, table: TableId) {
        let Some(key) = Column::sort_key(table) else {
            return;
        };

        let position = key.position();
        let sorted = self.rows.get(&table).map_or(true, |rows| {
            rows.windows(2)
                .all(|pair| pair[0][position] <= pair[1][position])
        });
        self.unsorted.insert(table, !sorted);
    }
}

impl Default for MemoryTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Every Nil token is stored as 0, whatever its table byte
fn normalize(token: Token) -> Token {
    if token.is_nil() {
        Token::new(0)
    } else {
        token
    }
}

impl TableStore for MemoryTables {
    fn row_count(&self, table: TableId) -> u32 {
        self.rows
            .get(&table)
            .map_or(0, |rows| u32::try_from(rows.len()).unwrap_or(u32::MAX))
    }

    fn get(&self, row: u32, column: Column) -> Result<CellValue> {
        let raw = self.row(column.table(), row)?[column.position()];
        self.decode(column, raw)
    }

    fn set(&mut self, row: u32, column: Column, value: CellValue) -> Result<()> {
        let table = column.table();
        self.row(table, row)?;

        let raw = self.encode(column, &value)?;
        if let Some(cells) = self
            .rows
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(row as usize - 1))
        {
            cells[column.position()] = raw;
        }

        if Column::sort_key(table) == Some(column) {
            self.refresh_sorted(table);
        }
        Ok(())
    }

    fn append_row(&mut self, table: TableId, values: &[(Column, CellValue)]) -> Result<u32> {
        let layout = Column::layout(table);
        if layout.is_empty() {
            return Err(crate::Error::InvalidArgument(format!(
                "table {:?} is not supported by this engine",
                table
            )));
        }

        let mut cells = vec![0u32; layout.len()];
        for (column, value) in values {
            if column.table() != table {
                return Err(crate::Error::InvalidArgument(format!(
                    "column {:?} does not belong to table {:?}",
                    column, table
                )));
            }
            cells[column.position()] = self.encode(*column, value)?;
        }

        let rows = self.rows.entry(table).or_default();
        rows.try_reserve(1)?;

        if let (Some(key), Some(last)) = (Column::sort_key(table), rows.last()) {
            let position = key.position();
            if last[position] > cells[position] {
                self.unsorted.insert(table, true);
            }
        }

        rows.push(cells);
        u32::try_from(rows.len()).map_err(|_| crate::Error::OutOfMemory)
    }

    fn find_range(&self, column: Column, key: &CellValue) -> Result<RangeLookup> {
        let table = column.table();
        if !self.range_queries
            || Column::sort_key(table) != Some(column)
            || !self.is_sorted(table)
        {
            return Ok(RangeLookup::Unsupported);
        }

        let key = match key {
            CellValue::Token(token) => normalize(*token).value(),
            CellValue::Constant(value) => *value,
            _ => return Ok(RangeLookup::Unsupported),
        };

        let Some(rows) = self.rows.get(&table) else {
            return Ok(RangeLookup::NotFound);
        };

        let position = column.position();
        let start = rows.partition_point(|row| row[position] < key);
        let end = rows.partition_point(|row| row[position] <= key);

        if start == end {
            return Ok(RangeLookup::NotFound);
        }

        Ok(RangeLookup::Range {
            start: start as u32 + 1,
            end: end as u32 + 1,
        })
    }

    fn resolve_indirect(&self, table: TableId, index: u32) -> Result<u32> {
        let Some(pointer) = table.pointer_table() else {
            return Ok(index);
        };

        if self.row_count(pointer) == 0 {
            return Ok(index);
        }

        let column = Column::layout(pointer)[0];
        match self.get(index, column)? {
            CellValue::Token(token) => Ok(token.row()),
            other => Err(corrupt_error!(
                "Pointer table {:?} holds {:?} at row {}",
                pointer,
                other,
                index
            )),
        }
    }

    fn has_indirection(&self, table: TableId) -> bool {
        table
            .pointer_table()
            .is_some_and(|pointer| self.row_count(pointer) > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_ref(scope: Token, name: &str) -> Vec<(Column, CellValue)> {
        vec![
            (Column::TypeRefResolutionScope, scope.into()),
            (Column::TypeRefName, name.into()),
            (Column::TypeRefNamespace, "System".into()),
        ]
    }

    #[test]
    fn test_append_and_get() {
        let mut tables = MemoryTables::new();
        let scope = Token::from_parts(TableId::AssemblyRef, 1);

        let row = tables
            .append_row(TableId::TypeRef, &type_ref(scope, "Object"))
            .unwrap();
        assert_eq!(row, 1);
        assert_eq!(tables.row_count(TableId::TypeRef), 1);
        assert_eq!(
            tables.get(1, Column::TypeRefName).unwrap(),
            CellValue::String("Object".into())
        );
        assert_eq!(
            tables.get(1, Column::TypeRefResolutionScope).unwrap(),
            CellValue::Token(scope)
        );
    }

    #[test]
    fn test_missing_columns_default_to_zero() {
        let mut tables = MemoryTables::new();
        tables.append_row(TableId::ModuleRef, &[]).unwrap();

        assert_eq!(
            tables.get(1, Column::ModuleRefName).unwrap(),
            CellValue::String(String::new())
        );
    }

    #[test]
    fn test_invalid_row() {
        let tables = MemoryTables::new();
        assert!(matches!(
            tables.get(1, Column::TypeRefName),
            Err(crate::Error::InvalidToken(_))
        ));
        assert!(matches!(
            tables.get(0, Column::TypeRefName),
            Err(crate::Error::InvalidToken(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_token_kind() {
        let mut tables = MemoryTables::new();
        let result = tables.append_row(
            TableId::TypeRef,
            &type_ref(Token::from_parts(TableId::TypeDef, 1), "Object"),
        );
        assert!(matches!(result, Err(crate::Error::InvalidArgument(_))));

        let result = tables.append_row(
            TableId::NestedClass,
            &[(
                Column::NestedClassNestedClass,
                Token::from_parts(TableId::TypeRef, 1).into(),
            )],
        );
        assert!(matches!(result, Err(crate::Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_wrong_value_kind() {
        let mut tables = MemoryTables::new();
        let result = tables.append_row(TableId::ModuleRef, &[(Column::ModuleRefName, 5u32.into())]);
        assert!(matches!(result, Err(crate::Error::InvalidArgument(_))));

        let result = tables.append_row(TableId::ModuleRef, &[(Column::TypeRefName, "x".into())]);
        assert!(matches!(result, Err(crate::Error::InvalidArgument(_))));
    }

    #[test]
    fn test_nil_tokens_normalize() {
        let mut tables = MemoryTables::new();
        tables
            .append_row(TableId::TypeRef, &type_ref(Token::nil(TableId::TypeRef), "X"))
            .unwrap();

        assert_eq!(
            tables.get(1, Column::TypeRefResolutionScope).unwrap(),
            CellValue::Token(Token::new(0))
        );
    }

    #[test]
    fn test_set() {
        let mut tables = MemoryTables::new();
        tables
            .append_row(TableId::ModuleRef, &[(Column::ModuleRefName, "a.dll".into())])
            .unwrap();
        tables
            .set(1, Column::ModuleRefName, "b.dll".into())
            .unwrap();

        assert_eq!(
            tables.get(1, Column::ModuleRefName).unwrap(),
            CellValue::String("b.dll".into())
        );
        assert!(tables.set(2, Column::ModuleRefName, "c.dll".into()).is_err());
    }

    fn nested(tables: &mut MemoryTables, nested: u32, enclosing: u32) {
        tables
            .append_row(
                TableId::NestedClass,
                &[
                    (
                        Column::NestedClassNestedClass,
                        Token::from_parts(TableId::TypeDef, nested).into(),
                    ),
                    (
                        Column::NestedClassEnclosingClass,
                        Token::from_parts(TableId::TypeDef, enclosing).into(),
                    ),
                ],
            )
            .unwrap();
    }

    #[test]
    fn test_sorted_range() {
        let mut tables = MemoryTables::new();
        nested(&mut tables, 3, 2);
        nested(&mut tables, 4, 3);
        nested(&mut tables, 6, 2);

        let key = CellValue::Token(Token::from_parts(TableId::TypeDef, 4));
        assert_eq!(
            tables
                .find_range(Column::NestedClassNestedClass, &key)
                .unwrap(),
            RangeLookup::Range { start: 2, end: 3 }
        );

        let key = CellValue::Token(Token::from_parts(TableId::TypeDef, 5));
        assert_eq!(
            tables
                .find_range(Column::NestedClassNestedClass, &key)
                .unwrap(),
            RangeLookup::NotFound
        );
    }

    #[test]
    fn test_unsorted_range_is_unsupported() {
        let mut tables = MemoryTables::new();
        nested(&mut tables, 6, 2);
        nested(&mut tables, 3, 2);
        assert!(!tables.is_sorted(TableId::NestedClass));

        let key = CellValue::Token(Token::from_parts(TableId::TypeDef, 3));
        assert_eq!(
            tables
                .find_range(Column::NestedClassNestedClass, &key)
                .unwrap(),
            RangeLookup::Unsupported
        );

        tables
            .set(
                1,
                Column::NestedClassNestedClass,
                Token::from_parts(TableId::TypeDef, 2).into(),
            )
            .unwrap();
        assert!(tables.is_sorted(TableId::NestedClass));
    }

    #[test]
    fn test_range_queries_disabled() {
        let mut tables = MemoryTables::new().with_range_queries(false);
        nested(&mut tables, 3, 2);

        let key = CellValue::Token(Token::from_parts(TableId::TypeDef, 3));
        assert_eq!(
            tables
                .find_range(Column::NestedClassNestedClass, &key)
                .unwrap(),
            RangeLookup::Unsupported
        );
    }

    #[test]
    fn test_unkeyed_column_is_unsupported() {
        let tables = MemoryTables::new();
        let key = CellValue::Token(Token::from_parts(TableId::TypeDef, 3));
        assert_eq!(
            tables
                .find_range(Column::NestedClassEnclosingClass, &key)
                .unwrap(),
            RangeLookup::Unsupported
        );
    }

    #[test]
    fn test_indirection() {
        let mut tables = MemoryTables::new();
        assert!(!tables.has_indirection(TableId::Field));
        assert_eq!(tables.resolve_indirect(TableId::Field, 2).unwrap(), 2);

        for row in [3u32, 1, 2] {
            tables
                .append_row(
                    TableId::FieldPtr,
                    &[(
                        Column::FieldPtrField,
                        Token::from_parts(TableId::Field, row).into(),
                    )],
                )
                .unwrap();
        }

        assert!(tables.has_indirection(TableId::Field));
        assert_eq!(tables.resolve_indirect(TableId::Field, 1).unwrap(), 3);
        assert_eq!(tables.resolve_indirect(TableId::Field, 2).unwrap(), 1);
        assert!(tables.resolve_indirect(TableId::Field, 4).is_err());
        assert_eq!(tables.resolve_indirect(TableId::TypeRef, 4).unwrap(), 4);
    }

    #[test]
    fn test_unsupported_table() {
        let mut tables = MemoryTables::new();
        assert!(tables.append_row(TableId::CustomAttribute, &[]).is_err());
    }
}
