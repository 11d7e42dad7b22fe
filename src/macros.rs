#![allow(unused_macros)]

/// Helper macro for reading locked items, propagating a poisoned lock as
/// [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let store = read_lock!(self.store);
///  let count = store.row_count(TableId::TypeRef);
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for writing to locked items, propagating a poisoned lock as
/// [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut store = write_lock!(self.store);
///  store.append_row(TableId::ModuleRef, &values)?;
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for running a closure against a read-locked item
///
/// ```rust, ignore
///  let rows = with_read!(self.store, |store: &dyn TableStore| store.row_count(table));
/// ```
macro_rules! with_read {
    ($rwlock:expr, $closure:expr) => {{
        let guard = read_lock!($rwlock);
        $closure(&**guard)
    }};
}

/// Helper macro for running a closure against a write-locked item
///
/// ```rust, ignore
///  with_write!(self.store, |store: &mut dyn TableStore| store.set(rid, column, value))?;
/// ```
macro_rules! with_write {
    ($rwlock:expr, $closure:expr) => {{
        let mut guard = write_lock!($rwlock);
        $closure(&mut **guard)
    }};
}
