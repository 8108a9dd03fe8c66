//! Shared access for multi-caller hosts
//!
//! The engine types are plain single-owner structures. When several threads
//! feed or query the same store or aggregator, wrap it in [`Shared`]: one
//! writer at a time, any number of concurrent readers.
//!
//! ```rust
//! use scanwatch_core::sync::Shared;
//! use scanwatch_core::{Position, SignalStore};
//!
//! let store = Shared::new(SignalStore::new());
//! let writer = store.clone();
//!
//! std::thread::spawn(move || {
//!     writer.write(|s| s.add_reading("dev", -50.0, Position::new(40.7, -74.0), None).map(|_| ()))
//! })
//! .join()
//! .unwrap()?;
//!
//! assert_eq!(store.read(|s| s.len())?, 1);
//! # Ok::<(), scanwatch_core::CoreError>(())
//! ```

use std::sync::{Arc, RwLock};

use crate::errors::CoreError;

/// Reference-counted reader/writer wrapper
#[derive(Debug)]
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    /// Wrap `value` for shared access
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Run `f` with shared access
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, CoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| CoreError::LockPoisoned("read"))?;
        Ok(f(&guard))
    }

    /// Run a fallible `f` with exclusive access, flattening its error
    pub fn write<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, CoreError>
    where
        E: Into<CoreError>,
    {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| CoreError::LockPoisoned("write"))?;
        f(&mut guard).map_err(Into::into)
    }

    /// Run an infallible `f` with exclusive access
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, CoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| CoreError::LockPoisoned("write"))?;
        Ok(f(&mut guard))
    }
}
