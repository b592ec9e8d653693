// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistence for marketplace monitoring.
//!
//! Two narrow interfaces sit on top of SQLite:
//! - [`ResultStore`]: append-only check results with lookup indexes
//! - [`ConnectionRegistry`]: the set of connections currently under monitoring

pub mod connections;
pub mod error;
pub mod pool;
pub mod results;
pub mod testing;
mod timestamp;

pub use connections::{ConnectionRegistry, SqliteConnectionRegistry};
pub use error::{PersistenceError, Result};
pub use pool::create_pool;
pub use results::{ResultStore, SqliteResultStore};
