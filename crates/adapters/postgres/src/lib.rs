//! adapter-postgres - PostgreSQL 适配器

mod connection;
mod migrate;

pub use connection::*;
pub use migrate::*;
