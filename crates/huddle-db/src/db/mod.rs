use std::future::Future;
use std::pin::Pin;

use crate::error::DbResult;

pub mod connection;
pub mod migrate;
pub mod query;
pub mod schema;

/// Handle to the persistence layer. Constructed once at process start and
/// passed down explicitly; nothing in this workspace reaches for a global
/// client.
pub trait DbProvider: Send + Sync {
    fn get_connection<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = DbResult<connection::DbConnection<'a>>> + Send + 'a>>;
}
