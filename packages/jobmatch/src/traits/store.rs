//! Record store seam.

use async_trait::async_trait;

use crate::error::Result;

/// An append-only store of string rows, such as a spreadsheet tab or a flat
/// local file. The first row is expected to be a header.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every row in order, header included.
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>>;

    /// Append rows at the end of the store, preserving order.
    async fn append_rows(&self, rows: &[Vec<String>]) -> Result<()>;
}
