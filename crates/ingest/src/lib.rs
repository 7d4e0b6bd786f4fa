//! Two-phase ingest pipeline: CSV rows land in string-typed staging
//! records, then an explicit parse-and-validate step produces typed
//! entities. Invalid rows are reported and excluded; a bad row never
//! aborts the load.

pub mod loader;
pub mod parse;
pub mod staging;

pub use loader::load_warehouse;
pub use parse::{IngestReport, RowRejection};
pub use staging::{RawDistributionCenter, RawOrder, RawOrderItem, RawProduct, RawUser};
