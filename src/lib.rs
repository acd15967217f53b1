mod aavf;
pub mod codec;
pub mod error;
mod filter;
pub mod parser;
pub mod reader;
pub mod record;
pub mod types;
pub mod walk;
pub mod writer;

pub use crate::aavf::Aavf;
pub use error::{AavfError, Result};
pub use filter::{apply_filters, Filter};
pub use parser::Separator;
pub use reader::{AavfRecords, ReaderOptions};
pub use record::{FilterStatus, GenomicKey, InfoValue, Record, Value};
pub use types::{
    Header, HeaderFilter, HeaderInfo, HeaderValue, InfoNumber, InfoType, MetaEntry, Vocabulary,
};
pub use walk::{walk_together, IntoRecord, WalkTogether};
pub use writer::{AavfWriter, WriterOptions};
