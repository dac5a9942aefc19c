mod bulk;
mod chain;
mod cursor;
mod destructor;
mod iter;
mod length;
mod locked_list;
mod node;
mod tests;

pub(crate) use chain::*;
pub(crate) use destructor::*;
pub(crate) use iter::*;
pub use length::ByteLen;
pub(crate) use length::*;
pub use locked_list::*;
pub use node::Entry;
pub(crate) use node::*;
