mod lock;
mod mutex;
mod options;

pub use lock::*;
pub(crate) use mutex::*;
pub use options::*;
