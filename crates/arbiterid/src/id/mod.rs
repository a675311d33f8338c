mod arbiter_id;

pub use arbiter_id::*;
