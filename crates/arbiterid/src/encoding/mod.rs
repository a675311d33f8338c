mod base32;
mod base58;
mod base64;
mod binary;
mod decimal;
mod error;
mod interface;
mod radix;

pub use base32::*;
pub use base58::*;
pub use base64::*;
pub use binary::*;
pub use decimal::*;
pub use error::*;
pub use interface::*;
