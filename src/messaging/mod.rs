//! Send path and wallet key loading.
//!
//! # Data Flow
//! ```text
//! recipients (hex keys | names) → resolve → seal → blob
//!     → random carrier address → gas estimate → transfer(Store, blob) → txid
//! ```

pub mod sender;
pub mod types;
pub mod wallet;

pub use sender::{parse_recipient, MessageSender};
pub use types::{MessagingError, MessagingResult, SendReceipt};
pub use wallet::load_private_key;
