pub mod category;
pub mod chat;
pub mod compact;
pub mod filter;
pub mod fusion;
pub mod receipt;

pub use category::Category;
pub use chat::{ChatRole, ChatTurn};
pub use compact::{CompactItem, CompactPayload, CompactReceipt};
pub use filter::{OrderBy, QueryFilter};
pub use fusion::FusionPolicy;
pub use receipt::{Receipt, ReceiptItem};
