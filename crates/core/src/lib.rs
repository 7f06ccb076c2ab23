pub mod page;
pub mod session;
pub mod source;

pub use page::PageImage;
pub use session::{count_words, Completion, PageSlot, PageTicket, Session, SessionSnapshot};
pub use source::SourceKind;
