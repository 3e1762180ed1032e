//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod event;
pub mod guild;

pub use user::User;
pub use message::{Message, Content};
pub use event::{Event, EventKind, Invocation};
pub use guild::GuildRecord;
