//! Cog lifecycle: registry, handler binding, command ownership and guild enablement

pub mod binder;
pub mod builtin;
pub mod command_index;
pub mod guild_scope;
pub mod manager;
pub mod source;
pub mod trait_def;

pub use binder::{BindingHandle, HandlerBinder};
pub use builtin::BuiltinCatalog;
pub use command_index::CommandIndex;
pub use guild_scope::GuildScope;
pub use manager::{CogInfo, CogRegistry, LoadReport, LoadedCog};
pub use source::{CogLocator, CogSource, ResolvedCog};
pub use trait_def::{
    CogContext, CogDescriptor, CogInit, CogState, CommandExecutor, CommandSpec, EventHandler, EventSpec,
    HostContext,
};
