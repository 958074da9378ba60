pub mod command_models;
pub mod command_table;
pub mod directory;
pub mod grammar;
pub mod reply;

pub use command_models::{ArgKind, ArgSpec, Args, CommandError, Invocation, Target};
pub use command_table::{CommandContext, CommandTable, HandlerResult};
pub use directory::{Directory, GuildRef, IdKind, MemberProfile, UserProfile};
pub use reply::{Embed, Reply, Table};
