mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{handle_add, handle_create_user, handle_list, handle_serve, resolve_config};
