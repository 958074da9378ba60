pub mod directory;
pub mod events;
pub mod render;

pub use directory::SerenityDirectory;
pub use events::handle_message;
pub use render::render_reply;
