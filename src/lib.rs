pub mod api;
pub mod cli;
pub mod completion;
pub mod config;
pub mod models;
pub mod session;
pub mod tui;
pub mod utils;

pub use api::ApiClient;
pub use config::Config;
pub use models::{Identity, Log, Pet, Routine, ShareToken};
pub use session::Session;
pub use utils::Profile;
