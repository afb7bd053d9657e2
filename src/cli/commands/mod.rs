//! One module per subcommand.

pub mod add;
pub mod create;
pub mod get;
pub mod keygen;
pub mod list;
pub mod menu;
