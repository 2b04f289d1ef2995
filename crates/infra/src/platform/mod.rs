//! OS-level capability adapters

mod opener;
mod os_trash;

pub use opener::SystemOpener;
pub use os_trash::OsTrash;
