mod archive;
mod fs_utils;
mod layout;
mod manifest_store;

pub use archive::extract_zip;
pub use fs_utils::{remove_dir_if_exists, remove_file_if_exists};
pub use layout::{default_working_dir, WorkingLayout};
pub use manifest_store::{read_installed_manifest, write_installed_manifest};
