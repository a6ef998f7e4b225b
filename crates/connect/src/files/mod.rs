mod directory_saver;

pub use directory_saver::{safe_filename, DirectoryFileSaver};
