//! Statement documents and the file side channel that stores them.

mod documents_budget;
mod documents_model;
mod documents_traits;

pub use documents_budget::DownloadBudget;
pub use documents_model::{SaveReport, StatementDocument};
pub use documents_traits::FileSaver;
