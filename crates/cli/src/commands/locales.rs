use pantry_core::catalog::ProductManager;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    CommandResult::text(ProductManager::supported_locales().join("\n"))
}
