use crate::logger::Logger;
use std::error::Error;

/// Function type for suite entry functions
pub type SuiteFn = fn(suite_name: &str, logger: &mut Logger) -> Result<(), Box<dyn Error>>;

/// Entry in the suite catalog
#[derive(Clone)]
pub struct SuiteEntry {
    pub short_name: &'static str,
    pub description: &'static str,
    pub run: SuiteFn,
}

// Create an inventory collection for suite entries
inventory::collect!(SuiteEntry);

/// Get all registered suites from the catalog
pub fn get_suite_catalog() -> Vec<SuiteEntry> {
    inventory::iter::<SuiteEntry>
        .into_iter()
        .map(|entry| entry.clone())
        .collect()
}

// Suites register themselves with inventory::submit!
// Example:
// inventory::submit!(suites::SuiteEntry {
//     short_name: "name",
//     description: "desc",
//     run: function,
// });
