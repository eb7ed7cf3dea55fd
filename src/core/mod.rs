pub mod balance_delta;
pub mod constants;
pub mod dex_detector;
pub mod error;
pub mod instruction_extractor;
pub mod program_registry;
pub mod transaction_classifier;
