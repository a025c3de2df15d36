// Importers module - ledger ingestion from CSV files

pub mod ledger_csv;

pub use ledger_csv::{parse_brl_number, parse_ledger_csv};
