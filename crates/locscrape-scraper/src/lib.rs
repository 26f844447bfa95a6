pub mod error;
pub mod export;
pub mod fetch;
pub mod locator;
mod retry;

pub use error::FetchError;
pub use export::{record_row, to_csv_string, write_csv, CSV_HEADERS};
pub use fetch::{BrowserRenderer, FetchSettings, FetchedPage, PageFetcher, PageSource};
pub use locator::{
    extract, extract_all, extract_with_report, rank, Address, CandidateRanking, ClassSignature,
    Extraction, FieldClassifier, FieldRole, LocationExtractor, LocationRecord,
};
