// External wiki adapters: fetch, parse, mine benefits

pub mod benefits;
pub mod fetcher;
pub mod page;
pub mod parsers;
pub mod scraper_service;
pub mod transport;

pub use benefits::*;
pub use fetcher::*;
pub use page::*;
pub use parsers::*;
pub use scraper_service::*;
pub use transport::*;
