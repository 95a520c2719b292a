mod parser;
pub mod resolver;
pub mod scraper;
pub mod types;
pub mod utils;

pub use parser::parse_company_profile;
pub use resolver::{ResolveError, Roster, UrlTable, Worklist, resolve_worklist};
pub use scraper::{PageOutcome, ScraperConfig, ScraperError, WebScraper};
pub use types::{CompanyRecord, EmployeeCount, NOT_FOUND};
