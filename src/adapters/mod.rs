// Adapters layer: concrete implementations of the domain ports (http, html, output files).

pub mod html;
pub mod http;
pub mod output;

pub use html::ScraperHtmlParser;
pub use http::HttpFetcher;
pub use output::LocalDestination;
