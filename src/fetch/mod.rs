//! Concrete page fetchers: a headless Chrome session and a plain HTTP client

mod headless;
mod http;

pub use headless::HeadlessBrowser;
pub use http::HttpFetcher;
