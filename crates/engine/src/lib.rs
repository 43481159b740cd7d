pub mod crawler;
pub mod engine;
pub mod pool;
pub mod registry;

pub use crawler::LinkCrawler;
pub use engine::CrawlEngine;
pub use registry::Registries;
