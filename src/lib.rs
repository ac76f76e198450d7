pub mod config;
pub mod domain;
pub mod routines;
pub mod scraping;
pub mod storage;

#[cfg(test)]
mod test_support;
