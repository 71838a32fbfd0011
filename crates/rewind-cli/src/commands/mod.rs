pub mod config;
pub mod count;
pub mod dispatch;
pub mod export;
pub mod key;
pub mod log;
pub mod revision;
pub mod schema;

#[cfg(test)]
mod test_support;
