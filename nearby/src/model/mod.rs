pub mod curated;
pub mod discovery;
pub mod geo;
