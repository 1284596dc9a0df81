pub mod provider;
pub mod source;
