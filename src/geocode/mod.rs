pub mod client;
pub mod geolocation;
