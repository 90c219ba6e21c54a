pub mod api;
pub mod normalizer;
pub mod ranker;
pub mod reference_data;
pub mod settings;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;

#[cfg(any(feature = "server", test))]
pub mod generative;

#[cfg(any(feature = "server", test))]
mod handlers;

#[cfg(any(feature = "server", test))]
pub mod suggestions;

#[cfg(any(feature = "server", test))]
pub mod weather;
