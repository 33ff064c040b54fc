mod client;
mod links;
mod normalize;
mod provider;
mod types;

pub use provider::WoodpeckerProvider;
