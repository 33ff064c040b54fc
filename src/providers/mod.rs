mod woodpecker;

pub use woodpecker::WoodpeckerProvider;
