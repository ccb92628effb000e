pub mod productivity;
pub mod settings;
pub mod wizard;
