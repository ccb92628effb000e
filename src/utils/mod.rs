pub mod logger;
pub mod semantic;
