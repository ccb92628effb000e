pub mod analysis_simulator;
pub mod navigation;
pub mod productivity_service;
pub mod scope_service;
pub mod settings_service;
pub mod wizard_service;
