pub mod format;
pub mod load;
pub mod logger;
pub mod settings;
