pub mod annotations;
pub mod export;
pub mod upload;
