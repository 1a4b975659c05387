//! Domain layer for the Plans domain

pub mod assets;
pub mod catalog;
pub mod distribution;
pub mod document;
pub mod entities;
pub mod entitlement;
pub mod preview;
