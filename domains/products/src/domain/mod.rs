//! Domain layer for the Products domain

pub mod catalog;
pub mod entities;
