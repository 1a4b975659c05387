//! HTTP handlers for the Plans domain

pub mod distribution;
pub mod form;
pub mod plans;
