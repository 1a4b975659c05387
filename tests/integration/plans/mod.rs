mod catalog;
mod distribution;
