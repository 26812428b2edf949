#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod config;
pub mod expander;
pub mod ext;
pub mod filesystem;
pub mod items;
pub mod selection;
