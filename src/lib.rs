//! Core library for the centrifuge enrichment facility simulator.
#![warn(missing_docs)]
pub mod commands;
pub mod enrichment;
pub mod exchange;
pub mod facility;
pub mod id;
pub mod input;
pub mod inventory;
pub mod log;
pub mod material;
pub mod model;
pub mod output;
pub mod simulation;
pub mod units;

#[cfg(test)]
mod fixture;
