//! Infrastructure layer - catalog, simulation and process setup

pub mod experiment;
pub mod logging;
pub mod simulation;
