pub mod analyzers;
pub mod chart;
pub mod error;
pub mod events;
pub mod join;
pub mod output;
pub mod parse;
pub mod region;
pub mod weather;
