pub mod agenda;
pub mod display;
pub mod tags;
pub mod tasks;
