//! Bus journey planner server.
//!
//! Answers "which bus, or pair of buses, gets me from here to there with the
//! least walking?" over urban and rural line networks, and annotates the
//! answer with the next departure at the boarding stop.

pub mod domain;
pub mod logging;
pub mod planner;
pub mod repository;
pub mod schedule;
pub mod settings;
pub mod web;
