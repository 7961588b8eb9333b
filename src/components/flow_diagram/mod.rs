//! Animated team-lineage diagram: packets flow from the studio card down a
//! trunk, split along a spine and branch out to every team member.

mod component;
mod config;
mod geometry;
mod layout;
mod render;
mod simulation;
mod state;
mod types;

pub use component::FlowDiagramCanvas;
pub use types::Roster;
