//! mechdeck: Narrative context.
//!
//! Responsible for loading story documents, deciding which choices a player
//! can see, running the actions attached to choices and nodes, and keeping
//! per-player progress through each story.

pub mod application;
pub mod domain;
