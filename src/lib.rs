//! Mingle Arena - shelter elimination tournament simulation
//!
//! Competitors are split into rooms, race for a handful of capacity-limited
//! shelters and are eliminated if they are left outside when the timer runs
//! out. Survivors regroup and go again until one (or nobody) is left.
//!
//! The crate is the simulation core only: the host supplies ticks and input
//! and draws whatever it likes from the snapshots.

pub mod arena;
pub mod core;
