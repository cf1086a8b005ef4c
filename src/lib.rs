//! Build calculator and equipment optimizer core for Guild Wars 2
//! World vs World.
//!
//! The pipeline: an [`attributes::AttributeSet`] plus a list of
//! [`modifier::Modifier`]s and a [`context::CombatContext`] flow through the
//! [`stacker`] into [`build::EffectiveStats`]; the [`rotation`] scheduler
//! prices a skill sequence against those stats; the [`optimizer`] and
//! [`gear`] searches rank equipment choices on top.

pub mod attributes;
pub mod build;
pub mod calculators;
pub mod config;
pub mod context;
pub mod error;
pub mod gear;
pub mod modifier;
pub mod optimizer;
pub mod registry;
pub mod rotation;
pub mod stacker;

pub use error::SimError;
