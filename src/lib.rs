//! Lifecycle management for trainable burn models.
//!
//! A concrete model embeds a [`ml::base_model::ModelBase`] and implements
//! [`ml::base_model::TrainableModel`]; it then gets setup, train / eval /
//! test switching, subnetwork freezing, checkpointing and learning-rate
//! scheduling for free.

#![recursion_limit = "256"]

pub mod application;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
