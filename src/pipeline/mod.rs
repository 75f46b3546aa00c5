// src/pipeline/mod.rs

//! Resolution pipeline.

mod resolve;

pub use resolve::{Resolver, direct_play_hd_url, direct_play_url};
