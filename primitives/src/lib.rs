#![cfg_attr(not(feature = "std"), no_std)]

pub mod assets;
pub mod router;

pub use assets::*;
pub use router::*;
