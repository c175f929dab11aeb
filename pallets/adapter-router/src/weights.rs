#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn execute_actions(a: u32, o: u32) -> Weight;
  fn execute_action_external() -> Weight;
  fn add_adapter() -> Weight;
  fn update_adapter() -> Weight;
  fn remove_adapter() -> Weight;
}

/// Router overhead only. Adapter work is charged through the per-action component,
/// which runtimes should size for their most expensive adapter.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  fn execute_actions(a: u32, o: u32) -> Weight {
    let tokens = u64::from(T::MaxTokensPerAction::get());
    Weight::from_parts(30_000_000, 3000)
      .saturating_add(Weight::from_parts(40_000_000, 4000).saturating_mul(a.into()))
      .saturating_add(Weight::from_parts(20_000_000, 2500).saturating_mul(o.into()))
      .saturating_add(T::DbWeight::get().reads(2u64.saturating_add(u64::from(a).saturating_mul(tokens.saturating_add(1)))))
      .saturating_add(T::DbWeight::get().reads_writes(u64::from(o).saturating_mul(2), u64::from(o).saturating_mul(2)))
      .saturating_add(T::DbWeight::get().writes(2u64.saturating_add(u64::from(a).saturating_mul(tokens.saturating_add(1)))))
  }

  fn execute_action_external() -> Weight {
    let tokens = u64::from(T::MaxTokensPerAction::get());
    Weight::from_parts(40_000_000, 4000)
      .saturating_add(T::DbWeight::get().reads(tokens.saturating_add(4)))
      .saturating_add(T::DbWeight::get().writes(tokens.saturating_add(3)))
  }

  fn add_adapter() -> Weight {
    Weight::from_parts(15_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn update_adapter() -> Weight {
    Weight::from_parts(12_000_000, 1000)
      .saturating_add(T::DbWeight::get().reads(1))
      .saturating_add(T::DbWeight::get().writes(1))
  }

  fn remove_adapter() -> Weight {
    Weight::from_parts(15_000_000, 1500)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(2))
  }
}

impl WeightInfo for () {
  fn execute_actions(a: u32, o: u32) -> Weight {
    Weight::from_parts(30_000_000, 3000)
      .saturating_add(Weight::from_parts(40_000_000, 4000).saturating_mul(a.into()))
      .saturating_add(Weight::from_parts(20_000_000, 2500).saturating_mul(o.into()))
      .saturating_add(RocksDbWeight::get().reads_writes(2, 2))
  }
  fn execute_action_external() -> Weight { Weight::from_parts(40_000_000, 4000) }
  fn add_adapter() -> Weight { Weight::from_parts(15_000_000, 1500) }
  fn update_adapter() -> Weight { Weight::from_parts(12_000_000, 1000) }
  fn remove_adapter() -> Weight { Weight::from_parts(15_000_000, 1500) }
}
