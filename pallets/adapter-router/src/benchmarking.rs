extern crate alloc;

use crate::*;
use alloc::{vec, vec::Vec};
use frame::deps::frame_benchmarking::{account, v2::*};
use frame::deps::frame_support::traits::EnsureOrigin;
use frame::deps::frame_system::RawOrigin;
use frame::deps::sp_runtime::traits::Zero;
use frame::prelude::*;

fn bench_name<T: Config>(seed: u32) -> AdapterNameOf<T> {
  let mut raw = b"bench-".to_vec();
  raw.extend_from_slice(&seed.to_le_bytes());
  raw.try_into().expect("benchmark adapter names fit MaxAdapterNameLen")
}

/// Single-token absolute deposit against the adapter registered as `name`.
fn bench_action<T: Config>(
  name: AdapterNameOf<T>,
  token: T::AssetId,
  amount: T::Balance,
) -> ActionOf<T> {
  Action {
    protocol_adapter_name: name,
    action_type: ActionType::Deposit,
    tokens: BoundedVec::truncate_from(vec![token]),
    amounts: BoundedVec::truncate_from(vec![amount]),
    amount_types: BoundedVec::truncate_from(vec![AmountType::Absolute]),
    data: BoundedVec::default(),
  }
}

/// Leave room for one more adapter.
fn make_room<T: Config>() {
  let keep = (T::MaxAdapters::get() as usize).saturating_sub(1);
  let mut names = AdapterNames::<T>::get().into_inner();
  if names.len() > keep {
    for name in names.drain(keep..) {
      AdapterRegistry::<T>::remove(&name);
    }
    AdapterNames::<T>::put(BoundedVec::truncate_from(names));
  }
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn execute_actions(
    a: Linear<0, { T::MaxActions::get() }>,
    o: Linear<1, { T::MaxOutputs::get() }>,
  ) {
    let caller: T::AccountId = whitelisted_caller();
    let beneficiary: T::AccountId = account("beneficiary", 0, 0);
    let custodian = Pallet::<T>::account_id();
    let amount: T::Balance = 1_000_000u32.into();

    make_room::<T>();
    let adapter_name = bench_name::<T>(0);
    Pallet::<T>::do_add_adapter(adapter_name.clone(), T::BenchmarkHelper::adapter_id(0))
      .expect("registry has room");
    let action_token = T::BenchmarkHelper::asset_id(T::MaxOutputs::get());
    T::BenchmarkHelper::fund(&custodian, action_token, amount).expect("benchmark funding succeeds");
    let actions: Vec<ActionOf<T>> = (0..a)
      .map(|_| bench_action::<T>(adapter_name.clone(), action_token, 1u32.into()))
      .collect();
    let actions: BoundedVec<ActionOf<T>, T::MaxActions> =
      actions.try_into().expect("a is bounded by MaxActions");

    let mut required: Vec<OutputOf<T>> = Vec::new();
    for i in 0..o {
      let token = T::BenchmarkHelper::asset_id(i);
      T::BenchmarkHelper::fund(&custodian, token, amount).expect("benchmark funding succeeds");
      T::BenchmarkHelper::fund(&beneficiary, token, amount).expect("benchmark funding succeeds");
      required.push(Output {
        token,
        amount: 1u32.into(),
      });
    }
    let required: BoundedVec<OutputOf<T>, T::MaxOutputs> =
      required.try_into().expect("o is bounded by MaxOutputs");

    #[extrinsic_call]
    execute_actions(
      RawOrigin::Signed(caller),
      actions,
      required,
      Zero::zero(),
      beneficiary,
    );

    assert!(!ExecutionLock::<T>::get());
    let first = T::BenchmarkHelper::asset_id(0);
    assert!(T::AssetOps::balance(&custodian, first).is_zero());
    if a > 0 {
      assert!(T::AssetOps::balance(&custodian, action_token).is_zero());
    }
  }

  #[benchmark]
  fn execute_action_external() {
    make_room::<T>();
    let adapter_name = bench_name::<T>(0);
    Pallet::<T>::do_add_adapter(adapter_name.clone(), T::BenchmarkHelper::adapter_id(0))
      .expect("registry has room");
    let custodian = Pallet::<T>::account_id();
    let token = T::BenchmarkHelper::asset_id(0);
    T::BenchmarkHelper::fund(&custodian, token, 1_000_000u32.into())
      .expect("benchmark funding succeeds");
    let action = bench_action::<T>(adapter_name, token, 1u32.into());
    ExecutionLock::<T>::put(true);

    #[extrinsic_call]
    execute_action_external(RawOrigin::Signed(custodian), action);

    assert!(ExternalTouched::<T>::get().contains(&token));
  }

  #[benchmark]
  fn add_adapter() {
    make_room::<T>();
    let name = bench_name::<T>(0);
    let adapter = T::BenchmarkHelper::adapter_id(0);
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    add_adapter(origin, name.clone(), adapter);

    assert_eq!(AdapterRegistry::<T>::get(&name), Some(adapter));
  }

  #[benchmark]
  fn update_adapter() {
    make_room::<T>();
    let name = bench_name::<T>(0);
    Pallet::<T>::do_add_adapter(name.clone(), T::BenchmarkHelper::adapter_id(0))
      .expect("registry has room");
    let replacement = T::BenchmarkHelper::adapter_id(1);
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    update_adapter(origin, name.clone(), replacement);

    assert_eq!(AdapterRegistry::<T>::get(&name), Some(replacement));
  }

  #[benchmark]
  fn remove_adapter() {
    make_room::<T>();
    let name = bench_name::<T>(0);
    Pallet::<T>::do_add_adapter(name.clone(), T::BenchmarkHelper::adapter_id(0))
      .expect("registry has room");
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    remove_adapter(origin, name.clone());

    assert!(!AdapterRegistry::<T>::contains_key(&name));
    assert!(!AdapterNames::<T>::get().contains(&name));
  }

  impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Test);
}
