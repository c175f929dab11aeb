//! Adapter Router Pallet
//!
//! Composes ordered batches of deposit/withdraw actions against registered protocol
//! adapters and settles the resulting balances to a beneficiary.
//!
//! ## Execution
//! The pallet account is a transient custodian: a caller's native payment and every
//! asset an adapter produces are held by it for the duration of one batch only. Each
//! action is resolved by adapter name, validated and dispatched with an
//! [`ExecutionScope`] that lets the adapter spend custody directly. Settlement then
//! pays out required outputs (full held balance, never less than the requested minimum)
//! and sweeps every other touched token to the beneficiary.
//!
//! A batch is one storage transaction: any failure, including an adapter error which is
//! surfaced unchanged, leaves all balances as they were.
//!
//! ## Re-entrancy
//! `execute_actions` is guarded by [`ExecutionLock`]. Adapters compose further actions
//! through [`ExecutionScope::execute_action`], which bypasses the lock but is bounded by
//! `MaxNestingDepth`. The `execute_action_external` call is the runtime-call form of the
//! same composition: it accepts the custodian origin only, runs only inside a batch, and
//! its touched tokens are settled with that batch.
//!
//! ## Aggregation
//! View functions report the signed positions an account holds across adapters. A
//! failing per-token query counts as zero instead of failing the whole report.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub mod aggregation;
pub mod execution;
pub mod guard;
pub mod types;

pub use adapters::{AssetOps, ProtocolAdapters};
pub use aggregation::{absorb_query_failure, compact_balances};
pub use execution::ExecutionScope;
pub use guard::ExecutionGuard;
pub use types::*;

#[cfg(test)]
pub mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

pub const LOG_TARGET: &str = "runtime::adapter-router";

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId, AssetId, Balance, AdapterId> {
  /// Adapter registered under benchmark-generated names.
  ///
  /// It must accept a `Deposit` of one token with an absolute amount of
  /// `asset_id(seed)` held in custody.
  fn adapter_id(seed: u32) -> AdapterId;
  /// Distinct fungible asset per seed; must exist on the ledger.
  fn asset_id(seed: u32) -> AssetId;
  fn fund(
    who: &AccountId,
    asset: AssetId,
    amount: Balance,
  ) -> polkadot_sdk::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{
    Action, AdapterBalance, AssetOps, ExecutionScope, Output, ProtocolAdapters, SettlementError,
    TokenBalance, WeightInfo,
  };
  use alloc::vec::Vec;
  use frame::prelude::*;
  use polkadot_sdk::{
    frame_support::{PalletId, traits::EnsureOrigin},
    sp_runtime::traits::{AccountIdConversion, Zero},
  };

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::config]
  pub trait Config: frame_system::Config {
    type AssetId: Parameter + Member + Copy + MaybeSerializeDeserialize + MaxEncodedLen;

    type Balance: Parameter
      + Member
      + AtLeast32BitUnsigned
      + Default
      + Copy
      + MaybeSerializeDeserialize
      + MaxEncodedLen;

    /// Signed adapter position. Negative values are debt.
    type SignedBalance: Parameter
      + Member
      + Copy
      + Default
      + Zero
      + MaybeSerializeDeserialize
      + MaxEncodedLen;

    /// Sentinel asset id of the chain's native currency.
    #[pallet::constant]
    type NativeAssetId: Get<Self::AssetId>;

    type AssetOps: AssetOps<Self::AccountId, Self::AssetId, Self::Balance>;

    /// Handle the runtime uses to reach one protocol adapter.
    type AdapterId: Parameter + Member + Copy + MaybeSerializeDeserialize + MaxEncodedLen;

    type Adapters: ProtocolAdapters<Self>;

    /// Origin allowed to mutate the adapter registry.
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Derives the custody account.
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    #[pallet::constant]
    type MaxAdapters: Get<u32>;
    #[pallet::constant]
    type MaxAdapterNameLen: Get<u32>;
    #[pallet::constant]
    type MaxActions: Get<u32>;
    #[pallet::constant]
    type MaxTokensPerAction: Get<u32>;
    #[pallet::constant]
    type MaxActionDataLen: Get<u32>;
    #[pallet::constant]
    type MaxOutputs: Get<u32>;
    /// How many levels of adapter-initiated actions may stack under one top-level action.
    #[pallet::constant]
    type MaxNestingDepth: Get<u32>;
    /// Distinct tokens that `execute_action_external` calls may hand to one batch.
    #[pallet::constant]
    type MaxTouchedTokens: Get<u32>;

    type WeightInfo: WeightInfo;

    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<
        Self::AccountId,
        Self::AssetId,
        Self::Balance,
        Self::AdapterId,
      >;
  }

  pub type AdapterNameOf<T> = BoundedVec<u8, <T as Config>::MaxAdapterNameLen>;

  pub type ActionOf<T> = Action<
    <T as Config>::AssetId,
    <T as Config>::Balance,
    <T as Config>::MaxAdapterNameLen,
    <T as Config>::MaxTokensPerAction,
    <T as Config>::MaxActionDataLen,
  >;

  pub type OutputOf<T> = Output<<T as Config>::AssetId, <T as Config>::Balance>;

  pub type TokenBalanceOf<T> = TokenBalance<<T as Config>::AssetId, <T as Config>::SignedBalance>;

  pub type AdapterBalanceOf<T> =
    AdapterBalance<AdapterNameOf<T>, <T as Config>::AssetId, <T as Config>::SignedBalance>;

  pub type SettlementErrorOf<T> = SettlementError<<T as Config>::AssetId, <T as Config>::Balance>;

  /// Adapter name to adapter handle.
  #[pallet::storage]
  pub type AdapterRegistry<T: Config> =
    StorageMap<_, Blake2_128Concat, AdapterNameOf<T>, T::AdapterId, OptionQuery>;

  /// Registered names in registration order.
  #[pallet::storage]
  pub type AdapterNames<T: Config> =
    StorageValue<_, BoundedVec<AdapterNameOf<T>, T::MaxAdapters>, ValueQuery>;

  /// Set while a top-level batch is executing.
  #[pallet::storage]
  pub type ExecutionLock<T: Config> = StorageValue<_, bool, ValueQuery>;

  /// Nesting depth of the adapter action currently running in the batch.
  #[pallet::storage]
  pub type ExecutionDepth<T: Config> = StorageValue<_, u32, ValueQuery>;

  /// Tokens touched through `execute_action_external`, waiting to join the running
  /// batch's settlement.
  #[pallet::storage]
  pub type ExternalTouched<T: Config> =
    StorageValue<_, BoundedVec<T::AssetId, T::MaxTouchedTokens>, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// An action was dispatched to its adapter and succeeded.
    ActionExecuted { action: ActionOf<T> },
    /// A batch completed; `outputs` are the amounts paid for each required output.
    ActionsSettled {
      who: T::AccountId,
      beneficiary: T::AccountId,
      outputs: Vec<OutputOf<T>>,
    },
    AdapterAdded {
      name: AdapterNameOf<T>,
      adapter: T::AdapterId,
    },
    AdapterUpdated {
      name: AdapterNameOf<T>,
      old: T::AdapterId,
      new: T::AdapterId,
    },
    AdapterRemoved {
      name: AdapterNameOf<T>,
      adapter: T::AdapterId,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// A batch is already executing.
    ReentrantCall,
    /// `execute_action_external` was not called by the custody account.
    UnauthorizedSelfCall,
    /// No adapter is registered under the given name.
    UnknownAdapter,
    /// Action type is neither deposit nor withdraw.
    InvalidActionType,
    /// `amounts` and `amount_types` differ in length.
    ArrayLengthMismatch,
    /// Held balance of a required output is below the requested minimum.
    InsufficientOutput,
    /// Settlement could not move an asset to the beneficiary.
    AssetTransferFailed,
    /// Adapter-initiated actions are nested deeper than `MaxNestingDepth`.
    NestingTooDeep,
    /// Relative amount exceeds 100%.
    InvalidRelativeAmount,
    /// `execute_action_external` was called while no batch is executing.
    NoActiveBatch,
    /// Runtime-call compositions touched more than `MaxTouchedTokens` distinct tokens.
    TooManyTouchedTokens,
    EmptyAdapterName,
    AdapterAlreadyRegistered,
    TooManyAdapters,
  }

  impl<T: Config> From<SettlementErrorOf<T>> for Error<T> {
    fn from(err: SettlementErrorOf<T>) -> Self {
      match err {
        SettlementError::InsufficientOutput { .. } => Error::<T>::InsufficientOutput,
        SettlementError::TransferFailed { .. } => Error::<T>::AssetTransferFailed,
      }
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::MaxAdapterNameLen::get() > 0,
        "MaxAdapterNameLen must allow non-empty names"
      );
      assert!(T::MaxActions::get() > 0, "MaxActions must be nonzero");
      assert!(
        T::MaxTouchedTokens::get() >= T::MaxTokensPerAction::get(),
        "MaxTouchedTokens must hold the tokens of one action"
      );
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Execute `actions` in order and settle to `beneficiary`.
    ///
    /// `native_payment` is moved from the caller into custody before the first action.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::execute_actions(
      actions.len() as u32,
      required_outputs.len() as u32,
    ))]
    pub fn execute_actions(
      origin: OriginFor<T>,
      actions: BoundedVec<ActionOf<T>, T::MaxActions>,
      required_outputs: BoundedVec<OutputOf<T>, T::MaxOutputs>,
      native_payment: T::Balance,
      beneficiary: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let outputs = Self::do_execute_actions(
        &who,
        &actions,
        &required_outputs,
        native_payment,
        &beneficiary,
      )?;
      Self::deposit_event(Event::ActionsSettled {
        who,
        beneficiary,
        outputs,
      });
      Ok(())
    }

    /// Run a single action for the batch that is currently executing.
    ///
    /// Only the custody account may call this, and only while a batch holds the
    /// execution lock. The action nests one level below the adapter that issued the
    /// call, and the tokens it touches are settled with the running batch.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::execute_action_external())]
    pub fn execute_action_external(origin: OriginFor<T>, action: ActionOf<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(who == Self::account_id(), Error::<T>::UnauthorizedSelfCall);
      ensure!(ExecutionLock::<T>::get(), Error::<T>::NoActiveBatch);
      let mut scope = ExecutionScope::<T>::resume(who, ExecutionDepth::<T>::get());
      scope.execute_action(&action)?;
      Self::hand_over_touched(scope.touched())
    }

    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::add_adapter())]
    pub fn add_adapter(
      origin: OriginFor<T>,
      name: AdapterNameOf<T>,
      adapter: T::AdapterId,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_add_adapter(name, adapter)
    }

    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::update_adapter())]
    pub fn update_adapter(
      origin: OriginFor<T>,
      name: AdapterNameOf<T>,
      adapter: T::AdapterId,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let old = AdapterRegistry::<T>::try_mutate(&name, |entry| -> Result<_, DispatchError> {
        let current = entry.as_mut().ok_or(Error::<T>::UnknownAdapter)?;
        Ok(core::mem::replace(current, adapter))
      })?;
      Self::deposit_event(Event::AdapterUpdated {
        name,
        old,
        new: adapter,
      });
      Ok(())
    }

    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::remove_adapter())]
    pub fn remove_adapter(origin: OriginFor<T>, name: AdapterNameOf<T>) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      let adapter = AdapterRegistry::<T>::take(&name).ok_or(Error::<T>::UnknownAdapter)?;
      AdapterNames::<T>::mutate(|names| names.retain(|registered| registered != &name));
      Self::deposit_event(Event::AdapterRemoved { name, adapter });
      Ok(())
    }
  }

  #[pallet::view_functions]
  impl<T: Config> Pallet<T> {
    /// Nonzero positions of `account` across all registered adapters.
    pub fn get_balances(account: T::AccountId) -> Vec<AdapterBalanceOf<T>> {
      Self::do_get_balances(&account)
    }

    /// Uncompacted positions of `account` for each named adapter's supported tokens.
    pub fn get_adapter_balances(
      names: Vec<AdapterNameOf<T>>,
      account: T::AccountId,
    ) -> Result<Vec<AdapterBalanceOf<T>>, DispatchError> {
      Self::do_get_adapter_balances(&names, &account)
    }

    /// Uncompacted positions of `account` in `tokens` at one adapter.
    pub fn get_adapter_balance(
      name: AdapterNameOf<T>,
      tokens: Vec<T::AssetId>,
      account: T::AccountId,
    ) -> Result<AdapterBalanceOf<T>, DispatchError> {
      Self::do_get_adapter_balance(&name, &tokens, &account)
    }
  }

  impl<T: Config> Pallet<T> {
    /// Custody account of the router.
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn adapter_id(name: &[u8]) -> Option<T::AdapterId> {
      let name = AdapterNameOf::<T>::try_from(name.to_vec()).ok()?;
      AdapterRegistry::<T>::get(name)
    }

    pub fn adapter_names() -> Vec<AdapterNameOf<T>> {
      AdapterNames::<T>::get().into_inner()
    }

    pub(crate) fn lookup_adapter(name: &AdapterNameOf<T>) -> Result<T::AdapterId, Error<T>> {
      AdapterRegistry::<T>::get(name).ok_or(Error::<T>::UnknownAdapter)
    }

    pub fn do_add_adapter(name: AdapterNameOf<T>, adapter: T::AdapterId) -> DispatchResult {
      ensure!(!name.is_empty(), Error::<T>::EmptyAdapterName);
      ensure!(
        !AdapterRegistry::<T>::contains_key(&name),
        Error::<T>::AdapterAlreadyRegistered
      );
      AdapterNames::<T>::try_mutate(|names| {
        names
          .try_push(name.clone())
          .map_err(|_| Error::<T>::TooManyAdapters)
      })?;
      AdapterRegistry::<T>::insert(&name, adapter);
      Self::deposit_event(Event::AdapterAdded { name, adapter });
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Adapters registered in order at genesis.
    pub adapters: Vec<(Vec<u8>, T::AdapterId)>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      for (name, adapter) in &self.adapters {
        let name: AdapterNameOf<T> = name
          .clone()
          .try_into()
          .expect("Genesis adapter name exceeds MaxAdapterNameLen");
        Pallet::<T>::do_add_adapter(name, *adapter).expect("Genesis adapter registration failed");
      }
      // Custody account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
