use crate::{
  ActionOf, ActionType, AssetOps, Config, Error, Event, ExecutionDepth, ExecutionGuard,
  ExternalTouched, LOG_TARGET, Output, OutputOf, Pallet, ProtocolAdapters, SettlementError,
  SettlementErrorOf, types::AmountType,
};
use alloc::vec::Vec;
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::storage::with_transaction,
  sp_runtime::{TransactionOutcome, traits::Zero},
};

/// Custody handle passed to adapters while an action executes.
///
/// Only the router constructs a scope, so holding one proves the caller is an adapter
/// invoked by the router for the current batch.
pub struct ExecutionScope<T: Config> {
  custodian: T::AccountId,
  depth: u32,
  touched: Vec<T::AssetId>,
}

impl<T: Config> ExecutionScope<T> {
  pub(crate) fn new(custodian: T::AccountId) -> Self {
    Self::resume(custodian, 0)
  }

  /// Scope for a runtime-call composition issued by an adapter running at `depth`.
  pub(crate) fn resume(custodian: T::AccountId, depth: u32) -> Self {
    Self {
      custodian,
      depth,
      touched: Vec::new(),
    }
  }

  /// Account whose assets the adapter moves.
  pub fn custodian(&self) -> &T::AccountId {
    &self.custodian
  }

  /// Number of adapter-initiated actions currently stacked above the top-level one.
  pub fn depth(&self) -> u32 {
    self.depth
  }

  /// Tokens recorded so far for settlement, in first-touch order.
  pub fn touched(&self) -> &[T::AssetId] {
    &self.touched
  }

  /// Current custody balance of `token`.
  pub fn held(&self, token: T::AssetId) -> T::Balance {
    T::AssetOps::balance(&self.custodian, token)
  }

  /// Resolve an action amount against the current custody balance of `token`.
  pub fn resolve_amount(
    &self,
    token: T::AssetId,
    amount: T::Balance,
    amount_type: AmountType,
  ) -> Result<T::Balance, DispatchError> {
    Pallet::<T>::absolute_amount(amount, amount_type, self.held(token))
  }

  /// Run `action` from inside an adapter, without re-acquiring the execution lock.
  ///
  /// The nested action commits or rolls back on its own; its touched tokens join
  /// the batch settlement.
  pub fn execute_action(&mut self, action: &ActionOf<T>) -> DispatchResult {
    ensure!(
      self.depth < T::MaxNestingDepth::get(),
      Error::<T>::NestingTooDeep
    );
    self.depth = self.depth.saturating_add(1);
    Pallet::<T>::publish_depth(self.depth);
    let result = with_transaction(|| match Pallet::<T>::execute_action(self, action) {
      Ok(()) => TransactionOutcome::Commit(Ok(())),
      Err(err) => TransactionOutcome::Rollback(Err(err)),
    });
    self.depth = self.depth.saturating_sub(1);
    Pallet::<T>::publish_depth(self.depth);
    result
  }

  fn record(&mut self, tokens: Vec<T::AssetId>) {
    for token in tokens {
      if !self.touched.contains(&token) {
        self.touched.push(token);
      }
    }
  }
}

impl<T: Config> Pallet<T> {
  /// Execute a batch and settle it to `beneficiary` as one storage transaction.
  ///
  /// Returns the amount paid for each required output, in request order.
  pub fn do_execute_actions(
    who: &T::AccountId,
    actions: &[ActionOf<T>],
    required_outputs: &[OutputOf<T>],
    native_payment: T::Balance,
    beneficiary: &T::AccountId,
  ) -> Result<Vec<OutputOf<T>>, DispatchError> {
    let _guard = ExecutionGuard::<T>::acquire()?;
    with_transaction(|| {
      match Self::execute_and_settle(
        who,
        actions,
        required_outputs,
        native_payment,
        beneficiary,
      ) {
        Ok(outputs) => TransactionOutcome::Commit(Ok(outputs)),
        Err(err) => TransactionOutcome::Rollback(Err(err)),
      }
    })
  }

  fn execute_and_settle(
    who: &T::AccountId,
    actions: &[ActionOf<T>],
    required_outputs: &[OutputOf<T>],
    native_payment: T::Balance,
    beneficiary: &T::AccountId,
  ) -> Result<Vec<OutputOf<T>>, DispatchError> {
    let mut scope = ExecutionScope::<T>::new(Self::account_id());

    if !native_payment.is_zero() {
      let native = T::NativeAssetId::get();
      T::AssetOps::transfer(who, scope.custodian(), native, native_payment)?;
      scope.record(Vec::from([native]));
    }

    for action in actions {
      Self::execute_action(&mut scope, action)?;
    }

    Self::settle(
      scope.custodian(),
      required_outputs,
      scope.touched(),
      beneficiary,
    )
    .map_err(|err| {
      log::warn!(target: LOG_TARGET, "settlement to {:?} failed: {:?}", beneficiary, err);
      Error::<T>::from(err).into()
    })
  }

  /// Resolve, validate and dispatch one action within `scope`.
  ///
  /// Adapter errors are returned unchanged.
  pub(crate) fn execute_action(
    scope: &mut ExecutionScope<T>,
    action: &ActionOf<T>,
  ) -> DispatchResult {
    let adapter = Self::lookup_adapter(&action.protocol_adapter_name)?;
    ensure!(
      matches!(
        action.action_type,
        ActionType::Deposit | ActionType::Withdraw
      ),
      Error::<T>::InvalidActionType
    );
    ensure!(
      action.amounts.len() == action.amount_types.len(),
      Error::<T>::ArrayLengthMismatch
    );

    log::debug!(
      target: LOG_TARGET,
      "dispatching {:?} to adapter {:?} at depth {}",
      action.action_type,
      adapter,
      scope.depth(),
    );

    let touched = if action.action_type == ActionType::Deposit {
      T::Adapters::deposit(
        adapter,
        scope,
        &action.tokens,
        &action.amounts,
        &action.amount_types,
        &action.data,
      )?
    } else {
      T::Adapters::withdraw(
        adapter,
        scope,
        &action.tokens,
        &action.amounts,
        &action.amount_types,
        &action.data,
      )?
    };
    scope.record(touched);
    scope.record(ExternalTouched::<T>::take().into_inner());

    Self::deposit_event(Event::ActionExecuted {
      action: action.clone(),
    });
    Ok(())
  }

  /// Queue tokens touched by a runtime-call composition for the running batch.
  pub(crate) fn hand_over_touched(tokens: &[T::AssetId]) -> DispatchResult {
    ExternalTouched::<T>::try_mutate(|pending| -> DispatchResult {
      for token in tokens {
        if !pending.contains(token) {
          pending
            .try_push(*token)
            .map_err(|_| Error::<T>::TooManyTouchedTokens)?;
        }
      }
      Ok(())
    })
  }

  fn publish_depth(depth: u32) {
    if depth.is_zero() {
      ExecutionDepth::<T>::kill();
    } else {
      ExecutionDepth::<T>::put(depth);
    }
  }

  /// Pay required outputs, then sweep every touched token, from `custodian` to
  /// `beneficiary`.
  ///
  /// Each required output receives the full held balance of its token. Zero balances
  /// are never transferred.
  pub fn settle(
    custodian: &T::AccountId,
    required_outputs: &[OutputOf<T>],
    touched: &[T::AssetId],
    beneficiary: &T::AccountId,
  ) -> Result<Vec<OutputOf<T>>, SettlementErrorOf<T>> {
    let mut outputs = Vec::with_capacity(required_outputs.len());
    for required in required_outputs {
      let held = T::AssetOps::balance(custodian, required.token);
      if held < required.amount {
        return Err(SettlementError::InsufficientOutput {
          token: required.token,
          required: required.amount,
          actual: held,
        });
      }
      Self::transfer_held(custodian, beneficiary, required.token, held)?;
      outputs.push(Output {
        token: required.token,
        amount: held,
      });
    }

    for token in touched {
      let held = T::AssetOps::balance(custodian, *token);
      Self::transfer_held(custodian, beneficiary, *token, held)?;
    }

    Ok(outputs)
  }

  fn transfer_held(
    custodian: &T::AccountId,
    beneficiary: &T::AccountId,
    token: T::AssetId,
    amount: T::Balance,
  ) -> Result<(), SettlementErrorOf<T>> {
    if amount.is_zero() {
      return Ok(());
    }
    T::AssetOps::transfer(custodian, beneficiary, token, amount)
      .map_err(|reason| SettlementError::TransferFailed { token, reason })
  }

  /// Absolute amount for an adapter to move, given the balance it holds.
  ///
  /// Relative amounts are parts of `RELATIVE_AMOUNT_BASE`; above 100% fails with
  /// `InvalidRelativeAmount`.
  pub fn absolute_amount(
    amount: T::Balance,
    amount_type: AmountType,
    held: T::Balance,
  ) -> Result<T::Balance, DispatchError> {
    amount_type
      .resolve(amount, held)
      .ok_or_else(|| Error::<T>::InvalidRelativeAmount.into())
  }
}
