use crate as pallet_adapter_router;
use crate::{
  Action, ActionOf, ActionType, AdapterNameOf, AmountType, AssetOps, ExecutionScope,
  ProtocolAdapters,
};
use alloc::{collections::BTreeMap, collections::BTreeSet, vec, vec::Vec};
use core::cell::RefCell;
use frame::prelude::*;
use polkadot_sdk::frame_support::traits::{
  fungible, fungibles,
  tokens::{Preservation, fungible::Inspect as _, fungibles::Inspect as _},
};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU128, Get},
};
use polkadot_sdk::frame_system::{self, EnsureRoot};
use polkadot_sdk::sp_runtime::{
  BuildStorage,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{AssetInspector, AssetKind, params};

type Block = frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;
pub type Balance = primitives::Balance;
pub type SignedBalance = primitives::SignedBalance;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
/// Never funded, so it cannot receive non-sufficient assets.
pub const NOBODY: AccountId = 7;
pub const DEX_ACCOUNT: AccountId = 100;
pub const VAULT_ACCOUNT: AccountId = 101;

pub const NATIVE: AssetKind = AssetKind::Native;
pub const X: AssetKind = AssetKind::Local(1);
pub const Y: AssetKind = AssetKind::Local(2);
/// Non-sufficient asset: transfers to accounts without a provider fail.
pub const Z: AssetKind = AssetKind::Local(3);
pub const SHARE: AssetKind = AssetKind::Local(10);

pub const INITIAL_BALANCE: Balance = 1_000_000;
pub const FAULTY_PARTIAL_SPEND: Balance = 10;

#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  MaxEncodedLen,
  serde::Serialize,
  serde::Deserialize,
)]
pub enum MockAdapter {
  /// Swaps `tokens[0]` into `tokens[1]` at 1:1 against `DEX_ACCOUNT` reserves.
  Dex,
  /// Deposits `tokens[0]` for `SHARE`, withdraws `SHARE` for `tokens[0]`.
  Vault,
  /// Spends part of custody, then reverts.
  Faulty,
  /// Forwards the action to another adapter through its scope or through
  /// `execute_action_external`; `data[0]` picks the target and the route.
  Composer,
  /// Calls back into the guarded batch entry point.
  Reentrant,
}

pub const COMPOSE_DEX: u8 = 0;
pub const COMPOSE_SELF: u8 = 1;
pub const COMPOSE_FAULTY_SWALLOWED: u8 = 2;
pub const COMPOSE_EXTERNAL_VAULT: u8 = 3;
pub const COMPOSE_EXTERNAL_SELF: u8 = 4;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    Router: pallet_adapter_router,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<Balance>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = Balance;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  type ReserveData = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = ();
}

thread_local! {
  static POSITIONS: RefCell<BTreeMap<(MockAdapter, AssetKind, AccountId), SignedBalance>> =
    const { RefCell::new(BTreeMap::new()) };
  static SUPPORTED: RefCell<BTreeMap<MockAdapter, Vec<AssetKind>>> =
    const { RefCell::new(BTreeMap::new()) };
  static FAILING_QUERIES: RefCell<BTreeSet<(MockAdapter, AssetKind)>> =
    const { RefCell::new(BTreeSet::new()) };
}

pub fn set_position(
  adapter: MockAdapter,
  token: AssetKind,
  account: AccountId,
  amount: SignedBalance,
) {
  POSITIONS.with(|p| p.borrow_mut().insert((adapter, token, account), amount));
}

pub fn set_supported(adapter: MockAdapter, tokens: &[AssetKind]) {
  SUPPORTED.with(|s| s.borrow_mut().insert(adapter, tokens.to_vec()));
}

pub fn fail_query(adapter: MockAdapter, token: AssetKind) {
  FAILING_QUERIES.with(|f| f.borrow_mut().insert((adapter, token)));
}

pub struct MockAssetOps;
impl AssetOps<AccountId, AssetKind, Balance> for MockAssetOps {
  fn transfer(
    from: &AccountId,
    to: &AccountId,
    asset: AssetKind,
    amount: Balance,
  ) -> Result<(), DispatchError> {
    match asset.fungible_id() {
      None => <Balances as fungible::Mutate<AccountId>>::transfer(
        from,
        to,
        amount,
        Preservation::Expendable,
      )
      .map(|_| ()),
      Some(id) => <Assets as fungibles::Mutate<AccountId>>::transfer(
        id,
        from,
        to,
        amount,
        Preservation::Expendable,
      )
      .map(|_| ()),
    }
  }

  fn balance(who: &AccountId, asset: AssetKind) -> Balance {
    match asset.fungible_id() {
      None => Balances::balance(who),
      Some(id) => Assets::balance(id, who),
    }
  }
}

pub fn name(raw: &str) -> AdapterNameOf<Test> {
  raw
    .as_bytes()
    .to_vec()
    .try_into()
    .expect("test adapter names fit MaxAdapterNameLen")
}

pub fn action(
  adapter: &str,
  action_type: ActionType,
  tokens: &[AssetKind],
  amounts: &[Balance],
  amount_types: &[AmountType],
  data: &[u8],
) -> ActionOf<Test> {
  Action {
    protocol_adapter_name: name(adapter),
    action_type,
    tokens: tokens.to_vec().try_into().expect("tokens fit"),
    amounts: amounts.to_vec().try_into().expect("amounts fit"),
    amount_types: amount_types.to_vec().try_into().expect("amount types fit"),
    data: data.to_vec().try_into().expect("data fits"),
  }
}

/// Absolute 1:1 swap through the mock DEX.
pub fn swap(token_in: AssetKind, token_out: AssetKind, amount: Balance) -> ActionOf<Test> {
  action(
    "dex",
    ActionType::Deposit,
    &[token_in, token_out],
    &[amount],
    &[AmountType::Absolute],
    &[],
  )
}

fn first_amount(
  scope: &ExecutionScope<Test>,
  tokens: &[AssetKind],
  amounts: &[Balance],
  amount_types: &[AmountType],
) -> Result<(AssetKind, Balance), DispatchError> {
  let token = *tokens.first().ok_or(DispatchError::Other("MissingToken"))?;
  let amount = *amounts.first().ok_or(DispatchError::Other("MissingAmount"))?;
  let amount_type = *amount_types
    .first()
    .ok_or(DispatchError::Other("MissingAmountType"))?;
  Ok((token, scope.resolve_amount(token, amount, amount_type)?))
}

fn dex_swap(
  scope: &mut ExecutionScope<Test>,
  tokens: &[AssetKind],
  amounts: &[Balance],
  amount_types: &[AmountType],
) -> Result<Vec<AssetKind>, DispatchError> {
  let (token_in, amount_in) = first_amount(scope, tokens, amounts, amount_types)?;
  let token_out = *tokens.get(1).ok_or(DispatchError::Other("MissingTokenOut"))?;
  MockAssetOps::transfer(scope.custodian(), &DEX_ACCOUNT, token_in, amount_in)?;
  MockAssetOps::transfer(&DEX_ACCOUNT, scope.custodian(), token_out, amount_in)?;
  Ok(vec![token_in, token_out])
}

fn vault_move(
  scope: &mut ExecutionScope<Test>,
  tokens: &[AssetKind],
  amounts: &[Balance],
  amount_types: &[AmountType],
  deposit: bool,
) -> Result<Vec<AssetKind>, DispatchError> {
  let underlying = *tokens.first().ok_or(DispatchError::Other("MissingToken"))?;
  let (spent, received) = if deposit {
    (underlying, SHARE)
  } else {
    (SHARE, underlying)
  };
  let amount = *amounts.first().ok_or(DispatchError::Other("MissingAmount"))?;
  let amount_type = *amount_types
    .first()
    .ok_or(DispatchError::Other("MissingAmountType"))?;
  let amount = scope.resolve_amount(spent, amount, amount_type)?;
  MockAssetOps::transfer(scope.custodian(), &VAULT_ACCOUNT, spent, amount)?;
  MockAssetOps::transfer(&VAULT_ACCOUNT, scope.custodian(), received, amount)?;
  Ok(vec![spent, received])
}

fn faulty(scope: &mut ExecutionScope<Test>, tokens: &[AssetKind]) -> Result<Vec<AssetKind>, DispatchError> {
  if let Some(token) = tokens.first() {
    MockAssetOps::transfer(scope.custodian(), &DEX_ACCOUNT, *token, FAULTY_PARTIAL_SPEND)?;
  }
  Err(DispatchError::Other("FaultyAdapterReverted"))
}

fn compose(
  scope: &mut ExecutionScope<Test>,
  tokens: &[AssetKind],
  amounts: &[Balance],
  amount_types: &[AmountType],
  data: &[u8],
) -> Result<Vec<AssetKind>, DispatchError> {
  let mode = data.first().copied().unwrap_or(COMPOSE_DEX);
  let target = match mode {
    COMPOSE_SELF | COMPOSE_EXTERNAL_SELF => "composer",
    COMPOSE_FAULTY_SWALLOWED => "faulty",
    COMPOSE_EXTERNAL_VAULT => "vault",
    _ => "dex",
  };
  let nested = action(target, ActionType::Deposit, tokens, amounts, amount_types, data);
  match mode {
    COMPOSE_FAULTY_SWALLOWED => {
      let _ = scope.execute_action(&nested);
    }
    COMPOSE_EXTERNAL_VAULT | COMPOSE_EXTERNAL_SELF => {
      Router::execute_action_external(RuntimeOrigin::signed(*scope.custodian()), nested)?;
    }
    _ => scope.execute_action(&nested)?,
  }
  Ok(vec![])
}

pub struct MockAdapters;
impl ProtocolAdapters<Test> for MockAdapters {
  fn deposit(
    adapter: MockAdapter,
    scope: &mut ExecutionScope<Test>,
    tokens: &[AssetKind],
    amounts: &[Balance],
    amount_types: &[AmountType],
    data: &[u8],
  ) -> Result<Vec<AssetKind>, DispatchError> {
    match adapter {
      MockAdapter::Dex => dex_swap(scope, tokens, amounts, amount_types),
      MockAdapter::Vault => vault_move(scope, tokens, amounts, amount_types, true),
      MockAdapter::Faulty => faulty(scope, tokens),
      MockAdapter::Composer => compose(scope, tokens, amounts, amount_types, data),
      MockAdapter::Reentrant => {
        Router::do_execute_actions(scope.custodian(), &[], &[], 0, &ALICE)?;
        Ok(vec![])
      }
    }
  }

  fn withdraw(
    adapter: MockAdapter,
    scope: &mut ExecutionScope<Test>,
    tokens: &[AssetKind],
    amounts: &[Balance],
    amount_types: &[AmountType],
    _data: &[u8],
  ) -> Result<Vec<AssetKind>, DispatchError> {
    match adapter {
      MockAdapter::Vault => vault_move(scope, tokens, amounts, amount_types, false),
      MockAdapter::Faulty => faulty(scope, tokens),
      _ => Err(DispatchError::Other("WithdrawUnsupported")),
    }
  }

  fn get_balance(
    adapter: MockAdapter,
    token: AssetKind,
    account: &AccountId,
  ) -> Result<SignedBalance, DispatchError> {
    if FAILING_QUERIES.with(|f| f.borrow().contains(&(adapter, token))) {
      return Err(DispatchError::Other("QueryFailed"));
    }
    Ok(POSITIONS.with(|p| {
      p.borrow()
        .get(&(adapter, token, *account))
        .copied()
        .unwrap_or_default()
    }))
  }

  fn supported_tokens(adapter: MockAdapter) -> Vec<AssetKind> {
    SUPPORTED.with(|s| s.borrow().get(&adapter).cloned().unwrap_or_default())
  }
}

pub struct RouterPalletId;
impl Get<PalletId> for RouterPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::PALLET_ID)
  }
}

pub struct NativeAsset;
impl Get<AssetKind> for NativeAsset {
  fn get() -> AssetKind {
    NATIVE
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;
#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId, AssetKind, Balance, MockAdapter> for MockBenchmarkHelper {
  fn adapter_id(_seed: u32) -> MockAdapter {
    MockAdapter::Vault
  }

  fn asset_id(seed: u32) -> AssetKind {
    AssetKind::Local(1_000 + seed)
  }

  fn fund(who: &AccountId, asset: AssetKind, amount: Balance) -> DispatchResult {
    match asset.fungible_id() {
      None => <Balances as fungible::Mutate<AccountId>>::mint_into(who, amount).map(|_| ()),
      Some(id) => {
        if !Assets::asset_exists(id) {
          Assets::force_create(frame_system::RawOrigin::Root.into(), id, ALICE, true, 1)?;
        }
        <Assets as fungibles::Mutate<AccountId>>::mint_into(id, who, amount).map(|_| ())
      }
    }
  }
}

impl pallet_adapter_router::Config for Test {
  type AssetId = AssetKind;
  type Balance = Balance;
  type SignedBalance = SignedBalance;
  type NativeAssetId = NativeAsset;
  type AssetOps = MockAssetOps;
  type AdapterId = MockAdapter;
  type Adapters = MockAdapters;
  type AdminOrigin = EnsureRoot<AccountId>;
  type PalletId = RouterPalletId;
  type MaxAdapters = ConstU32<{ params::MAX_ADAPTERS }>;
  type MaxAdapterNameLen = ConstU32<{ params::MAX_ADAPTER_NAME_LEN }>;
  type MaxActions = ConstU32<{ params::MAX_ACTIONS }>;
  type MaxTokensPerAction = ConstU32<{ params::MAX_TOKENS_PER_ACTION }>;
  type MaxActionDataLen = ConstU32<{ params::MAX_ACTION_DATA_LEN }>;
  type MaxOutputs = ConstU32<{ params::MAX_OUTPUTS }>;
  type MaxNestingDepth = ConstU32<{ params::MAX_NESTING_DEPTH }>;
  type MaxTouchedTokens = ConstU32<{ params::MAX_TOUCHED_TOKENS }>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub fn genesis_adapters() -> Vec<(Vec<u8>, MockAdapter)> {
  vec![
    (b"dex".to_vec(), MockAdapter::Dex),
    (b"vault".to_vec(), MockAdapter::Vault),
    (b"faulty".to_vec(), MockAdapter::Faulty),
    (b"composer".to_vec(), MockAdapter::Composer),
    (b"reentrant".to_vec(), MockAdapter::Reentrant),
  ]
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: vec![
      (ALICE, INITIAL_BALANCE),
      (BOB, INITIAL_BALANCE),
      (DEX_ACCOUNT, INITIAL_BALANCE),
      (VAULT_ACCOUNT, INITIAL_BALANCE),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: vec![
      (1, ALICE, true, 1),
      (2, ALICE, true, 1),
      (3, ALICE, false, 1),
      (10, ALICE, true, 1),
    ],
    metadata: vec![],
    accounts: vec![
      (1, DEX_ACCOUNT, INITIAL_BALANCE),
      (2, DEX_ACCOUNT, INITIAL_BALANCE),
      (3, DEX_ACCOUNT, INITIAL_BALANCE),
      (1, VAULT_ACCOUNT, INITIAL_BALANCE),
      (10, VAULT_ACCOUNT, INITIAL_BALANCE),
    ],
    reserves: vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_adapter_router::GenesisConfig::<Test> {
    adapters: genesis_adapters(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  POSITIONS.with(|p| p.borrow_mut().clear());
  SUPPORTED.with(|s| s.borrow_mut().clear());
  FAILING_QUERIES.with(|f| f.borrow_mut().clear());

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| System::set_block_number(1));
  ext
}
