//! Serialized Chain
//!
//! Owns every deployed contract and executes one transaction at a time.
//! Each transaction is mined in its own block and is all-or-nothing: the
//! world state is snapshotted before execution and restored on any failure.

use std::collections::BTreeMap;

use lib_tokens::{BalanceQuery, GenesisParams, GenesisToken};
use lib_types::{Address, Amount, BlockHeight, Timestamp, TxHash};
use thiserror::Error;

use crate::config::ChainConfig;
use crate::contracts::{EmissionReservoir, LockupEscrow, LockupFactory, StakingLedger};
use crate::execution::{
    ContractError, ContractResult, ExecutionContext, Revert, GAS_BASE, GAS_DEPLOY, GAS_TRANSFER,
};
use crate::receipts::{TransactionReceipt, TransactionStatus};

/// Successful transaction output together with its receipt
#[derive(Debug, Clone, PartialEq)]
pub struct Executed<T> {
    pub output: T,
    pub receipt: TransactionReceipt,
}

/// Failed transaction. State was rolled back; the receipt records the charge.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct TxFailure {
    pub error: ContractError,
    pub receipt: TransactionReceipt,
}

pub type TxResult<T> = Result<Executed<T>, TxFailure>;

/// Balance source for an address with no token deployed behind it
struct NoContract;

impl BalanceQuery for NoContract {
    fn balance_of(&self, _holder: &Address) -> Amount {
        0
    }
}

// ============================================================================
// WORLD STATE
// ============================================================================

/// All contract state, keyed by contract address
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    tokens: BTreeMap<Address, GenesisToken>,
    reservoirs: BTreeMap<Address, EmissionReservoir>,
    lockup_factories: BTreeMap<Address, LockupFactory>,
    escrows: BTreeMap<Address, LockupEscrow>,
    staking_ledgers: BTreeMap<Address, StakingLedger>,
    /// Contract creation counter for address derivation
    nonce: u64,
}

impl WorldState {
    pub fn token(&self, address: &Address) -> Option<&GenesisToken> {
        self.tokens.get(address)
    }

    pub fn reservoir(&self, address: &Address) -> Option<&EmissionReservoir> {
        self.reservoirs.get(address)
    }

    pub fn lockup_factory(&self, address: &Address) -> Option<&LockupFactory> {
        self.lockup_factories.get(address)
    }

    pub fn escrow(&self, address: &Address) -> Option<&LockupEscrow> {
        self.escrows.get(address)
    }

    pub fn staking_ledger(&self, address: &Address) -> Option<&StakingLedger> {
        self.staking_ledgers.get(address)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Derive the next contract address: `blake3("contract_addr" || deployer || nonce)`
    pub fn allocate_address(&mut self, deployer: &Address) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"contract_addr");
        hasher.update(deployer.as_bytes());
        hasher.update(&self.nonce.to_le_bytes());
        self.nonce += 1;
        Address::new(*hasher.finalize().as_bytes())
    }

    fn token_mut(&mut self, address: &Address) -> ContractResult<&mut GenesisToken> {
        self.tokens
            .get_mut(address)
            .ok_or_else(|| Revert::UnknownContract(*address).into())
    }

    fn escrow_ref(&self, address: &Address) -> ContractResult<&LockupEscrow> {
        self.escrows
            .get(address)
            .ok_or_else(|| Revert::UnknownContract(*address).into())
    }

    // ------------------------------------------------------------------------
    // Deployment
    // ------------------------------------------------------------------------

    fn deploy_reservoir(&mut self, ctx: &mut ExecutionContext, supply: Amount) -> ContractResult<Address> {
        ctx.consume_gas(GAS_DEPLOY)?;
        let address = self.allocate_address(&ctx.caller);
        let reservoir = EmissionReservoir::with_supply(address, ctx.caller, supply);
        tracing::info!(
            "Deployed emission reservoir {} (owner {}, cap {})",
            address,
            ctx.caller,
            reservoir.supply_cap()
        );
        self.reservoirs.insert(address, reservoir);
        Ok(address)
    }

    fn deploy_lockup_factory(&mut self, ctx: &mut ExecutionContext) -> ContractResult<Address> {
        ctx.consume_gas(GAS_DEPLOY)?;
        let address = self.allocate_address(&ctx.caller);
        self.lockup_factories
            .insert(address, LockupFactory::new(address, ctx.caller, ctx.timestamp));
        tracing::info!(
            "Deployed lockup factory {} (deployer {}, at {})",
            address,
            ctx.caller,
            ctx.timestamp
        );
        Ok(address)
    }

    fn deploy_staking_ledger(&mut self, ctx: &mut ExecutionContext) -> ContractResult<Address> {
        ctx.consume_gas(GAS_DEPLOY)?;
        let address = self.allocate_address(&ctx.caller);
        self.staking_ledgers
            .insert(address, StakingLedger::new(address, ctx.caller));
        tracing::info!("Deployed staking ledger {} (owner {})", address, ctx.caller);
        Ok(address)
    }

    fn deploy_token(
        &mut self,
        ctx: &mut ExecutionContext,
        params: GenesisParams,
        reservoir: Address,
        lockup_factory: Address,
    ) -> ContractResult<Address> {
        ctx.consume_gas(GAS_DEPLOY)?;
        let address = self.allocate_address(&ctx.caller);
        let token = GenesisToken::new(address, params, ctx.caller, reservoir, lockup_factory)?;
        tracing::info!("Deployed {} token {}", token.symbol(), address);
        self.tokens.insert(address, token);
        Ok(address)
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    fn token_transfer(
        &mut self,
        ctx: &mut ExecutionContext,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> ContractResult<()> {
        ctx.consume_gas(GAS_TRANSFER)?;
        let caller = ctx.caller;
        self.token_mut(&token)?.transfer(&caller, &to, amount)?;
        Ok(())
    }

    fn reservoir_set_addresses(
        &mut self,
        ctx: &mut ExecutionContext,
        reservoir: Address,
        token: Address,
        fee_recipient: Address,
    ) -> ContractResult<()> {
        let contract = self
            .reservoirs
            .get_mut(&reservoir)
            .ok_or(Revert::UnknownContract(reservoir))?;
        let query: &dyn BalanceQuery = match self.tokens.get(&token) {
            Some(deployed) => deployed,
            None => &NoContract,
        };
        contract.set_addresses(ctx, token, fee_recipient, query)
    }

    fn reservoir_send(
        &mut self,
        ctx: &mut ExecutionContext,
        reservoir: Address,
        to: Address,
        amount: Amount,
    ) -> ContractResult<()> {
        let contract = self
            .reservoirs
            .get_mut(&reservoir)
            .ok_or(Revert::UnknownContract(reservoir))?;
        let token_address = contract.token().ok_or(Revert::NotConfigured)?;
        let token = self
            .tokens
            .get_mut(&token_address)
            .ok_or(Revert::UnknownContract(token_address))?;
        contract.send_to(ctx, to, amount, token)
    }

    fn factory_set_token(
        &mut self,
        ctx: &mut ExecutionContext,
        factory: Address,
        token: Address,
    ) -> ContractResult<()> {
        self.lockup_factories
            .get_mut(&factory)
            .ok_or(Revert::UnknownContract(factory))?
            .set_token_address(ctx, token)
    }

    fn factory_create_escrow(
        &mut self,
        ctx: &mut ExecutionContext,
        factory: Address,
        beneficiary: Address,
        amount: Amount,
        release_time: Timestamp,
    ) -> ContractResult<Address> {
        let escrow_address = self.allocate_address(&factory);
        let contract = self
            .lockup_factories
            .get(&factory)
            .ok_or(Revert::UnknownContract(factory))?;
        let token_address = contract.token().ok_or(Revert::NotConfigured)?;
        let token = self
            .tokens
            .get_mut(&token_address)
            .ok_or(Revert::UnknownContract(token_address))?;
        let escrow = contract.create_escrow(ctx, escrow_address, beneficiary, amount, release_time, token)?;
        self.escrows.insert(escrow_address, escrow);
        Ok(escrow_address)
    }

    fn escrow_withdraw(&mut self, ctx: &mut ExecutionContext, escrow: Address) -> ContractResult<Amount> {
        let contract = self.escrow_ref(&escrow)?.clone();
        let token = self.token_mut(&contract.token())?;
        contract.withdraw(ctx, token)
    }

    fn staking_set_addresses(
        &mut self,
        ctx: &mut ExecutionContext,
        ledger: Address,
        token: Address,
        fee_source: Address,
    ) -> ContractResult<()> {
        self.staking_ledgers
            .get_mut(&ledger)
            .ok_or(Revert::UnknownContract(ledger))?
            .set_addresses(ctx, token, fee_source)
    }

    /// Split borrow of a wired staking ledger and its token
    fn staking_with_token(
        &mut self,
        ledger: &Address,
    ) -> ContractResult<(&mut StakingLedger, &mut GenesisToken)> {
        let contract = self
            .staking_ledgers
            .get_mut(ledger)
            .ok_or(Revert::UnknownContract(*ledger))?;
        let token_address = contract.token().ok_or(Revert::NotConfigured)?;
        let token = self
            .tokens
            .get_mut(&token_address)
            .ok_or(Revert::UnknownContract(token_address))?;
        Ok((contract, token))
    }

    fn staking_ledger_mut(&mut self, ledger: &Address) -> ContractResult<&mut StakingLedger> {
        self.staking_ledgers
            .get_mut(ledger)
            .ok_or_else(|| Revert::UnknownContract(*ledger).into())
    }
}

// ============================================================================
// CHAIN
// ============================================================================

/// Single-threaded chain executing one transaction per block
#[derive(Debug, Clone)]
pub struct Chain {
    config: ChainConfig,
    state: WorldState,
    block_number: BlockHeight,
    timestamp: Timestamp,
    receipts: Vec<TransactionReceipt>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl Chain {
    /// Start a chain at block 0, `genesis_timestamp`
    pub fn new(config: ChainConfig) -> Self {
        Self {
            timestamp: config.genesis_timestamp,
            config,
            state: WorldState::default(),
            block_number: 0,
            receipts: Vec::new(),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn block_number(&self) -> BlockHeight {
        self.block_number
    }

    /// Timestamp of the latest block
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn receipts(&self) -> &[TransactionReceipt] {
        &self.receipts
    }

    pub fn receipt(&self, tx_hash: &TxHash) -> Option<&TransactionReceipt> {
        self.receipts.iter().find(|r| r.tx_hash == *tx_hash)
    }

    /// Move the clock forward without mining a transaction
    pub fn advance_time(&mut self, secs: u64) {
        self.timestamp = self.timestamp.saturating_add(secs);
    }

    /// Mine one block holding a single transaction from `caller`.
    ///
    /// On failure the world state is restored to its pre-transaction
    /// snapshot. A revert is charged the gas used so far; a halt is charged
    /// the full gas limit.
    pub fn transact<T, F>(&mut self, caller: Address, op: F) -> TxResult<T>
    where
        F: FnOnce(&mut WorldState, &mut ExecutionContext) -> ContractResult<T>,
    {
        self.block_number += 1;
        self.timestamp = self.timestamp.saturating_add(self.config.block_interval_secs);

        let tx_hash = self.tx_hash(&caller);
        let mut ctx = ExecutionContext::new(
            caller,
            self.block_number,
            self.timestamp,
            self.config.gas_limit,
            tx_hash,
        );

        let snapshot = self.state.clone();
        let result = ctx
            .consume_gas(GAS_BASE)
            .and_then(|_| op(&mut self.state, &mut ctx));

        let status = match &result {
            Ok(_) => TransactionStatus::Success,
            Err(err) => {
                self.state = snapshot;
                match err {
                    ContractError::Reverted(reason) => {
                        tracing::warn!("Tx {} from {} reverted: {}", tx_hash, caller, reason);
                        TransactionStatus::Reverted
                    }
                    ContractError::Halted(trap) => {
                        ctx.exhaust_gas();
                        tracing::error!("Tx {} from {} halted: {:?}", tx_hash, caller, trap);
                        TransactionStatus::Halted
                    }
                }
            }
        };

        let receipt = TransactionReceipt {
            tx_hash,
            block_number: self.block_number,
            timestamp: self.timestamp,
            caller,
            status,
            gas_used: ctx.gas_used,
            gas_limit: ctx.gas_limit,
        };
        self.receipts.push(receipt.clone());

        match result {
            Ok(output) => Ok(Executed { output, receipt }),
            Err(error) => Err(TxFailure { error, receipt }),
        }
    }

    fn tx_hash(&self, caller: &Address) -> TxHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tx");
        hasher.update(caller.as_bytes());
        hasher.update(&self.block_number.to_le_bytes());
        hasher.update(&(self.receipts.len() as u64).to_le_bytes());
        TxHash::new(*hasher.finalize().as_bytes())
    }

    // ========================================================================
    // DEPLOYMENT
    // ========================================================================

    /// Deploy an unwired reservoir whose cap is a third of `supply`
    pub fn deploy_reservoir(&mut self, deployer: Address, supply: Amount) -> TxResult<Address> {
        self.transact(deployer, |state, ctx| state.deploy_reservoir(ctx, supply))
    }

    pub fn deploy_lockup_factory(&mut self, deployer: Address) -> TxResult<Address> {
        self.transact(deployer, |state, ctx| state.deploy_lockup_factory(ctx))
    }

    pub fn deploy_staking_ledger(&mut self, deployer: Address) -> TxResult<Address> {
        self.transact(deployer, |state, ctx| state.deploy_staking_ledger(ctx))
    }

    /// Deploy the token, minting its supply to `deployer` and `reservoir`
    pub fn deploy_token(
        &mut self,
        deployer: Address,
        params: GenesisParams,
        reservoir: Address,
        lockup_factory: Address,
    ) -> TxResult<Address> {
        self.transact(deployer, |state, ctx| {
            state.deploy_token(ctx, params, reservoir, lockup_factory)
        })
    }

    // ========================================================================
    // CONTRACT CALLS
    // ========================================================================

    pub fn token_transfer(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> TxResult<()> {
        self.transact(caller, |state, ctx| state.token_transfer(ctx, token, to, amount))
    }

    pub fn reservoir_set_addresses(
        &mut self,
        caller: Address,
        reservoir: Address,
        token: Address,
        fee_recipient: Address,
    ) -> TxResult<()> {
        self.transact(caller, |state, ctx| {
            state.reservoir_set_addresses(ctx, reservoir, token, fee_recipient)
        })
    }

    pub fn reservoir_send(
        &mut self,
        caller: Address,
        reservoir: Address,
        to: Address,
        amount: Amount,
    ) -> TxResult<()> {
        self.transact(caller, |state, ctx| state.reservoir_send(ctx, reservoir, to, amount))
    }

    pub fn factory_set_token(&mut self, caller: Address, factory: Address, token: Address) -> TxResult<()> {
        self.transact(caller, |state, ctx| state.factory_set_token(ctx, factory, token))
    }

    /// Create an escrow funded by `caller`; returns the escrow's address
    pub fn factory_create_escrow(
        &mut self,
        caller: Address,
        factory: Address,
        beneficiary: Address,
        amount: Amount,
        release_time: Timestamp,
    ) -> TxResult<Address> {
        self.transact(caller, |state, ctx| {
            state.factory_create_escrow(ctx, factory, beneficiary, amount, release_time)
        })
    }

    pub fn escrow_withdraw(&mut self, caller: Address, escrow: Address) -> TxResult<Amount> {
        self.transact(caller, |state, ctx| state.escrow_withdraw(ctx, escrow))
    }

    pub fn staking_set_addresses(
        &mut self,
        caller: Address,
        ledger: Address,
        token: Address,
        fee_source: Address,
    ) -> TxResult<()> {
        self.transact(caller, |state, ctx| {
            state.staking_set_addresses(ctx, ledger, token, fee_source)
        })
    }

    pub fn staking_stake(&mut self, caller: Address, ledger: Address, amount: Amount) -> TxResult<()> {
        self.transact(caller, |state, ctx| {
            let (contract, token) = state.staking_with_token(&ledger)?;
            contract.stake(ctx, amount, token)
        })
    }

    pub fn staking_unstake(&mut self, caller: Address, ledger: Address, amount: Amount) -> TxResult<Amount> {
        self.transact(caller, |state, ctx| {
            let (contract, token) = state.staking_with_token(&ledger)?;
            contract.unstake(ctx, amount, token)
        })
    }

    pub fn staking_record_fee(&mut self, caller: Address, ledger: Address, amount: Amount) -> TxResult<()> {
        self.transact(caller, |state, ctx| {
            state.staking_ledger_mut(&ledger)?.record_fee(ctx, amount)
        })
    }

    pub fn staking_claim_revenue(&mut self, caller: Address, ledger: Address) -> TxResult<Amount> {
        self.transact(caller, |state, ctx| {
            state.staking_ledger_mut(&ledger)?.claim_revenue(ctx)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Trap;
    use lib_tokens::GENESIS_SUPPLY;

    fn addr(id: u8) -> Address {
        Address::new([id; 32])
    }

    #[test]
    fn test_each_transaction_mines_a_block() {
        let mut chain = Chain::default();
        let genesis = chain.timestamp();

        let deployed = chain.deploy_lockup_factory(addr(1)).unwrap();

        assert_eq!(deployed.receipt.block_number, 1);
        assert_eq!(deployed.receipt.timestamp, genesis + 13);
        assert_eq!(chain.block_number(), 1);
        assert_eq!(
            chain.state().lockup_factory(&deployed.output).unwrap().deployment_time(),
            genesis + 13
        );
    }

    #[test]
    fn test_addresses_are_deterministic_and_distinct() {
        let mut a = Chain::default();
        let mut b = Chain::default();

        let first = a.deploy_staking_ledger(addr(1)).unwrap().output;
        let second = a.deploy_staking_ledger(addr(1)).unwrap().output;

        assert_ne!(first, second);
        assert_eq!(b.deploy_staking_ledger(addr(1)).unwrap().output, first);
    }

    #[test]
    fn test_revert_rolls_back_and_charges_partial_gas() {
        let mut chain = Chain::default();
        let reservoir = chain.deploy_reservoir(addr(1), GENESIS_SUPPLY).unwrap().output;
        let factory = chain.deploy_lockup_factory(addr(1)).unwrap().output;
        let token = chain
            .deploy_token(addr(1), GenesisParams::default(), reservoir, factory)
            .unwrap()
            .output;
        let nonce = chain.state().nonce();

        let failure = chain
            .transact(addr(1), |state, ctx| {
                state.allocate_address(&ctx.caller);
                state.token_transfer(ctx, token, addr(7), GENESIS_SUPPLY)
            })
            .unwrap_err();

        assert_eq!(failure.receipt.status, TransactionStatus::Reverted);
        assert!(failure.receipt.gas_used < failure.receipt.gas_limit);
        assert_eq!(chain.state().nonce(), nonce);
        assert_eq!(chain.state().token(&token).unwrap().balance_of(&addr(7)), 0);
    }

    #[test]
    fn test_halt_charges_full_gas_and_hides_reason() {
        let mut chain = Chain::default();
        let reservoir = chain.deploy_reservoir(addr(1), GENESIS_SUPPLY).unwrap().output;

        // No token is deployed at addr(9), so the reservoir reads a zero balance
        let failure = chain
            .reservoir_set_addresses(addr(1), reservoir, addr(9), addr(5))
            .unwrap_err();

        assert_eq!(failure.error, ContractError::Halted(Trap::ReservoirUnderfunded));
        assert_eq!(failure.to_string(), "execution halted");
        assert_eq!(failure.receipt.status, TransactionStatus::Halted);
        assert_eq!(failure.receipt.gas_used, chain.config().gas_limit);
        assert_eq!(chain.receipts().len(), 2);
    }

    #[test]
    fn test_unknown_contract_reverts() {
        let mut chain = Chain::default();

        let failure = chain.staking_stake(addr(1), addr(4), 10).unwrap_err();

        assert_eq!(failure.error, ContractError::Reverted(Revert::UnknownContract(addr(4))));
    }

    #[test]
    fn test_out_of_gas_halts() {
        let mut chain = Chain::new(ChainConfig {
            gas_limit: GAS_BASE + 1,
            ..ChainConfig::default()
        });

        let failure = chain.deploy_staking_ledger(addr(1)).unwrap_err();

        assert_eq!(failure.error, ContractError::Halted(Trap::OutOfGas));
        assert!(chain.state().staking_ledger(&addr(1)).is_none());
        assert_eq!(chain.state().nonce(), 0);
    }

    #[test]
    fn test_receipt_lookup() {
        let mut chain = Chain::default();
        let executed = chain.deploy_staking_ledger(addr(1)).unwrap();

        let receipt = chain.receipt(&executed.receipt.tx_hash).unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.caller, addr(1));
    }
}
