//! End-to-end transaction tests for ember-evm
//!
//! Every test goes through `apply_transaction`, so gas purchase, warming,
//! nested frames and the transaction boundary are all exercised.

use bytes::Bytes;
use ember_evm::{
    apply_transaction, Account, BlockContext, EvmError, ExitStatus, GasPricing, JournaledState,
    Rules, Transaction, TransactionResult,
};
use ember_primitives::{Address, U256};
use ember_rlp::create_address;
use hex_literal::hex;

const SENDER: Address = Address::from_low_u64(0x1000);
const CONTRACT: Address = Address::from_low_u64(0xaa);
const CALLEE: Address = Address::from_low_u64(0xbb);
const BENEFICIARY: Address = Address::from_low_u64(0xee);

struct Chain {
    state: JournaledState,
    block: BlockContext,
    rules: Rules,
}

impl Chain {
    fn new() -> Self {
        let mut state = JournaledState::new();
        state.insert_account(SENDER, Account::new().with_balance(U256::from(10u64.pow(18))));
        Self {
            state,
            block: BlockContext::default(),
            rules: Rules::cancun(),
        }
    }

    fn deploy(&mut self, address: Address, code: &[u8]) {
        self.state
            .insert_account(address, Account::new().with_nonce(1).with_code(code.to_vec()));
    }

    fn send(&mut self, to: Option<Address>, data: &[u8]) -> TransactionResult {
        let tx = Transaction {
            nonce: self.state.get_nonce(&SENDER),
            gas_limit: 1_000_000,
            pricing: GasPricing::Legacy {
                gas_price: U256::one(),
            },
            to,
            data: Bytes::copy_from_slice(data),
            ..Transaction::default()
        };
        apply_transaction(&mut self.state, &self.block, &tx, SENDER, &self.rules, None).unwrap()
    }
}

fn word(result: &TransactionResult) -> U256 {
    U256::from_big_endian(&result.output)
}

// ==================== Storage Tests ====================

#[test]
fn test_sstore_sload_roundtrip() {
    let mut chain = Chain::new();
    // PUSH1 0x7b, PUSH1 1, SSTORE, PUSH1 1, SLOAD, PUSH1 0, MSTORE,
    // PUSH1 32, PUSH1 0, RETURN
    chain.deploy(CONTRACT, &hex!("607b600155600154600052602060 00f3"));

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());
    assert_eq!(result.output.len(), 32);
    assert_eq!(result.output[31], 0x7b);
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::one()), U256::from(123));
    // Cold fresh SSTORE, then a warm SLOAD of the slot it warmed
    assert_eq!(result.gas_used, 21000 + 3 + 3 + 22100 + 3 + 100 + 3 + 3 + 3 + 3 + 3);
}

#[test]
fn test_transient_storage_cleared_between_transactions() {
    let mut chain = Chain::new();
    // CALLDATASIZE, PUSH1 9, JUMPI, PUSH1 0xcc, PUSH1 1, TSTORE,
    // JUMPDEST, PUSH1 1, TLOAD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
    chain.deploy(CONTRACT, &hex!("3660095760cc60015d5b60015c60005260206000f3"));

    let first = chain.send(Some(CONTRACT), &[]);
    assert_eq!(word(&first), U256::from(0xcc));

    let second = chain.send(Some(CONTRACT), &[0x01]);
    assert!(second.is_success());
    assert_eq!(word(&second), U256::zero());
}

// ==================== Nested Frame Tests ====================

#[test]
fn test_reverted_child_leaves_no_trace() {
    let mut chain = Chain::new();
    // PUSH1 1, PUSH1 0, SSTORE, PUSH1 0, PUSH1 0, REVERT
    chain.deploy(CALLEE, &hex!("6001600055 60006000fd"));
    // CALL(GAS, 0xbb, 0, 0, 0, 0, 0), PUSH1 1, ADD, PUSH1 0, SSTORE, STOP
    chain.deploy(CONTRACT, &hex!("6000600060006000600060bb5af1 600101 600055 00"));

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());
    // CALL pushed 0
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::zero()), U256::one());
    assert_eq!(chain.state.get_state(&CALLEE, &U256::zero()), U256::zero());
}

#[test]
fn test_precompile_reached_through_call() {
    let mut chain = Chain::new();
    // CALL(GAS, 0x02, 0, 0, 0, 0, 32), POP, PUSH1 32, PUSH1 0, RETURN
    chain.deploy(CONTRACT, &hex!("6020600060006000600060025af1 50 60206000f3"));

    let result = chain.send(Some(CONTRACT), &[]);
    assert_eq!(
        result.output.as_ref(),
        hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
    );
}

#[test]
fn test_selfdestruct_in_constructor_deletes_account() {
    let mut chain = Chain::new();
    // Initcode PUSH1 0xee, SELFDESTRUCT stored at memory 29..32;
    // CREATE(0, 29, 3), PUSH1 0, SSTORE, STOP
    chain.deploy(CONTRACT, &hex!("6260eeff600052 6003601d6000f0 600055 00"));

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());

    let child = create_address(&CONTRACT, 1);
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::zero()), child.to_word());
    assert!(!chain.state.exist(&child));
    assert_eq!(chain.state.get_nonce(&CONTRACT), 2);
}

#[test]
fn test_selfdestruct_of_existing_contract_only_moves_balance() {
    let mut chain = Chain::new();
    // PUSH1 0xee, SELFDESTRUCT
    chain.state.insert_account(
        CONTRACT,
        Account::new().with_nonce(1).with_balance(U256::from(100)).with_code(vec![0x60, 0xee, 0xff]),
    );

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());
    assert!(chain.state.exist(&CONTRACT));
    assert_eq!(chain.state.get_code(&CONTRACT).as_ref(), &[0x60, 0xee, 0xff]);
    assert_eq!(chain.state.get_balance(&CONTRACT), U256::zero());
    assert_eq!(chain.state.get_balance(&BENEFICIARY), U256::from(100));
}

#[test]
fn test_selfdestruct_before_cancun_deletes_account() {
    let mut chain = Chain::new();
    chain.rules.is_cancun = false;
    chain.state.insert_account(
        CONTRACT,
        Account::new().with_nonce(1).with_balance(U256::from(100)).with_code(vec![0x60, 0xee, 0xff]),
    );

    chain.send(Some(CONTRACT), &[]);
    assert!(!chain.state.exist(&CONTRACT));
    assert_eq!(chain.state.get_balance(&BENEFICIARY), U256::from(100));
}

// ==================== Creation Tests ====================

#[test]
fn test_create_transaction_sequence() {
    let mut chain = Chain::new();
    // Returns the one-byte runtime STOP:
    // PUSH1 0, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, RETURN
    let init = hex!("6000600053 60016000f3");

    let first = chain.send(None, &init);
    let second = chain.send(None, &init);
    assert_eq!(first.created_address, Some(create_address(&SENDER, 0)));
    assert_eq!(second.created_address, Some(create_address(&SENDER, 1)));
    assert_eq!(chain.state.get_nonce(&SENDER), 2);
    assert_eq!(chain.state.get_code(&create_address(&SENDER, 1)).as_ref(), &[0x00]);
}

#[test]
fn test_create_rejects_ef_prefix() {
    let mut chain = Chain::new();
    // PUSH1 0xef, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, RETURN
    let result = chain.send(None, &hex!("60ef600053 60016000f3"));

    assert_eq!(result.status, ExitStatus::Error(EvmError::InvalidCodePrefix));
    assert_eq!(result.gas_used, 1_000_000);
    assert_eq!(result.created_address, None);
    assert!(!chain.state.exist(&create_address(&SENDER, 0)));
    assert_eq!(chain.state.get_nonce(&SENDER), 1);
}

#[test]
fn test_create2_address_from_contract() {
    let mut chain = Chain::new();
    // CREATE2(0, 0, 0, salt 7) with empty initcode, PUSH1 0, SSTORE, STOP
    chain.deploy(CONTRACT, &hex!("6007600060006000f5 600055 00"));

    chain.send(Some(CONTRACT), &[]);
    let expected = ember_rlp::create2_address(
        &CONTRACT,
        &ember_primitives::H256::from_word(U256::from(7)),
        &ember_crypto::keccak256(&[]),
    );
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::zero()), expected.to_word());
    assert!(chain.state.exist(&expected));
}

#[test]
fn test_create_collision_consumes_forwarded_gas() {
    let mut chain = Chain::new();
    // CREATE(0, 0, 0), PUSH1 1, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
    chain.deploy(CONTRACT, &hex!("600060006000f0 600101 600052 60206000f3"));
    let occupied = create_address(&CONTRACT, 1);
    chain.deploy(occupied, &hex!("00"));

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());
    // CREATE pushed zero
    assert_eq!(word(&result), U256::one());
    // Only the 64th kept back by CREATE was left for the rest of the frame
    assert!(result.gas_used > 1_000_000 - 1_000_000 / 64);
    assert_eq!(chain.state.get_nonce(&CONTRACT), 2);
    assert_eq!(chain.state.get_nonce(&occupied), 1);
    assert_eq!(chain.state.get_code(&occupied).as_ref(), &[0x00]);
}

#[test]
fn test_create_rejects_code_over_size_limit() {
    let mut chain = Chain::new();
    // PUSH2 0x6001, PUSH1 0, RETURN: 24577 zero bytes
    let result = chain.send(None, &hex!("616001 6000 f3"));

    assert_eq!(result.status, ExitStatus::Error(EvmError::MaxCodeSizeExceeded));
    assert_eq!(result.gas_used, 1_000_000);
    assert_eq!(result.created_address, None);
    assert!(!chain.state.exist(&create_address(&SENDER, 0)));
}

#[test]
fn test_create_opcode_initcode_size_limit() {
    let mut chain = Chain::new();
    // CREATE(0, 0, 0xc000) of zeroed memory, STOP
    chain.deploy(CONTRACT, &hex!("61c000 6000 6000 f0 00"));
    let at_limit = chain.send(Some(CONTRACT), &[]);
    assert!(at_limit.is_success());
    assert_eq!(chain.state.get_nonce(&CONTRACT), 2);
    assert!(chain.state.exist(&create_address(&CONTRACT, 1)));

    // One byte more aborts the calling frame
    chain.deploy(CALLEE, &hex!("61c001 6000 6000 f0 00"));
    let over = chain.send(Some(CALLEE), &[]);
    assert_eq!(over.status, ExitStatus::Error(EvmError::InitCodeSizeExceeded));
    assert_eq!(over.gas_used, 1_000_000);
    assert_eq!(chain.state.get_nonce(&CALLEE), 1);
}

// ==================== CALLCODE ====================

/// Caller holding `balance` that CALLCODEs [`CALLEE`] with `value` and
/// returns the success flag
fn callcode_chain(balance: u64, value: u8) -> Chain {
    let mut chain = Chain::new();
    // CALLCODE(GAS, CALLEE, value, 0, 0, 0, 0), PUSH1 0, MSTORE,
    // PUSH1 32, PUSH1 0, RETURN
    let mut code = hex!("6000600060006000 60").to_vec();
    code.push(value);
    code.extend_from_slice(&hex!("60bb 5a f2 600052 60206000f3"));
    chain.state.insert_account(
        CONTRACT,
        Account::new()
            .with_nonce(1)
            .with_balance(U256::from(balance))
            .with_code(code),
    );
    // PUSH1 42, PUSH1 0, SSTORE, STOP
    chain.deploy(CALLEE, &hex!("602a600055 00"));
    chain
}

#[test]
fn test_callcode_runs_callee_code_in_caller_storage() {
    let mut chain = callcode_chain(10, 5);

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());
    assert_eq!(word(&result), U256::one());
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::zero()), U256::from(42));
    assert_eq!(chain.state.get_state(&CALLEE, &U256::zero()), U256::zero());
    // The value goes from the caller to itself
    assert_eq!(chain.state.get_balance(&CONTRACT), U256::from(10));
    assert_eq!(chain.state.get_balance(&CALLEE), U256::zero());
}

#[test]
fn test_callcode_checks_caller_balance() {
    let mut chain = callcode_chain(10, 11);

    let result = chain.send(Some(CONTRACT), &[]);
    assert!(result.is_success());
    assert_eq!(word(&result), U256::zero());
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::zero()), U256::zero());
    assert_eq!(chain.state.get_balance(&CONTRACT), U256::from(10));
}

// ==================== Logs ====================

#[test]
fn test_logs_of_reverted_transaction_dropped() {
    let mut chain = Chain::new();
    // PUSH1 0, PUSH1 0, LOG0, PUSH1 0, PUSH1 0, REVERT
    chain.deploy(CONTRACT, &hex!("60006000a0 60006000fd"));

    let result = chain.send(Some(CONTRACT), &[]);
    assert_eq!(result.status, ExitStatus::Revert);
    assert!(result.logs.is_empty());
}

// ==================== Call Depth ====================

#[test]
fn test_self_call_recurses_to_depth_limit() {
    let mut chain = Chain::new();
    chain.block.gas_limit = u64::MAX;
    // PUSH1 0, SLOAD, PUSH1 1, ADD, PUSH1 0, SSTORE,
    // CALL(GAS, ADDRESS, 0, 0, 0, 0, 0), POP, STOP
    chain.deploy(
        CONTRACT,
        &hex!("600054 600101 600055 6000600060006000600030 5af1 50 00"),
    );
    let tx = Transaction {
        gas_limit: 1 << 60,
        pricing: GasPricing::Legacy {
            gas_price: U256::zero(),
        },
        to: Some(CONTRACT),
        ..Transaction::default()
    };

    let result =
        apply_transaction(&mut chain.state, &chain.block, &tx, SENDER, &chain.rules, None).unwrap();
    assert!(result.is_success());
    // Frames at depths 0..=1024 ran; the call from depth 1024 was refused
    assert_eq!(chain.state.get_state(&CONTRACT, &U256::zero()), U256::from(1025));
}

#[test]
fn test_self_call_with_block_gas_limit() {
    let mut chain = Chain::new();
    // PUSH1 0, DUP1 x4, ADDRESS, GAS, CALL, STOP
    chain.deploy(CONTRACT, &hex!("6000 80808080 30 5a f1 00"));
    let tx = Transaction {
        gas_limit: 30_000_000,
        pricing: GasPricing::Legacy {
            gas_price: U256::one(),
        },
        to: Some(CONTRACT),
        ..Transaction::default()
    };

    let result =
        apply_transaction(&mut chain.state, &chain.block, &tx, SENDER, &chain.rules, None).unwrap();
    assert_eq!(result.status, ExitStatus::Stop);
}
