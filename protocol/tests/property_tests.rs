//! Property-based tests for protocol invariants
//!
//! These tests use proptest to check:
//! - Canonical determinism: equal transactions encode to equal bytes
//! - Decode inverts encode for every transaction variant
//! - Zero omission: zero-valued fields never reach the wire
//! - Merge commutativity: partial multisigs merge the same in any order
//! - The bytecode reader never panics on arbitrary input

use ledger_protocol::crypto::Account;
use ledger_protocol::encoding::{decode, encode, FieldMap, Value};
use ledger_protocol::multisig::{merge, MultisigAddress};
use ledger_protocol::program::read_program;
use ledger_protocol::config::STATE_PROOF_KEY_LENGTH;
use ledger_protocol::transaction::{
    ApplicationCall, AssetConfig, AssetFreeze, AssetParams, AssetTransfer, Header,
    KeyRegistration, OnCompletion, Payment, RawTransaction, StateSchema, TxBody,
};
use ledger_protocol::Address;
use proptest::prelude::*;

/// Strategy for addresses, zero included
fn address_strategy() -> impl Strategy<Value = Address> {
    prop_oneof![
        1 => Just(Address::ZERO),
        4 => any::<[u8; 32]>().prop_map(Address::new),
    ]
}

/// Strategy for optional addresses. `Some(ZERO)` would encode as absent.
fn optional_address_strategy() -> impl Strategy<Value = Option<Address>> {
    prop::option::of(any::<[u8; 32]>().prop_map(Address::new))
}

/// Strategy for headers with every optional field sometimes set
fn header_strategy() -> impl Strategy<Value = Header> {
    (
        (address_strategy(), any::<u64>(), any::<u64>(), any::<u64>()),
        ("[a-z0-9.-]{0,16}", any::<[u8; 32]>()),
        (
            prop::collection::vec(any::<u8>(), 0..64),
            prop::option::of(nonzero_key_strategy()),
            optional_address_strategy(),
        ),
    )
        .prop_map(|(window, genesis, extras)| {
            let (sender, fee, first_valid, last_valid) = window;
            let (genesis_id, genesis_hash) = genesis;
            let (note, lease, rekey_to) = extras;
            Header {
                sender,
                fee,
                first_valid,
                last_valid,
                genesis_id,
                genesis_hash,
                note,
                lease,
                group: None,
                rekey_to,
            }
        })
}

/// 32-byte keys that never collapse to the omitted all-zero value
fn nonzero_key_strategy() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>().prop_map(|mut key| {
        key[0] |= 1;
        key
    })
}

fn key_registration_strategy() -> impl Strategy<Value = KeyRegistration> {
    prop_oneof![
        Just(KeyRegistration::default()),
        Just(KeyRegistration {
            non_participation: true,
            ..Default::default()
        }),
        (
            nonzero_key_strategy(),
            nonzero_key_strategy(),
            prop::option::of(any::<u8>().prop_map(|b| [b | 1; STATE_PROOF_KEY_LENGTH])),
            any::<u64>(),
            any::<u64>(),
            any::<u64>(),
        )
            .prop_map(|(vote, selection, state_proof, first, last, dilution)| {
                KeyRegistration {
                    vote_pk: Some(vote),
                    selection_pk: Some(selection),
                    state_proof_pk: state_proof,
                    vote_first: first,
                    vote_last: last,
                    vote_key_dilution: dilution,
                    non_participation: false,
                }
            }),
    ]
}

/// Asset parameters that always put at least the total on the wire
fn asset_params_strategy() -> impl Strategy<Value = AssetParams> {
    (
        (1u64..=u64::MAX, 0u32..=19, any::<bool>()),
        ("[A-Z]{0,8}", "[A-Za-z ]{0,32}", "[a-z:/.]{0,32}"),
        prop::option::of(nonzero_key_strategy()),
        (
            address_strategy(),
            address_strategy(),
            address_strategy(),
            address_strategy(),
        ),
    )
        .prop_map(|(supply, names, metadata_hash, roles)| {
            let (total, decimals, default_frozen) = supply;
            let (unit_name, asset_name, url) = names;
            let (manager, reserve, freeze, clawback) = roles;
            AssetParams {
                total,
                decimals,
                default_frozen,
                unit_name,
                asset_name,
                url,
                metadata_hash,
                manager,
                reserve,
                freeze,
                clawback,
            }
        })
}

/// Strategy for transaction bodies across variants
fn body_strategy() -> impl Strategy<Value = TxBody> {
    prop_oneof![
        key_registration_strategy().prop_map(TxBody::KeyRegistration),
        (1u64..=u64::MAX, prop::option::of(asset_params_strategy())).prop_map(|(asset_id, params)| {
            TxBody::AssetConfig(AssetConfig { asset_id, params })
        }),
        (address_strategy(), any::<u64>(), optional_address_strategy()).prop_map(
            |(receiver, amount, close_remainder_to)| TxBody::Payment(Payment {
                receiver,
                amount,
                close_remainder_to,
            })
        ),
        (any::<u64>(), any::<u64>(), address_strategy()).prop_map(|(asset_id, amount, receiver)| {
            TxBody::AssetTransfer(AssetTransfer {
                asset_id,
                amount,
                receiver,
                revocation_target: None,
                close_to: None,
            })
        }),
        (any::<u64>(), address_strategy(), any::<bool>()).prop_map(|(asset_id, account, frozen)| {
            TxBody::AssetFreeze(AssetFreeze {
                asset_id,
                account,
                frozen,
            })
        }),
        (
            any::<u64>(),
            0u8..=5,
            prop::collection::vec(prop::collection::vec(any::<u8>(), 0..8), 0..4),
            prop::collection::vec(any::<u64>(), 0..4),
            any::<u64>(),
            any::<u64>(),
        )
            .prop_map(|(app_id, oc, args, foreign_apps, nui, nbs)| {
                TxBody::ApplicationCall(ApplicationCall {
                    app_id,
                    on_complete: OnCompletion::from_u64(u64::from(oc)).unwrap_or_default(),
                    args,
                    foreign_apps,
                    global_schema: StateSchema::new(nui, nbs),
                    ..Default::default()
                })
            }),
    ]
}

fn tx_strategy() -> impl Strategy<Value = RawTransaction> {
    (header_strategy(), body_strategy()).prop_map(|(h, b)| RawTransaction::new(h, b))
}

fn contains_zero(value: &Value) -> bool {
    match value {
        Value::Map(map) => map
            .iter()
            .any(|(_, v)| v.is_zero() || contains_zero(v)),
        Value::Array(items) => items.iter().any(contains_zero),
        _ => false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn canonical_encoding_is_deterministic(tx in tx_strategy()) {
        let copy = tx.clone();
        prop_assert_eq!(tx.canonical_bytes(), copy.canonical_bytes());
        prop_assert_eq!(tx.id(), copy.id());
    }

    #[test]
    fn decode_inverts_encode(tx in tx_strategy()) {
        let decoded = RawTransaction::decode(&tx.canonical_bytes()).unwrap();
        prop_assert_eq!(decoded, tx);
    }

    #[test]
    fn zero_fields_never_reach_the_wire(tx in tx_strategy()) {
        let value = decode(&tx.canonical_bytes()).unwrap();
        prop_assert!(!contains_zero(&value));
    }

    #[test]
    fn map_insertion_order_does_not_matter(
        entries in prop::collection::btree_map("[a-z]{1,6}", any::<u64>(), 0..12)
    ) {
        let mut forward = FieldMap::new();
        for (k, v) in &entries {
            forward.insert(k, *v);
        }
        let mut backward = FieldMap::new();
        for (k, v) in entries.iter().rev() {
            backward.insert(k, *v);
        }
        prop_assert_eq!(
            encode(&Value::Map(forward)),
            encode(&Value::Map(backward))
        );
    }

    #[test]
    fn reader_never_panics(program in prop::collection::vec(any::<u8>(), 0..128)) {
        let _ = read_program(&program, &[]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn merge_is_commutative(
        amount in any::<u64>(),
        first in 0usize..3,
        second in 0usize..3,
    ) {
        let signers: Vec<Account> = (0..3).map(|_| Account::generate()).collect();
        let msa = MultisigAddress::new(
            1,
            2,
            signers.iter().map(Account::public_key).collect(),
        )
        .unwrap();
        let tx = RawTransaction::new(
            Header {
                sender: msa.address(),
                fee: 1000,
                first_valid: 1,
                last_valid: 1001,
                genesis_hash: [1u8; 32],
                ..Default::default()
            },
            TxBody::Payment(Payment {
                receiver: Address::new([2u8; 32]),
                amount,
                close_remainder_to: None,
            }),
        );
        let a = msa.sign_transaction(&tx, &signers[first]).unwrap();
        let b = msa.sign_transaction(&tx, &signers[second]).unwrap();
        let ab = merge(&[a.clone(), b.clone()]).unwrap();
        let ba = merge(&[b, a]).unwrap();
        prop_assert_eq!(ab, ba);
    }
}
