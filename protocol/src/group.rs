//! # Atomic Groups
//!
//! Up to 16 transactions can be bound so that all of them are confirmed or
//! none is. The binding is a group id stamped into each transaction:
//!
//! ```text
//! group id = sha512_256("TG" ‖ msgpack({ "txlist": [raw id, …] }))
//! ```
//!
//! Raw ids are taken from the *unsigned*, ungrouped transactions, in order.
//! Because the group id is part of what gets signed, grouping must happen
//! before any member is signed.

use thiserror::Error;
use tracing::debug;

use crate::address::Address;
use crate::config::{DIGEST_LENGTH, GROUP_PREFIX, MAX_GROUP_SIZE};
use crate::crypto::hash::sha512_256_multi;
use crate::encoding::{self, base32, FieldMap, Value};
use crate::transaction::RawTransaction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("cannot group zero transactions")]
    EmptyGroup,

    #[error("group of {0} transactions exceeds the limit of 16")]
    GroupTooLarge(usize),

    #[error("transaction {index} already belongs to a group")]
    AlreadyGrouped { index: usize },
}

/// Compute the group id for `transactions`, in order, without modifying them.
///
/// Every transaction must be ungrouped. To regroup transactions that were
/// already stamped by [`assign_group_id`], set `header.group` back to `None`
/// first; otherwise this fails with [`GroupError::AlreadyGrouped`].
pub fn compute_group_id(
    transactions: &[RawTransaction],
) -> Result<[u8; DIGEST_LENGTH], GroupError> {
    if transactions.is_empty() {
        return Err(GroupError::EmptyGroup);
    }
    if transactions.len() > MAX_GROUP_SIZE {
        return Err(GroupError::GroupTooLarge(transactions.len()));
    }
    let mut txlist = Vec::with_capacity(transactions.len());
    for (index, tx) in transactions.iter().enumerate() {
        if tx.header.group.is_some() {
            return Err(GroupError::AlreadyGrouped { index });
        }
        txlist.push(Value::Bytes(tx.raw_id().to_vec()));
    }
    let encoded = encoding::encode_map(&FieldMap::new().with("txlist", txlist));
    Ok(sha512_256_multi(&[GROUP_PREFIX, &encoded]))
}

/// Stamp the group id into every transaction, or only into those sent by
/// `sender` when a filter is given. Returns copies of the stamped
/// transactions.
///
/// The id is always computed over the whole slice, so a party holding only
/// its own transactions can still stamp them consistently.
///
/// # Example
///
/// ```
/// use ledger_protocol::address::Address;
/// use ledger_protocol::group::assign_group_id;
/// use ledger_protocol::transaction::TransactionBuilder;
///
/// let alice = Address::new([1u8; 32]);
/// let bob = Address::new([2u8; 32]);
/// let pay = |from, to| {
///     TransactionBuilder::payment(to, 1_000)
///         .sender(from)
///         .first_valid(1)
///         .genesis_hash([3u8; 32])
///         .build()
///         .unwrap()
/// };
/// let mut txns = vec![pay(alice, bob), pay(bob, alice)];
/// let mine = assign_group_id(&mut txns, Some(&alice)).unwrap();
/// assert_eq!(mine.len(), 1);
/// assert!(txns[0].header.group.is_some());
/// assert!(txns[1].header.group.is_none());
/// ```
pub fn assign_group_id(
    transactions: &mut [RawTransaction],
    sender: Option<&Address>,
) -> Result<Vec<RawTransaction>, GroupError> {
    let group_id = compute_group_id(transactions)?;
    let mut stamped = Vec::new();
    for tx in transactions.iter_mut() {
        if sender.map_or(true, |s| tx.header.sender == *s) {
            tx.header.group = Some(group_id);
            stamped.push(tx.clone());
        }
    }
    debug!(
        group_id = %base32::encode(&group_id),
        size = transactions.len(),
        stamped = stamped.len(),
        "assigned group id"
    );
    Ok(stamped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Header, Payment, TxBody};

    fn payment(sender: Address, amount: u64) -> RawTransaction {
        RawTransaction::new(
            Header {
                sender,
                fee: 1000,
                first_valid: 1,
                last_valid: 1001,
                genesis_hash: [5u8; 32],
                ..Default::default()
            },
            TxBody::Payment(Payment {
                receiver: Address::new([9u8; 32]),
                amount,
                close_remainder_to: None,
            }),
        )
    }

    fn batch(n: usize) -> Vec<RawTransaction> {
        (0..n).map(|i| payment(Address::new([1u8; 32]), i as u64 + 1)).collect()
    }

    #[test]
    fn size_boundaries() {
        assert_eq!(compute_group_id(&[]), Err(GroupError::EmptyGroup));
        assert!(compute_group_id(&batch(1)).is_ok());
        assert!(compute_group_id(&batch(16)).is_ok());
        assert_eq!(compute_group_id(&batch(17)), Err(GroupError::GroupTooLarge(17)));
    }

    #[test]
    fn id_depends_on_order() {
        let txns = batch(2);
        let reversed: Vec<_> = txns.iter().rev().cloned().collect();
        assert_ne!(
            compute_group_id(&txns).unwrap(),
            compute_group_id(&reversed).unwrap()
        );
    }

    #[test]
    fn stamping_changes_ids_but_not_group_id() {
        let mut txns = batch(3);
        let before: Vec<String> = txns.iter().map(RawTransaction::id).collect();
        let gid = compute_group_id(&txns).unwrap();
        let stamped = assign_group_id(&mut txns, None).unwrap();
        assert_eq!(stamped.len(), 3);
        for (tx, old_id) in txns.iter().zip(&before) {
            assert_eq!(tx.header.group, Some(gid));
            assert_ne!(&tx.id(), old_id);
        }
    }

    #[test]
    fn already_grouped_is_refused() {
        let mut txns = batch(2);
        assign_group_id(&mut txns, None).unwrap();
        assert_eq!(
            compute_group_id(&txns),
            Err(GroupError::AlreadyGrouped { index: 0 })
        );
    }

    #[test]
    fn regrouping_after_clearing_the_group() {
        let mut txns = batch(2);
        let gid = assign_group_id(&mut txns, None).unwrap()[0].header.group;
        txns.push(payment(Address::new([3u8; 32]), 9));
        assert!(assign_group_id(&mut txns, None).is_err());

        for tx in &mut txns {
            tx.header.group = None;
        }
        let stamped = assign_group_id(&mut txns, None).unwrap();
        assert_eq!(stamped.len(), 3);
        assert_ne!(stamped[0].header.group, gid);
        assert_eq!(stamped[0].header.group, stamped[2].header.group);
    }

    #[test]
    fn sender_filter_limits_stamping() {
        let alice = Address::new([1u8; 32]);
        let bob = Address::new([2u8; 32]);
        let mut txns = vec![payment(alice, 1), payment(bob, 2), payment(alice, 3)];
        let gid = compute_group_id(&txns).unwrap();
        let mine = assign_group_id(&mut txns, Some(&alice)).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.header.group == Some(gid)));
        assert_eq!(txns[1].header.group, None);
    }

    #[test]
    fn failed_grouping_mutates_nothing() {
        let mut txns = batch(17);
        assert!(assign_group_id(&mut txns, None).is_err());
        assert!(txns.iter().all(|t| t.header.group.is_none()));
    }
}
