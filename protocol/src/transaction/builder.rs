//! Transaction construction via the builder pattern.
//!
//! [`TransactionBuilder`] is generic over the body it is drafting, so
//! variant-specific setters only exist where they make sense: you cannot
//! set a close-remainder address on an asset freeze. Header setters are
//! shared by all drafts.
//!
//! Nothing is observable until [`TransactionBuilder::build`] succeeds. It
//! checks required fields, validates the body and resolves the fee:
//!
//! | flat fee | per-byte rate | result |
//! |---|---|---|
//! | set | set | [`BuildError::FeeConflict`] |
//! | `f` | – | `max(f, MIN_TX_FEE)` |
//! | – | `r` | `max(r × estimated size, MIN_TX_FEE)` |
//! | – | – | `MIN_TX_FEE` |
//!
//! The builder does not sign. That happens in [`super::signing`].

use thiserror::Error;
use tracing::debug;

use super::header::{Header, SuggestedParams};
use super::raw::{
    ApplicationCall, AssetConfig, AssetFreeze, AssetTransfer, KeyRegistration, Payment,
    RawTransaction, TxBody,
};
use super::types::{AssetParams, OnCompletion, StateSchema};
use crate::address::Address;
use crate::config::{
    DEFAULT_VALIDITY_WINDOW, DIGEST_LENGTH, MAX_ASSET_DECIMALS, MAX_ASSET_NAME_LENGTH,
    MAX_ASSET_URL_LENGTH, MAX_EXTRA_PROGRAM_PAGES, MAX_NOTE_LENGTH, MAX_UNIT_NAME_LENGTH,
    MIN_TX_FEE, STATE_PROOF_KEY_LENGTH,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a builder refused to produce a transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("both a flat fee and a per-byte fee were supplied")]
    FeeConflict,

    #[error("required field `{0}` was not set")]
    MissingField(&'static str),

    #[error("last valid round {last} is before first valid round {first}")]
    InvalidValidityWindow { first: u64, last: u64 },

    #[error("note is {0} bytes, the limit is 1000")]
    NoteTooLong(usize),

    #[error("invalid asset parameters: {0}")]
    InvalidAssetParams(String),

    #[error("asset {0} address is empty; an empty address permanently clears the role")]
    EmptyAssetAddress(&'static str),

    #[error("invalid application call: {0}")]
    InvalidApplicationCall(String),

    #[error("invalid key registration: {0}")]
    InvalidKeyRegistration(String),
}

// ---------------------------------------------------------------------------
// Body drafts
// ---------------------------------------------------------------------------

/// A body under construction. Turning it into a [`TxBody`] is where
/// per-variant validation happens.
pub trait BodyDraft {
    fn finish(self) -> Result<TxBody, BuildError>;
}

impl BodyDraft for Payment {
    fn finish(self) -> Result<TxBody, BuildError> {
        Ok(TxBody::Payment(self))
    }
}

impl BodyDraft for KeyRegistration {
    fn finish(self) -> Result<TxBody, BuildError> {
        if self.vote_pk.is_some() && self.vote_first > self.vote_last {
            return Err(BuildError::InvalidKeyRegistration(format!(
                "vote_first {} is after vote_last {}",
                self.vote_first, self.vote_last
            )));
        }
        if self.non_participation && (self.vote_pk.is_some() || self.selection_pk.is_some()) {
            return Err(BuildError::InvalidKeyRegistration(
                "non-participating registration cannot carry keys".into(),
            ));
        }
        Ok(TxBody::KeyRegistration(self))
    }
}

/// Draft for the three asset configuration shapes.
#[derive(Debug, Clone)]
pub struct AssetConfigDraft {
    asset_id: u64,
    params: Option<AssetParams>,
    strict_empty_address_check: bool,
}

impl BodyDraft for AssetConfigDraft {
    fn finish(self) -> Result<TxBody, BuildError> {
        if let Some(params) = &self.params {
            // An empty `apar` is omitted on the wire, which reads back as a
            // destroy (or as nothing at all on create).
            if params.to_fields().is_empty() {
                let reason = if self.asset_id == 0 {
                    "an asset cannot be created from empty parameters"
                } else {
                    "clearing every role is a destroy; use asset_destroy"
                };
                return Err(BuildError::InvalidAssetParams(reason.into()));
            }
            if self.asset_id == 0 {
                validate_new_asset(params)?;
            } else if self.strict_empty_address_check {
                for (role, addr) in [
                    ("manager", params.manager),
                    ("reserve", params.reserve),
                    ("freeze", params.freeze),
                    ("clawback", params.clawback),
                ] {
                    if addr.is_zero() {
                        return Err(BuildError::EmptyAssetAddress(role));
                    }
                }
            }
        } else if self.asset_id == 0 {
            return Err(BuildError::MissingField("asset_id"));
        }
        Ok(TxBody::AssetConfig(AssetConfig {
            asset_id: self.asset_id,
            params: self.params,
        }))
    }
}

fn validate_new_asset(params: &AssetParams) -> Result<(), BuildError> {
    if params.decimals > MAX_ASSET_DECIMALS {
        return Err(BuildError::InvalidAssetParams(format!(
            "decimals {} exceeds {}",
            params.decimals, MAX_ASSET_DECIMALS
        )));
    }
    if params.metadata_hash == Some([0u8; 32]) {
        return Err(BuildError::InvalidAssetParams(
            "metadata hash is all zero; leave it unset instead".into(),
        ));
    }
    for (what, value, limit) in [
        ("unit name", &params.unit_name, MAX_UNIT_NAME_LENGTH),
        ("asset name", &params.asset_name, MAX_ASSET_NAME_LENGTH),
        ("url", &params.url, MAX_ASSET_URL_LENGTH),
    ] {
        if value.len() > limit {
            return Err(BuildError::InvalidAssetParams(format!(
                "{what} is {} bytes, limit {limit}",
                value.len()
            )));
        }
    }
    Ok(())
}

impl BodyDraft for AssetTransfer {
    fn finish(self) -> Result<TxBody, BuildError> {
        if self.asset_id == 0 {
            return Err(BuildError::MissingField("asset_id"));
        }
        Ok(TxBody::AssetTransfer(self))
    }
}

impl BodyDraft for AssetFreeze {
    fn finish(self) -> Result<TxBody, BuildError> {
        if self.asset_id == 0 {
            return Err(BuildError::MissingField("asset_id"));
        }
        Ok(TxBody::AssetFreeze(self))
    }
}

impl BodyDraft for ApplicationCall {
    fn finish(self) -> Result<TxBody, BuildError> {
        let creating = self.app_id == 0;
        let updating = self.on_complete == OnCompletion::UpdateApplication;
        if creating || updating {
            if self.approval_program.is_empty() || self.clear_program.is_empty() {
                return Err(BuildError::InvalidApplicationCall(
                    "approval and clear programs are required".into(),
                ));
            }
        } else if !self.approval_program.is_empty() || !self.clear_program.is_empty() {
            return Err(BuildError::InvalidApplicationCall(
                "programs may only be set on create or update".into(),
            ));
        }
        if !creating
            && (self.extra_pages != 0
                || self.global_schema != StateSchema::default()
                || self.local_schema != StateSchema::default())
        {
            return Err(BuildError::InvalidApplicationCall(
                "schemas and extra pages are fixed at creation".into(),
            ));
        }
        if self.extra_pages > MAX_EXTRA_PROGRAM_PAGES {
            return Err(BuildError::InvalidApplicationCall(format!(
                "extra pages {} exceeds {}",
                self.extra_pages, MAX_EXTRA_PROGRAM_PAGES
            )));
        }
        Ok(TxBody::ApplicationCall(self))
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`RawTransaction`]s.
///
/// # Usage
///
/// ```
/// use ledger_protocol::address::Address;
/// use ledger_protocol::transaction::TransactionBuilder;
///
/// let sender = Address::new([1u8; 32]);
/// let receiver = Address::new([2u8; 32]);
/// let tx = TransactionBuilder::payment(receiver, 50_000)
///     .sender(sender)
///     .flat_fee(2_000)
///     .first_valid(1_000)
///     .genesis_hash([7u8; 32])
///     .note(b"rent".to_vec())
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.header.fee, 2_000);
/// assert_eq!(tx.header.last_valid, 2_000);
/// ```
#[derive(Debug, Clone)]
#[must_use = "a builder does nothing until `build` is called"]
pub struct TransactionBuilder<B> {
    sender: Option<Address>,
    flat_fee: Option<u64>,
    fee_per_byte: Option<u64>,
    first_valid: Option<u64>,
    last_valid: Option<u64>,
    genesis_id: String,
    genesis_hash: Option<[u8; DIGEST_LENGTH]>,
    note: Vec<u8>,
    lease: Option<[u8; DIGEST_LENGTH]>,
    rekey_to: Option<Address>,
    body: B,
}

impl<B: BodyDraft> TransactionBuilder<B> {
    fn with_body(body: B) -> Self {
        Self {
            sender: None,
            flat_fee: None,
            fee_per_byte: None,
            first_valid: None,
            last_valid: None,
            genesis_id: String::new(),
            genesis_hash: None,
            note: Vec::new(),
            lease: None,
            rekey_to: None,
            body,
        }
    }

    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Use exactly this fee, raised to the network minimum if lower.
    pub fn flat_fee(mut self, fee: u64) -> Self {
        self.flat_fee = Some(fee);
        self
    }

    /// Pay `rate` microunits per byte of the signed transaction.
    pub fn fee_per_byte(mut self, rate: u64) -> Self {
        self.fee_per_byte = Some(rate);
        self
    }

    pub fn first_valid(mut self, round: u64) -> Self {
        self.first_valid = Some(round);
        self
    }

    /// Defaults to `first_valid + 1000`.
    pub fn last_valid(mut self, round: u64) -> Self {
        self.last_valid = Some(round);
        self
    }

    pub fn genesis_id(mut self, genesis_id: impl Into<String>) -> Self {
        self.genesis_id = genesis_id.into();
        self
    }

    pub fn genesis_hash(mut self, genesis_hash: [u8; DIGEST_LENGTH]) -> Self {
        self.genesis_hash = Some(genesis_hash);
        self
    }

    pub fn note(mut self, note: Vec<u8>) -> Self {
        self.note = note;
        self
    }

    pub fn lease(mut self, lease: [u8; DIGEST_LENGTH]) -> Self {
        self.lease = Some(lease);
        self
    }

    pub fn rekey_to(mut self, address: Address) -> Self {
        self.rekey_to = Some(address);
        self
    }

    /// Take fee, validity window and genesis from a node's suggestion.
    ///
    /// Replaces any fee set earlier, so a suggestion never conflicts with
    /// itself.
    pub fn suggested_params(mut self, params: &SuggestedParams) -> Self {
        if params.flat_fee {
            self.flat_fee = Some(params.fee);
            self.fee_per_byte = None;
        } else {
            self.fee_per_byte = Some(params.fee);
            self.flat_fee = None;
        }
        self.first_valid = Some(params.first_valid);
        self.last_valid = Some(params.last_valid);
        self.genesis_id = params.genesis_id.clone();
        self.genesis_hash = Some(params.genesis_hash);
        self
    }

    /// Validate and produce the transaction.
    pub fn build(self) -> Result<RawTransaction, BuildError> {
        let sender = self.sender.ok_or(BuildError::MissingField("sender"))?;
        let first_valid = self
            .first_valid
            .ok_or(BuildError::MissingField("first_valid"))?;
        let last_valid = self
            .last_valid
            .unwrap_or_else(|| first_valid.saturating_add(DEFAULT_VALIDITY_WINDOW));
        if last_valid < first_valid {
            return Err(BuildError::InvalidValidityWindow {
                first: first_valid,
                last: last_valid,
            });
        }
        let genesis_hash = self
            .genesis_hash
            .ok_or(BuildError::MissingField("genesis_hash"))?;
        if self.note.len() > MAX_NOTE_LENGTH {
            return Err(BuildError::NoteTooLong(self.note.len()));
        }

        let body = self.body.finish()?;
        let mut tx = RawTransaction::new(
            Header {
                sender,
                fee: 0,
                first_valid,
                last_valid,
                genesis_id: self.genesis_id,
                genesis_hash,
                note: self.note,
                lease: self.lease,
                group: None,
                rekey_to: self.rekey_to,
            },
            body,
        );

        tx.header.fee = match (self.flat_fee, self.fee_per_byte) {
            (Some(_), Some(_)) => return Err(BuildError::FeeConflict),
            (Some(fee), None) => fee.max(MIN_TX_FEE),
            (None, Some(rate)) => {
                // The estimate is taken with the rate in the fee field, the
                // same way the network's reference tooling measures it.
                tx.header.fee = rate;
                let size = tx.estimate_size() as u64;
                rate.saturating_mul(size).max(MIN_TX_FEE)
            }
            (None, None) => MIN_TX_FEE,
        };

        debug!(
            tx_id = %tx.id(),
            tx_type = %tx.tx_type(),
            fee = tx.header.fee,
            "built transaction"
        );
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Variant entry points
// ---------------------------------------------------------------------------

impl TransactionBuilder<Payment> {
    /// Send `amount` microunits to `receiver`.
    pub fn payment(receiver: Address, amount: u64) -> Self {
        Self::with_body(Payment {
            receiver,
            amount,
            close_remainder_to: None,
        })
    }

    /// Close the sender's account, sending everything left to `address`.
    pub fn close_remainder_to(mut self, address: Address) -> Self {
        self.body.close_remainder_to = Some(address);
        self
    }
}

impl TransactionBuilder<KeyRegistration> {
    /// Register participation keys, bringing the sender online.
    pub fn key_registration_online(
        vote_pk: [u8; 32],
        selection_pk: [u8; 32],
        vote_first: u64,
        vote_last: u64,
        vote_key_dilution: u64,
    ) -> Self {
        Self::with_body(KeyRegistration {
            vote_pk: Some(vote_pk),
            selection_pk: Some(selection_pk),
            state_proof_pk: None,
            vote_first,
            vote_last,
            vote_key_dilution,
            non_participation: false,
        })
    }

    /// Take the sender offline.
    pub fn key_registration_offline() -> Self {
        Self::with_body(KeyRegistration::default())
    }

    /// Mark the sender as permanently non-participating.
    pub fn key_registration_nonparticipating() -> Self {
        Self::with_body(KeyRegistration {
            non_participation: true,
            ..Default::default()
        })
    }

    pub fn state_proof_key(mut self, key: [u8; STATE_PROOF_KEY_LENGTH]) -> Self {
        self.body.state_proof_pk = Some(key);
        self
    }
}

impl TransactionBuilder<AssetConfigDraft> {
    /// Create a new asset owned by the sender.
    pub fn asset_create(params: AssetParams) -> Self {
        Self::with_body(AssetConfigDraft {
            asset_id: 0,
            params: Some(params),
            strict_empty_address_check: false,
        })
    }

    /// Replace the four management addresses of an existing asset.
    ///
    /// By default every address must be set: an empty one would clear that
    /// role forever. Call [`strict_empty_address_check(false)`] to clear
    /// roles on purpose.
    ///
    /// [`strict_empty_address_check(false)`]: Self::strict_empty_address_check
    pub fn asset_reconfigure(
        asset_id: u64,
        manager: Address,
        reserve: Address,
        freeze: Address,
        clawback: Address,
    ) -> Self {
        Self::with_body(AssetConfigDraft {
            asset_id,
            params: Some(AssetParams {
                manager,
                reserve,
                freeze,
                clawback,
                ..Default::default()
            }),
            strict_empty_address_check: true,
        })
    }

    /// Destroy an asset. Only possible once all units are back with the creator.
    pub fn asset_destroy(asset_id: u64) -> Self {
        Self::with_body(AssetConfigDraft {
            asset_id,
            params: None,
            strict_empty_address_check: false,
        })
    }

    pub fn strict_empty_address_check(mut self, strict: bool) -> Self {
        self.body.strict_empty_address_check = strict;
        self
    }
}

impl TransactionBuilder<AssetTransfer> {
    /// Move `amount` units of an asset to `receiver`.
    pub fn asset_transfer(asset_id: u64, receiver: Address, amount: u64) -> Self {
        Self::with_body(AssetTransfer {
            asset_id,
            amount,
            receiver,
            revocation_target: None,
            close_to: None,
        })
    }

    /// Opt `account` in to an asset: a zero transfer to itself.
    pub fn asset_opt_in(asset_id: u64, account: Address) -> Self {
        Self::asset_transfer(asset_id, account, 0).sender(account)
    }

    /// Claw `amount` units back from `target` to `receiver`. The sender
    /// must be the asset's clawback address.
    pub fn asset_revoke(asset_id: u64, target: Address, receiver: Address, amount: u64) -> Self {
        let mut builder = Self::asset_transfer(asset_id, receiver, amount);
        builder.body.revocation_target = Some(target);
        builder
    }

    /// Close out the sender's holding, sending what remains to `address`.
    pub fn close_to(mut self, address: Address) -> Self {
        self.body.close_to = Some(address);
        self
    }
}

impl TransactionBuilder<AssetFreeze> {
    pub fn asset_freeze(asset_id: u64, account: Address, frozen: bool) -> Self {
        Self::with_body(AssetFreeze {
            asset_id,
            account,
            frozen,
        })
    }
}

impl TransactionBuilder<ApplicationCall> {
    /// Create an application.
    pub fn application_create(
        approval_program: Vec<u8>,
        clear_program: Vec<u8>,
        global_schema: StateSchema,
        local_schema: StateSchema,
    ) -> Self {
        Self::with_body(ApplicationCall {
            approval_program,
            clear_program,
            global_schema,
            local_schema,
            ..Default::default()
        })
    }

    /// Replace an application's programs.
    pub fn application_update(
        app_id: u64,
        approval_program: Vec<u8>,
        clear_program: Vec<u8>,
    ) -> Self {
        Self::with_body(ApplicationCall {
            app_id,
            on_complete: OnCompletion::UpdateApplication,
            approval_program,
            clear_program,
            ..Default::default()
        })
    }

    /// Call an existing application.
    pub fn application_call(app_id: u64, on_complete: OnCompletion) -> Self {
        Self::with_body(ApplicationCall {
            app_id,
            on_complete,
            ..Default::default()
        })
    }

    /// Action taken after the call. On create this is usually `NoOp` or `OptIn`.
    pub fn on_complete(mut self, on_complete: OnCompletion) -> Self {
        self.body.on_complete = on_complete;
        self
    }

    pub fn args(mut self, args: Vec<Vec<u8>>) -> Self {
        self.body.args = args;
        self
    }

    pub fn accounts(mut self, accounts: Vec<Address>) -> Self {
        self.body.accounts = accounts;
        self
    }

    pub fn foreign_apps(mut self, app_ids: Vec<u64>) -> Self {
        self.body.foreign_apps = app_ids;
        self
    }

    pub fn foreign_assets(mut self, asset_ids: Vec<u64>) -> Self {
        self.body.foreign_assets = asset_ids;
        self
    }

    pub fn extra_pages(mut self, pages: u32) -> Self {
        self.body.extra_pages = pages;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
