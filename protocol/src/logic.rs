//! # Logic Signatures
//!
//! A logic signature authorizes a transaction with a program instead of,
//! or on behalf of, a key.
//!
//! - **Escrow**: no signature at all. The program hashes to its own address
//!   (`sha512_256("Program" ‖ program)`) and that account has no key.
//! - **Delegated**: a key or a multisig signs `"Program" ‖ program`,
//!   letting the program act for that account.
//!
//! Carrying both a signature and a multisig is never valid.

use thiserror::Error;
use tracing::{debug, warn};

use crate::address::Address;
use crate::config::PROGRAM_PREFIX;
use crate::crypto::{Account, PublicKey, Signature};
use crate::encoding::value::value_into_bytes;
use crate::encoding::{CodecError, FieldMap, Value};
use crate::multisig::{MultiSignature, MultisigAddress, MultisigError};
use crate::program::{read_program, ProgramError};
use crate::transaction::{RawTransaction, SignedTransaction};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogicSigError {
    #[error("logic signature carries both a signature and a multisig")]
    AmbiguousAuthority,

    #[error("invalid program: {0}")]
    InvalidProgram(#[from] ProgramError),

    #[error("logic signature does not authorize {0}")]
    VerificationFailed(Address),

    #[error(transparent)]
    Multisig(#[from] MultisigError),
}

/// A program, its arguments and an optional delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicSig {
    pub program: Vec<u8>,
    pub args: Vec<Vec<u8>>,
    pub sig: Option<Signature>,
    pub msig: Option<MultiSignature>,
}

impl LogicSig {
    /// Wrap a program, rejecting it if it is not structurally valid.
    pub fn new(program: Vec<u8>, args: Vec<Vec<u8>>) -> Result<Self, LogicSigError> {
        read_program(&program, &args)?;
        Ok(Self {
            program,
            args,
            sig: None,
            msig: None,
        })
    }

    /// The escrow address of the program.
    pub fn address(&self) -> Address {
        Address::for_program(&self.program)
    }

    /// `"Program" ‖ program`, the message a delegation signs.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        [PROGRAM_PREFIX, self.program.as_slice()].concat()
    }

    /// Delegate `account`'s authority to this program.
    pub fn sign(mut self, account: &Account) -> Result<Self, LogicSigError> {
        if self.msig.is_some() {
            return Err(LogicSigError::AmbiguousAuthority);
        }
        self.sig = Some(account.sign(&self.bytes_to_sign()));
        Ok(self)
    }

    /// Start a multisig delegation with one signer.
    pub fn sign_multisig(
        mut self,
        multisig: &MultisigAddress,
        account: &Account,
    ) -> Result<Self, LogicSigError> {
        if self.sig.is_some() {
            return Err(LogicSigError::AmbiguousAuthority);
        }
        self.msig = Some(multisig.sign_message(account, &self.bytes_to_sign())?);
        Ok(self)
    }

    /// Add one more signer to an existing multisig delegation.
    pub fn append_multisig(
        mut self,
        multisig: &MultisigAddress,
        account: &Account,
    ) -> Result<Self, LogicSigError> {
        let existing = self.msig.as_ref().ok_or(MultisigError::NotMultisig)?;
        let fresh = multisig.sign_message(account, &self.bytes_to_sign())?;
        self.msig = Some(existing.merged_with(&fresh)?);
        Ok(self)
    }

    /// Check that this logic signature may act for `address`.
    pub fn verify(&self, address: &Address) -> Result<(), LogicSigError> {
        read_program(&self.program, &self.args)?;
        match (&self.sig, &self.msig) {
            (Some(_), Some(_)) => Err(LogicSigError::AmbiguousAuthority),
            (None, None) if self.address() == *address => Ok(()),
            (None, None) => Err(LogicSigError::VerificationFailed(*address)),
            (Some(sig), None) => {
                if PublicKey::from(*address).verify(&self.bytes_to_sign(), sig) {
                    Ok(())
                } else {
                    Err(LogicSigError::VerificationFailed(*address))
                }
            }
            (None, Some(msig)) => Ok(msig.verify(&self.bytes_to_sign(), address)?),
        }
    }

    /// Wrap `tx` with this logic signature.
    ///
    /// The delegation is checked against the sender now; an envelope that
    /// could never verify is refused here rather than by the network.
    pub fn sign_transaction(
        &self,
        tx: &RawTransaction,
    ) -> Result<SignedTransaction, LogicSigError> {
        if let Err(e) = self.verify(&tx.header.sender) {
            warn!(
                tx_id = %tx.id(),
                sender = %tx.header.sender,
                error = %e,
                "logic signature rejected"
            );
            return Err(e);
        }
        debug!(
            tx_id = %tx.id(),
            program_len = self.program.len(),
            "signed with logic signature"
        );
        Ok(SignedTransaction::logic(tx.clone(), self.clone(), None))
    }

    pub fn to_fields(&self) -> FieldMap {
        let args: Vec<Value> = self.args.iter().map(|a| Value::Bytes(a.clone())).collect();
        FieldMap::new()
            .with("arg", args)
            .with("l", self.program.as_slice())
            .with("msig", self.msig.as_ref().map(MultiSignature::to_fields))
            .with("sig", self.sig.map(|s| *s.as_bytes()))
    }

    /// Decode without re-validating the program; [`verify`](Self::verify)
    /// does that.
    pub fn from_fields(mut fields: FieldMap) -> Result<Self, CodecError> {
        let lsig = Self {
            program: fields.take_bytes("l")?,
            args: fields
                .take_array("arg")?
                .into_iter()
                .map(|v| value_into_bytes("arg", v))
                .collect::<Result<_, _>>()?,
            sig: fields.take_optional_fixed::<64>("sig")?.map(Signature::from_bytes),
            msig: fields
                .take_optional_map("msig")?
                .map(MultiSignature::from_fields)
                .transpose()?,
        };
        fields.finish()?;
        Ok(lsig)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
