//! CLI walkthrough of the client-side transaction lifecycle.
//!
//! Creates accounts, builds a three-party atomic swap (a multisig treasury
//! payment, an escrow program payout and an asset transfer), signs each leg
//! under a different scheme and prints the wire bytes. Nothing is sent
//! anywhere.
//!
//! Run with:
//!   cargo run --example demo
//!   RUST_LOG=ledger_protocol=debug LOG_FORMAT=json cargo run --example demo

use std::time::Instant;

use ledger_protocol::crypto::Account;
use ledger_protocol::group::assign_group_id;
use ledger_protocol::logging::{init_logging, LogFormat};
use ledger_protocol::logic::LogicSig;
use ledger_protocol::multisig::MultisigAddress;
use ledger_protocol::program::read_program;
use ledger_protocol::transaction::{
    encode_signed_group, verify_signed_transaction, SignedTransaction, SuggestedParams,
    TransactionBuilder,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    let rule = "=".repeat(50);
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]{rule}{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn address_display(name: &str, addr: &str, color: &str) {
    let prefix = &addr[..6];
    let suffix = &addr[addr.len().saturating_sub(6)..];
    println!("  {color}{BOLD}{name:<10}{RESET} {DIM}{prefix}...{suffix}{RESET}");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let format = LogFormat::from_str_lossy(&std::env::var("LOG_FORMAT").unwrap_or_default());
    init_logging("warn", format)?;
    let start = Instant::now();

    // -----------------------------------------------------------------------
    // Step 1: Accounts
    // -----------------------------------------------------------------------

    section(1, "Accounts");
    let trustees: Vec<Account> = (0..3).map(|_| Account::generate()).collect();
    let treasury = MultisigAddress::new(1, 2, trustees.iter().map(Account::public_key).collect())?;
    let merchant = Account::generate();

    // version 2; intcblock [1]; intc_0. Approves everything: demo only.
    let escrow = LogicSig::new(vec![0x02, 0x20, 0x01, 0x01, 0x22], vec![])?;
    let program = read_program(&escrow.program, &escrow.args)?;

    address_display("Treasury", &treasury.address().to_string(), BLUE);
    address_display("Escrow", &escrow.address().to_string(), MAGENTA);
    address_display("Merchant", &merchant.address().to_string(), GREEN);
    info("Escrow int constants", &format!("{:?}", program.ints));

    // -----------------------------------------------------------------------
    // Step 2: Build the legs
    // -----------------------------------------------------------------------

    section(2, "Build");
    let params = SuggestedParams {
        fee: 1,
        flat_fee: false,
        first_valid: 20_000_000,
        last_valid: 20_001_000,
        genesis_id: "testnet-v1.0".into(),
        genesis_hash: [0x48; 32],
    };
    let mut legs = vec![
        TransactionBuilder::payment(merchant.address(), 5_000_000)
            .sender(treasury.address())
            .note(b"invoice 2291".to_vec())
            .suggested_params(&params)
            .build()?,
        TransactionBuilder::payment(merchant.address(), 250_000)
            .sender(escrow.address())
            .suggested_params(&params)
            .build()?,
        TransactionBuilder::asset_transfer(31_566_704, treasury.address(), 10)
            .sender(merchant.address())
            .suggested_params(&params)
            .build()?,
    ];
    for leg in &legs {
        info(&format!("{:<6} fee", leg.tx_type()), &leg.header.fee.to_string());
    }

    // -----------------------------------------------------------------------
    // Step 3: Group and sign
    // -----------------------------------------------------------------------

    section(3, "Group & sign");
    assign_group_id(&mut legs, None)?;
    let treasury_leg = treasury.sign_transaction(&legs[0], &trustees[0])?;
    let treasury_leg = treasury.append(&treasury_leg, &trustees[2])?;
    let signed = vec![
        treasury_leg,
        escrow.sign_transaction(&legs[1])?,
        legs[2].sign(&merchant),
    ];
    for stx in &signed {
        verify_signed_transaction(stx)?;
        success(&format!("{} verified", stx.id()));
    }

    // -----------------------------------------------------------------------
    // Step 4: Wire
    // -----------------------------------------------------------------------

    section(4, "Wire bytes");
    let wire = encode_signed_group(&signed);
    info("Group payload", &format!("{} bytes", wire.len()));
    for stx in &signed {
        let bytes = stx.encode();
        let back = SignedTransaction::decode(&bytes)?;
        assert_eq!(&back, stx);
        info(&stx.txn.tx_type().to_string(), &hex::encode(&bytes[..24.min(bytes.len())]));
    }

    println!();
    println!("{DIM}  done in {:.2} ms{RESET}", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}
