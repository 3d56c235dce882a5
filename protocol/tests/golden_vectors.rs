//! Fixed vectors the network's own tooling produces. If any of these
//! change, transactions built here stop being accepted.

use ledger_protocol::crypto::{sha512_256, Account};
use ledger_protocol::encoding::{self, base32, FieldMap};
use ledger_protocol::group::compute_group_id;
use ledger_protocol::multisig::MultisigAddress;
use ledger_protocol::program::read_program;
use ledger_protocol::transaction::{Header, Payment, RawTransaction, SignedTransaction, TxBody};
use ledger_protocol::{Address, PublicKey};

const SENDER: &str = "DPLD3RTSWC5STVBPZL5DIIVE2OC4BSAWTOYBLFN2X6EFLT2ZNF4SMX64UA";
const RECEIVER: &str = "PU7ZTZJ5GSXET2ZPIWDWDT2TQQEP7WXOGXDQ3ARUCZW6PK7D4ULSE6NYCE";
const SENDER_SEED: &str = "161839d27a6eed645e30e5aa0784e1aa90c2b75bbc91d40c77445ceabff8a6b3";

const CANONICAL_HEX: &str = "87a3616d74cd04d2a3666565cd03e8a26676ce0001a04fa26c76ce0001a437a3726376c4207d3f99e53d34ae49eb2f458761cf538408ffdaee35c70d8234166de7abe3e517a3736e64c4201bd63dc672b0bb29d42fcafa3422a4d385c0c8169bb01595babf8855cf596979a474797065a3706179";

const SIGNED_HEX: &str = "82a3736967c4403f5a5cbc5cb038b0d29a53c0adf8a643822da0e41681bcab050e406fd40af20aa56a2f8c0e05d3bee8d4e8489ef13438151911b31b5ed5b660cac6bae4080507a374786e87a3616d74cd04d2a3666565cd03e8a26676ce0001a04fa26c76ce0001a437a3726376c4207d3f99e53d34ae49eb2f458761cf538408ffdaee35c70d8234166de7abe3e517a3736e64c4201bd63dc672b0bb29d42fcafa3422a4d385c0c8169bb01595babf8855cf596979a474797065a3706179";

fn payment(amount: u64) -> RawTransaction {
    RawTransaction::new(
        Header {
            sender: SENDER.parse().unwrap(),
            fee: 1000,
            first_valid: 106_575,
            last_valid: 107_575,
            ..Default::default()
        },
        TxBody::Payment(Payment {
            receiver: RECEIVER.parse().unwrap(),
            amount,
            close_remainder_to: None,
        }),
    )
}

#[test]
fn payment_canonical_bytes() {
    assert_eq!(hex::encode(payment(1234).canonical_bytes()), CANONICAL_HEX);
}

#[test]
fn payment_transaction_id() {
    assert_eq!(
        payment(1234).id(),
        "BXSNCHKYEXB4AQXFRROUJGZ4ZWD7WL2F5D27YUPFR7ONDK5TMN5Q"
    );
}

#[test]
fn payment_signed_envelope() {
    let account = Account::from_hex(SENDER_SEED).unwrap();
    assert_eq!(account.address().to_string(), SENDER);

    let stx = payment(1234).sign(&account);
    assert_eq!(hex::encode(stx.encode()), SIGNED_HEX);

    let decoded = SignedTransaction::decode(&hex::decode(SIGNED_HEX).unwrap()).unwrap();
    assert_eq!(decoded, stx);
    assert!(decoded.verify().is_ok());
}

#[test]
fn multisig_address_from_named_keys() {
    let keys: Vec<PublicKey> = [
        "DN7MBMCL5JQ3PFUQS7TMX5AH4EEKOBJVDUF4TCV6WERATKFLQF4MQUPZTA",
        "BFRTECKTOOE7A5LHCF3TTEOH2A7BW46IYT2SX5VP6ANKEXHZYJY77SJTVM",
        "47YPQTIGQEO7T4Y4RWDYWEKV6RTR2UNBQXBABEEGM72ESWDQNCQ52OPASU",
    ]
    .iter()
    .map(|a| PublicKey::from(a.parse::<Address>().unwrap()))
    .collect();
    let msa = MultisigAddress::new(1, 2, keys).unwrap();
    assert_eq!(
        msa.address().to_string(),
        "RWJLJCMQAFZ2ATP2INM2GZTKNL6OULCCUBO5TQPXH3V2KR4AG7U5UA5JNM"
    );
}

#[test]
fn program_escrow_and_constants() {
    let program = [0x01, 0x20, 0x01, 0x01, 0x22];
    let data = read_program(&program, &[]).unwrap();
    assert_eq!(data.ints, vec![1]);
    assert!(data.byte_consts.is_empty());
    assert_eq!(
        Address::for_program(&program).to_string(),
        "6Z3C3LDVWGMX23BMSYMANACQOSINPFIRF77H7N3AWJZYV6OH6GWTJKVMXY"
    );
}

#[test]
fn application_escrow_address() {
    assert_eq!(
        Address::for_application(123).to_string(),
        "WRBMNT66ECE2AOYKM76YVWIJMBW6Z3XCQZOKG5BL7NISAQC2LBGEKTZLRM"
    );
}

#[test]
fn zero_address_text() {
    assert_eq!(
        Address::ZERO.to_string(),
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
    );
}

#[test]
fn group_of_two_payments() {
    let txns = [payment(1234), payment(1235)];
    let gid = compute_group_id(&txns).unwrap();
    assert_eq!(
        base32::encode(&gid),
        "RPVU663YR2YFILCKKHPVM2CPIPAM6X4BUK3BJVAQZ23KA4TKB2GA"
    );

    // Same computation by hand: "TG" ‖ msgpack({txlist: [raw ids]}).
    let txlist: Vec<encoding::Value> = txns
        .iter()
        .map(|t| encoding::Value::Bytes(t.raw_id().to_vec()))
        .collect();
    let encoded = encoding::encode_map(&FieldMap::new().with("txlist", txlist));
    assert_eq!(sha512_256(&[b"TG".as_slice(), &encoded].concat()), gid);

    let mut grouped = payment(1234);
    grouped.header.group = Some(gid);
    assert_eq!(
        grouped.id(),
        "XQSC2EWHG2HGV7HQL2RANBJYA3XXUK22GAZ3KDTXKJGWCZUVVWEQ"
    );
}
