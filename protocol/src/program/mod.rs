//! # Program Reader
//!
//! Structural validation and constant extraction for logic programs.
//!
//! The reader does not execute anything. It walks the bytecode once:
//!
//! 1. A varint version, which must not exceed the table's maximum.
//! 2. Program length plus argument lengths must fit in 1000 bytes.
//! 3. Each opcode must exist in the [`OpcodeTable`]. Its cost is summed and
//!    the scan advances by its size.
//! 4. The four variable-length opcodes are decoded in place, and their
//!    constants collected in encounter order:
//!
//! | opcode | layout | collected into |
//! |---|---|---|
//! | `intcblock` | count, then count varints | `ints` |
//! | `bytecblock` | count, then count (length, bytes) pairs | `byte_consts` |
//! | `pushint` | one varint | `ints` |
//! | `pushbytes` | length, bytes | `byte_consts` |
//!
//! Programs below version 4 must also stay within the static cost limit;
//! from version 4 on, cost is metered at evaluation time instead.
//!
//! Constant positions are how template callers find their parameters, e.g.
//! "the third integer constant is the expiry round".

pub mod opcodes;
pub mod varint;

use thiserror::Error;
use tracing::trace;

use crate::config::{DYNAMIC_COST_VERSION, MAX_PROGRAM_COST, MAX_PROGRAM_LENGTH};
pub use opcodes::{OpSpec, OpcodeTable};
use varint::read_uvarint;

const INTCBLOCK: u8 = 0x20;
const BYTECBLOCK: u8 = 0x26;
const PUSHBYTES: u8 = 0x80;
const PUSHINT: u8 = 0x81;

/// Why a program was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program is empty or its version varint is malformed")]
    MissingVersion,

    #[error("program version {version} is newer than the supported {max}")]
    UnsupportedVersion { version: u64, max: u64 },

    #[error("program and arguments are {length} bytes, the limit is {max}")]
    TooLong { length: usize, max: usize },

    #[error("unknown opcode {opcode:#04x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("instruction at offset {offset} runs past the end of the program")]
    Truncated { offset: usize },

    #[error("program cost {cost} exceeds {max}")]
    TooCostly { cost: u64, max: u64 },

    #[error("opcode table is invalid: {0}")]
    InvalidOpcodeTable(String),
}

/// What a structurally valid program declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramData {
    pub version: u64,
    /// Integer constants, in encounter order.
    pub ints: Vec<u64>,
    /// Byte-string constants, in encounter order.
    pub byte_consts: Vec<Vec<u8>>,
    /// Summed static cost of every instruction.
    pub cost: u64,
}

/// Reads programs against a borrowed opcode table.
#[derive(Debug, Clone, Copy)]
pub struct ProgramReader<'t> {
    table: &'t OpcodeTable,
}

impl<'t> ProgramReader<'t> {
    pub fn new(table: &'t OpcodeTable) -> Self {
        Self { table }
    }

    /// A reader over the embedded standard table.
    pub fn standard() -> Result<ProgramReader<'static>, ProgramError> {
        Ok(ProgramReader::new(OpcodeTable::standard()?))
    }

    pub fn read(&self, program: &[u8], args: &[Vec<u8>]) -> Result<ProgramData, ProgramError> {
        let (version, mut pc) = read_uvarint(program).ok_or(ProgramError::MissingVersion)?;
        let max = self.table.eval_max_version();
        if version > max {
            return Err(ProgramError::UnsupportedVersion { version, max });
        }

        let length = args.iter().fold(program.len(), |acc, a| acc.saturating_add(a.len()));
        if length > MAX_PROGRAM_LENGTH {
            return Err(ProgramError::TooLong {
                length,
                max: MAX_PROGRAM_LENGTH,
            });
        }

        let mut data = ProgramData {
            version,
            ..Default::default()
        };
        while pc < program.len() {
            let opcode = program[pc];
            let op = self
                .table
                .get(opcode)
                .ok_or(ProgramError::UnknownOpcode { opcode, offset: pc })?;
            data.cost = data.cost.saturating_add(op.cost);

            let size = match op.size {
                0 => read_immediates(program, pc, opcode, &mut data)?,
                fixed if pc + fixed > program.len() => {
                    return Err(ProgramError::Truncated { offset: pc });
                }
                fixed => fixed,
            };
            trace!(offset = pc, op = %op.name, size, "scanned instruction");
            pc += size;
        }

        if version < DYNAMIC_COST_VERSION && data.cost > MAX_PROGRAM_COST {
            return Err(ProgramError::TooCostly {
                cost: data.cost,
                max: MAX_PROGRAM_COST,
            });
        }
        Ok(data)
    }
}

/// Decode a variable-length instruction at `pc`, returning its full size.
fn read_immediates(
    program: &[u8],
    pc: usize,
    opcode: u8,
    data: &mut ProgramData,
) -> Result<usize, ProgramError> {
    let mut cursor = pc + 1;

    let varint = |cursor: &mut usize| -> Result<u64, ProgramError> {
        let (value, used) = read_uvarint(&program[*cursor..])
            .ok_or(ProgramError::Truncated { offset: pc })?;
        *cursor += used;
        Ok(value)
    };
    let bytes = |cursor: &mut usize, len: u64| -> Result<Vec<u8>, ProgramError> {
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| cursor.checked_add(len))
            .filter(|&end| end <= program.len())
            .ok_or(ProgramError::Truncated { offset: pc })?;
        let out = program[*cursor..end].to_vec();
        *cursor = end;
        Ok(out)
    };

    match opcode {
        INTCBLOCK => {
            let count = varint(&mut cursor)?;
            for _ in 0..count {
                let value = varint(&mut cursor)?;
                data.ints.push(value);
            }
        }
        BYTECBLOCK => {
            let count = varint(&mut cursor)?;
            for _ in 0..count {
                let len = varint(&mut cursor)?;
                data.byte_consts.push(bytes(&mut cursor, len)?);
            }
        }
        PUSHINT => {
            let value = varint(&mut cursor)?;
            data.ints.push(value);
        }
        PUSHBYTES => {
            let len = varint(&mut cursor)?;
            data.byte_consts.push(bytes(&mut cursor, len)?);
        }
        _ => return Err(ProgramError::UnknownOpcode { opcode, offset: pc }),
    }
    Ok(cursor - pc)
}

/// Read `program` with the standard opcode table.
///
/// # Example
///
/// ```
/// use ledger_protocol::program::read_program;
///
/// // version 1; intcblock [1]; intc_0
/// let data = read_program(&[0x01, 0x20, 0x01, 0x01, 0x22], &[]).unwrap();
/// assert_eq!(data.ints, vec![1]);
/// assert!(data.byte_consts.is_empty());
/// ```
pub fn read_program(program: &[u8], args: &[Vec<u8>]) -> Result<ProgramData, ProgramError> {
    ProgramReader::standard()?.read(program, args)
}

/// Whether `program` with `args` passes [`read_program`].
pub fn check_program(program: &[u8], args: &[Vec<u8>]) -> bool {
    read_program(program, args).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_program_reads() {
        let data = read_program(&[0x01, 0x20, 0x01, 0x01, 0x22], &[]).unwrap();
        assert_eq!(data.version, 1);
        assert_eq!(data.ints, vec![1]);
        assert!(data.byte_consts.is_empty());
        assert_eq!(data.cost, 2);
    }

    #[test]
    fn constants_collected_in_order() {
        let program = [
            0x04, // version 4
            0x20, 0x02, 0x05, 0xac, 0x02, // intcblock 5 300
            0x26, 0x02, 0x01, 0xaa, 0x02, 0xbb, 0xcc, // bytecblock 0xaa 0xbbcc
            0x81, 0x07, // pushint 7
            0x80, 0x01, 0xdd, // pushbytes 0xdd
            0x12, // ==
        ];
        let data = read_program(&program, &[]).unwrap();
        assert_eq!(data.ints, vec![5, 300, 7]);
        assert_eq!(
            data.byte_consts,
            vec![vec![0xaa], vec![0xbb, 0xcc], vec![0xdd]]
        );
    }

    #[test]
    fn empty_program_has_no_version() {
        assert_eq!(read_program(&[], &[]), Err(ProgramError::MissingVersion));
        assert!(!check_program(&[0x80], &[]));
    }

    #[test]
    fn future_version_rejected() {
        assert_eq!(
            read_program(&[0x07, 0x22], &[]),
            Err(ProgramError::UnsupportedVersion { version: 7, max: 6 })
        );
    }

    #[test]
    fn length_includes_args() {
        let mut program = vec![0x01];
        program.extend(std::iter::repeat(0x22).take(899));
        assert!(check_program(&program, &[vec![0u8; 100]]));
        assert_eq!(
            read_program(&program, &[vec![0u8; 101]]),
            Err(ProgramError::TooLong {
                length: 1001,
                max: 1000
            })
        );
    }

    #[test]
    fn unknown_opcode_rejected() {
        assert_eq!(
            read_program(&[0x01, 0x22, 0xff], &[]),
            Err(ProgramError::UnknownOpcode {
                opcode: 0xff,
                offset: 2
            })
        );
    }

    #[test]
    fn truncated_immediates_rejected() {
        // intcblock promising two values, carrying one.
        assert_eq!(
            read_program(&[0x01, 0x20, 0x02, 0x01], &[]),
            Err(ProgramError::Truncated { offset: 1 })
        );
        // pushbytes promising four bytes, carrying two.
        assert_eq!(
            read_program(&[0x02, 0x80, 0x04, 0x01, 0x02], &[]),
            Err(ProgramError::Truncated { offset: 1 })
        );
        // bnz missing its 2-byte offset.
        assert_eq!(
            read_program(&[0x02, 0x22, 0x40, 0x00], &[]),
            Err(ProgramError::Truncated { offset: 2 })
        );
    }

    #[test]
    fn static_cost_limit_only_before_version_4() {
        let expensive = |version: u8| {
            let mut program = vec![version];
            // 160 × keccak256 at 130 each is 20 800.
            program.extend(std::iter::repeat(0x02).take(160));
            program
        };
        assert_eq!(
            read_program(&expensive(1), &[]),
            Err(ProgramError::TooCostly {
                cost: 20_800,
                max: 20_000
            })
        );
        let data = read_program(&expensive(4), &[]).unwrap();
        assert_eq!(data.cost, 20_800);
    }

    #[test]
    fn custom_table_can_be_injected() {
        let table = OpcodeTable::from_json(
            r#"{"EvalMaxVersion":2,"Ops":[{"Opcode":16,"Name":"nop","Cost":1,"Size":1}]}"#,
        )
        .unwrap();
        let reader = ProgramReader::new(&table);
        assert!(reader.read(&[0x02, 0x10, 0x10], &[]).is_ok());
        assert!(reader.read(&[0x03, 0x10], &[]).is_err());
        assert!(reader.read(&[0x01, 0x22], &[]).is_err());
    }
}
