//! The opcode table driving the bytecode reader.
//!
//! The standard table ships as `langspec.json` and is parsed once, on first
//! use. Other tables (newer language versions, test fixtures) can be built
//! with [`OpcodeTable::from_json`] and handed to a
//! [`ProgramReader`](super::ProgramReader).

use serde::Deserialize;
use std::sync::OnceLock;

use super::ProgramError;

const STANDARD_LANGSPEC: &str = include_str!("langspec.json");

/// Cost and encoded size of one opcode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpSpec {
    #[serde(rename = "Opcode")]
    pub opcode: u8,
    #[serde(rename = "Name")]
    pub name: String,
    /// Static evaluation cost.
    #[serde(rename = "Cost")]
    pub cost: u64,
    /// Bytes the instruction occupies, opcode included. Zero means the
    /// length is encoded in the instruction itself.
    #[serde(rename = "Size")]
    pub size: usize,
}

#[derive(Deserialize)]
struct LangSpec {
    #[serde(rename = "EvalMaxVersion")]
    eval_max_version: u64,
    #[serde(rename = "Ops")]
    ops: Vec<OpSpec>,
}

/// Opcodes indexed by their byte value.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    eval_max_version: u64,
    ops: Vec<Option<OpSpec>>,
}

impl OpcodeTable {
    /// Parse a language spec document.
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        let spec: LangSpec = serde_json::from_str(json)
            .map_err(|e| ProgramError::InvalidOpcodeTable(e.to_string()))?;
        let mut ops: Vec<Option<OpSpec>> = vec![None; 256];
        for op in spec.ops {
            let slot = &mut ops[usize::from(op.opcode)];
            if slot.is_some() {
                return Err(ProgramError::InvalidOpcodeTable(format!(
                    "opcode {:#04x} defined twice",
                    op.opcode
                )));
            }
            *slot = Some(op);
        }
        Ok(Self {
            eval_max_version: spec.eval_max_version,
            ops,
        })
    }

    /// The embedded table, loaded on first call and shared thereafter.
    pub fn standard() -> Result<&'static Self, ProgramError> {
        static STANDARD: OnceLock<Result<OpcodeTable, ProgramError>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Self::from_json(STANDARD_LANGSPEC))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Highest program version this table can read.
    pub fn eval_max_version(&self) -> u64 {
        self.eval_max_version
    }

    pub fn get(&self, opcode: u8) -> Option<&OpSpec> {
        self.ops[usize::from(opcode)].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_loads() {
        let table = OpcodeTable::standard().unwrap();
        assert_eq!(table.eval_max_version(), 6);
        assert_eq!(table.get(0x20).unwrap().name, "intcblock");
        assert_eq!(table.get(0x20).unwrap().size, 0);
        assert_eq!(table.get(0x02).unwrap().cost, 130);
        assert!(table.get(0xff).is_none());
    }

    #[test]
    fn standard_table_is_shared() {
        let a = OpcodeTable::standard().unwrap();
        let b = OpcodeTable::standard().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn duplicate_opcode_rejected() {
        let json = r#"{"EvalMaxVersion":1,"Ops":[
            {"Opcode":1,"Name":"a","Cost":1,"Size":1},
            {"Opcode":1,"Name":"b","Cost":1,"Size":1}]}"#;
        assert!(matches!(
            OpcodeTable::from_json(json),
            Err(ProgramError::InvalidOpcodeTable(_))
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            OpcodeTable::from_json("{"),
            Err(ProgramError::InvalidOpcodeTable(_))
        ));
    }
}
