use std::fmt;

// ── Instruction format ──────────────────────────────────────────────
//
// [OP:8][operands, big-endian, widths fixed per opcode]
//
// No alignment padding, no length prefix, no end marker.

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("opcode {0} undefined")]
    UndefinedOpcode(u8),
    #[error("operand len {got} does not match defined {expected} for {name}")]
    OperandCount { name: &'static str, expected: usize, got: usize },
    #[error("operand {operand} does not fit in {width} bytes for {name}")]
    OperandOverflow { name: &'static str, operand: usize, width: usize },
    #[error("{name} needs {needed} operand bytes, only {available} left")]
    Truncated { name: &'static str, needed: usize, available: usize },
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Constant = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Pop = 5,
    True = 6,
    False = 7,
    Equal = 8,
    NotEqual = 9,
    GreaterThan = 10,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::Constant,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Pop,
        Opcode::True,
        Opcode::False,
        Opcode::Equal,
        Opcode::NotEqual,
        Opcode::GreaterThan,
    ];

    pub fn definition(self) -> &'static Definition {
        &DEFINITIONS[self as usize]
    }
}

// Indexed by opcode byte.
static DEFINITIONS: [Definition; 11] = [
    Definition { name: "OpConstant", operand_widths: &[2] },
    Definition { name: "OpAdd", operand_widths: &[] },
    Definition { name: "OpSub", operand_widths: &[] },
    Definition { name: "OpMul", operand_widths: &[] },
    Definition { name: "OpDiv", operand_widths: &[] },
    Definition { name: "OpPop", operand_widths: &[] },
    Definition { name: "OpTrue", operand_widths: &[] },
    Definition { name: "OpFalse", operand_widths: &[] },
    Definition { name: "OpEqual", operand_widths: &[] },
    Definition { name: "OpNotEqual", operand_widths: &[] },
    Definition { name: "OpGreaterThan", operand_widths: &[] },
];

impl TryFrom<u8> for Opcode {
    type Error = CodeError;

    fn try_from(byte: u8) -> Result<Self, CodeError> {
        Opcode::ALL
            .get(byte as usize)
            .copied()
            .ok_or(CodeError::UndefinedOpcode(byte))
    }
}

/// Name and operand layout of one opcode.
#[derive(Debug, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Definition {
    /// Total operand bytes following the opcode byte.
    pub fn operand_len(&self) -> usize {
        self.operand_widths.iter().sum()
    }
}

pub fn lookup(byte: u8) -> Result<&'static Definition, CodeError> {
    Opcode::try_from(byte).map(Opcode::definition)
}

/// Encode one instruction.
///
/// The operand list must match the opcode's declared widths one-to-one and
/// every operand must fit its width; either violation is reported rather than
/// producing a mis-sized encoding.
pub fn make(op: Opcode, operands: &[usize]) -> Result<Vec<u8>, CodeError> {
    let def = op.definition();
    if operands.len() != def.operand_widths.len() {
        return Err(CodeError::OperandCount {
            name: def.name,
            expected: def.operand_widths.len(),
            got: operands.len(),
        });
    }

    let mut instruction = Vec::with_capacity(1 + def.operand_len());
    instruction.push(op as u8);

    for (&operand, &width) in operands.iter().zip(def.operand_widths) {
        // Any bits left above the low `width` bytes do not fit.
        let overflow = u32::try_from(8 * width)
            .ok()
            .and_then(|bits| operand.checked_shr(bits))
            .is_some_and(|rest| rest != 0);
        if overflow {
            return Err(CodeError::OperandOverflow { name: def.name, operand, width });
        }
        for shift in (0..width).rev() {
            let byte = u32::try_from(8 * shift)
                .ok()
                .and_then(|bits| operand.checked_shr(bits))
                .unwrap_or(0);
            instruction.push(byte as u8);
        }
    }

    Ok(instruction)
}

/// Decode the operands of `def` from `ins` (which starts right after the
/// opcode byte). Returns the values and the number of bytes consumed.
pub fn read_operands(def: &Definition, ins: &[u8]) -> Result<(Vec<usize>, usize), CodeError> {
    let needed = def.operand_len();
    if ins.len() < needed {
        return Err(CodeError::Truncated { name: def.name, needed, available: ins.len() });
    }

    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;
    for &width in def.operand_widths {
        let operand = ins[offset..offset + width]
            .iter()
            .fold(0usize, |acc, &b| acc.wrapping_shl(8) | usize::from(b));
        operands.push(operand);
        offset += width;
    }

    Ok((operands, offset))
}

/// Big-endian u16 from the first two bytes. Callers check the length.
#[inline(always)]
pub fn read_u16(ins: &[u8]) -> u16 {
    u16::from_be_bytes([ins[0], ins[1]])
}

// ── Instruction stream ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Instructions(pub Vec<u8>);

impl Instructions {
    pub fn new() -> Self {
        Instructions(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Append raw instruction bytes, returning the offset they start at.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let pos = self.0.len();
        self.0.extend_from_slice(bytes);
        pos
    }
}

impl From<Vec<u8>> for Instructions {
    fn from(bytes: Vec<u8>) -> Self {
        Instructions(bytes)
    }
}

impl FromIterator<Vec<u8>> for Instructions {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Instructions(iter.into_iter().flatten().collect())
    }
}

fn fmt_instruction(def: &Definition, operands: &[usize]) -> String {
    match operands {
        [] => def.name.to_string(),
        [operand] => format!("{} {}", def.name, operand),
        _ => format!("ERROR: unhandled operand count for {}", def.name),
    }
}

/// Disassembly, one `<offset> <mnemonic> [operand]` line per instruction.
impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ins = &self.0;
        let mut i = 0;
        while i < ins.len() {
            let def = match lookup(ins[i]) {
                Ok(def) => def,
                Err(e) => {
                    writeln!(f, "{:04} ERROR: {}", i, e)?;
                    i += 1;
                    continue;
                }
            };

            match read_operands(def, &ins[i + 1..]) {
                Ok((operands, read)) => {
                    writeln!(f, "{:04} {}", i, fmt_instruction(def, &operands))?;
                    i += 1 + read;
                }
                Err(e) => {
                    writeln!(f, "{:04} ERROR: {}", i, e)?;
                    break;
                }
            }
        }
        Ok(())
    }
}
