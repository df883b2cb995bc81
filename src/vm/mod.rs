use crate::code::{self, Opcode};
use crate::compiler::Bytecode;
use crate::object::{FALSE, TRUE, Value};

/// Default operand stack capacity, in slots.
pub const STACK_SIZE: usize = 2048;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported types for binary operation: {left} {right}")]
    UnsupportedTypes { left: &'static str, right: &'static str },
    #[error("unknown operator: {op} ({left} {right})")]
    UnknownOperator { op: u8, left: &'static str, right: &'static str },
    #[error("opcode {op} undefined at offset {ip}")]
    UndefinedOpcode { op: u8, ip: usize },
    #[error("truncated instruction at offset {ip}")]
    Truncated { ip: usize },
    #[error("constant {index} out of range")]
    ConstantOutOfRange { index: usize },
}

type VmResult<T> = Result<T, VmError>;

/// Stack machine executing one `Bytecode` artifact.
///
/// `sp` always names the next free slot, so the top of the stack is at
/// `sp - 1`. Popping only moves `sp`; the vacated slot keeps its value,
/// which is how [`Vm::last_popped`] recovers the result of the final
/// expression statement.
pub struct Vm<'a> {
    constants: &'a [Value],
    instructions: &'a [u8],
    stack: Box<[Option<Value>]>,
    sp: usize,
}

impl<'a> Vm<'a> {
    pub fn new(bytecode: &'a Bytecode) -> Self {
        Vm::with_stack_size(bytecode, STACK_SIZE)
    }

    pub fn with_stack_size(bytecode: &'a Bytecode, stack_size: usize) -> Self {
        Vm {
            constants: &bytecode.constants,
            instructions: bytecode.instructions.as_bytes(),
            stack: vec![None; stack_size].into_boxed_slice(),
            sp: 0,
        }
    }

    pub fn stack_top(&self) -> Option<Value> {
        match self.sp {
            0 => None,
            sp => self.stack[sp - 1],
        }
    }

    /// The value most recently removed by a pop, i.e. the slot at `sp`.
    pub fn last_popped(&self) -> Option<Value> {
        self.stack.get(self.sp).copied().flatten()
    }

    pub fn stack_pointer(&self) -> usize {
        self.sp
    }

    pub fn capacity(&self) -> usize {
        self.stack.len()
    }

    /// Fetch-decode-execute until the end of the stream or the first error.
    pub fn run(&mut self) -> VmResult<()> {
        let ins = self.instructions;
        let mut ip = 0;

        while ip < ins.len() {
            let op = Opcode::try_from(ins[ip]).map_err(|_| VmError::UndefinedOpcode { op: ins[ip], ip })?;
            tracing::trace!(ip, op = op.definition().name, sp = self.sp, "dispatch");

            match op {
                Opcode::Constant => {
                    let operand = ins.get(ip + 1..ip + 3).ok_or(VmError::Truncated { ip })?;
                    let index = code::read_u16(operand) as usize;
                    ip += 2;
                    let value = *self.constants.get(index).ok_or(VmError::ConstantOutOfRange { index })?;
                    self.push(value)?;
                }
                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                    self.execute_binary_operation(op)?;
                }
                Opcode::Equal | Opcode::NotEqual | Opcode::GreaterThan => {
                    self.execute_comparison(op)?;
                }
                Opcode::Pop => {
                    self.pop()?;
                }
                Opcode::True => self.push(TRUE)?,
                Opcode::False => self.push(FALSE)?,
            }

            ip += 1;
        }

        tracing::debug!(sp = self.sp, "run complete");
        Ok(())
    }

    fn push(&mut self, value: Value) -> VmResult<()> {
        if self.sp >= self.stack.len() {
            return Err(VmError::StackOverflow);
        }
        self.stack[self.sp] = Some(value);
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> VmResult<Value> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.sp -= 1;
        // Every slot below a previous `sp` has been written.
        self.stack[self.sp].ok_or(VmError::StackUnderflow)
    }

    // Right operand is on top, so it comes off first.
    fn pop_pair(&mut self) -> VmResult<(Value, Value)> {
        let right = self.pop()?;
        let left = self.pop()?;
        Ok((left, right))
    }

    fn execute_binary_operation(&mut self, op: Opcode) -> VmResult<()> {
        let (left, right) = self.pop_pair()?;
        match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => {
                let result = match op {
                    Opcode::Add => l.wrapping_add(r),
                    Opcode::Sub => l.wrapping_sub(r),
                    Opcode::Mul => l.wrapping_mul(r),
                    Opcode::Div => {
                        if r == 0 {
                            return Err(VmError::DivisionByZero);
                        }
                        l.wrapping_div(r)
                    }
                    _ => {
                        return Err(VmError::UnknownOperator {
                            op: op as u8,
                            left: left.type_name(),
                            right: right.type_name(),
                        });
                    }
                };
                self.push(Value::Integer(result))
            }
            _ => Err(VmError::UnsupportedTypes { left: left.type_name(), right: right.type_name() }),
        }
    }

    fn execute_comparison(&mut self, op: Opcode) -> VmResult<()> {
        let (left, right) = self.pop_pair()?;

        let result = match (op, left, right) {
            (Opcode::GreaterThan, Value::Integer(l), Value::Integer(r)) => l > r,
            // Booleans are the shared TRUE/FALSE values, so value equality is
            // identity; an Integer never equals a Boolean.
            (Opcode::Equal, _, _) => left == right,
            (Opcode::NotEqual, _, _) => left != right,
            _ => {
                return Err(VmError::UnknownOperator {
                    op: op as u8,
                    left: left.type_name(),
                    right: right.type_name(),
                });
            }
        };

        self.push(Value::from_bool(result))
    }
}

/// Run `bytecode` on a fresh VM and return the last popped value.
pub fn run(bytecode: &Bytecode) -> VmResult<Option<Value>> {
    let mut vm = Vm::new(bytecode);
    vm.run()?;
    Ok(vm.last_popped())
}

// ── Tests ────────────────────────────────────────────────────────────
