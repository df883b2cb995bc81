use crate::ast::*;
use crate::code::{self, CodeError, Instructions, Opcode};
use crate::object::Value;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unknown operator: {op}")]
    UnknownOperator { op: String, span: Span },
    #[error("too many constants (limit: {})", u16::MAX as usize + 1)]
    TooManyConstants,
    #[error(transparent)]
    Encode(#[from] CodeError),
}

type Result<T> = std::result::Result<T, CompileError>;

/// Compiled output handed to the VM: the instruction stream and the constant
/// pool its `OpConstant` operands index into.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Value>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::default()
    }

    pub fn compile(&mut self, program: &Program) -> Result<()> {
        for stmt in &program.statements {
            self.compile_stmt(stmt)?;
        }
        tracing::debug!(
            statements = program.statements.len(),
            bytes = self.instructions.len(),
            constants = self.constants.len(),
            "compiled program"
        );
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.compile_expr(expr)?;
                // Keep the stack at its pre-statement height.
                self.emit(Opcode::Pop, &[])?;
            }
        }
        Ok(())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Infix { operator, left, right, span } => {
                // `a < b` is compiled as `b > a`; there is no less-than opcode.
                if operator == "<" {
                    self.compile_expr(right)?;
                    self.compile_expr(left)?;
                    self.emit(Opcode::GreaterThan, &[])?;
                    return Ok(());
                }

                let op = match operator.as_str() {
                    "+" => Opcode::Add,
                    "-" => Opcode::Sub,
                    "*" => Opcode::Mul,
                    "/" => Opcode::Div,
                    "==" => Opcode::Equal,
                    "!=" => Opcode::NotEqual,
                    ">" => Opcode::GreaterThan,
                    _ => {
                        return Err(CompileError::UnknownOperator { op: operator.clone(), span: *span });
                    }
                };
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit(op, &[])?;
            }
            Expr::Integer(n) => {
                let idx = self.add_constant(Value::Integer(*n))?;
                self.emit(Opcode::Constant, &[idx])?;
            }
            Expr::Boolean(true) => {
                self.emit(Opcode::True, &[])?;
            }
            Expr::Boolean(false) => {
                self.emit(Opcode::False, &[])?;
            }
        }
        Ok(())
    }

    /// Append `value` to the constant pool and return its index.
    pub fn add_constant(&mut self, value: Value) -> Result<usize> {
        let idx = self.constants.len();
        if idx > u16::MAX as usize {
            return Err(CompileError::TooManyConstants);
        }
        self.constants.push(value);
        Ok(idx)
    }

    /// Encode and append one instruction; returns the offset it starts at.
    pub fn emit(&mut self, op: Opcode, operands: &[usize]) -> Result<usize> {
        let ins = code::make(op, operands)?;
        Ok(self.instructions.append(&ins))
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode { instructions: self.instructions, constants: self.constants }
    }
}

/// Compile a whole program. On error nothing is returned, not even the
/// instructions emitted before the failure.
pub fn compile(program: &Program) -> Result<Bytecode> {
    let mut compiler = Compiler::new();
    compiler.compile(program)?;
    Ok(compiler.bytecode())
}
