//! Bytecode compiler and stack virtual machine for a small expression
//! language of integers, booleans and infix operators.
//!
//! ```text
//! source ─ lexer ─ parser ─> AST ─ compiler ─> Bytecode ─ vm ─> last popped value
//! ```

pub mod ast;
pub mod code;
pub mod compiler;
pub mod diagnostic;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod vm;

pub use compiler::{Bytecode, CompileError};
pub use object::Value;
pub use vm::{Vm, VmError};

/// Any failure along the source-to-result pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] lexer::LexError),
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] VmError),
}

/// Lex and parse `source`, keeping the text on the program for diagnostics.
pub fn parse(source: &str) -> Result<ast::Program, Error> {
    let tokens = lexer::lex(source)?;
    let mut program = parser::parse(tokens)?;
    program.source = Some(source.to_string());
    Ok(program)
}

/// Lex, parse and compile `source`.
pub fn compile(source: &str) -> Result<Bytecode, Error> {
    Ok(compiler::compile(&parse(source)?)?)
}

/// Run `source` to completion with a stack of `stack_size` slots and return
/// the value of the last expression statement, if there was one.
pub fn eval_with_stack_size(source: &str, stack_size: usize) -> Result<Option<Value>, Error> {
    let bytecode = compile(source)?;
    let mut machine = Vm::with_stack_size(&bytecode, stack_size);
    machine.run()?;
    Ok(machine.last_popped())
}

pub fn eval(source: &str) -> Result<Option<Value>, Error> {
    eval_with_stack_size(source, vm::STACK_SIZE)
}
