use serde::Serialize;

/// A runtime value on the operand stack or in the constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
}

/// The shared `true` instance. Every Boolean the VM pushes is one of these two.
pub const TRUE: Value = Value::Boolean(true);
/// The shared `false` instance.
pub const FALSE: Value = Value::Boolean(false);

impl Value {
    #[inline]
    pub fn from_bool(b: bool) -> Value {
        if b { TRUE } else { FALSE }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}
