/// An entry in the error code registry.
pub struct ErrorEntry {
    pub code: &'static str,
    pub short: &'static str,
    pub long: &'static str,
}

/// Every stable code a diagnostic can carry.
pub static REGISTRY: &[ErrorEntry] = &[
    // ── Lexer ────────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "MK-L001",
        short: "unexpected input",
        long: r#"## MK-L001: unexpected input

The source contains characters that are not part of the language. Only
integer literals, `true`, `false`, the operators `+ - * / == != < >`,
parentheses and `;` are recognised.

**Example:**

    1 = 1

**Fix:**

    1 == 1

Integer literals must also fit in a signed 64-bit integer.
"#,
    },
    // ── Parser ───────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "MK-P001",
        short: "expected an expression",
        long: r#"## MK-P001: expected an expression

An operator or `)` appeared where a value was expected.

**Example:**

    * 2

Every operator needs an operand on both sides.
"#,
    },
    ErrorEntry {
        code: "MK-P002",
        short: "unexpected end of input",
        long: r#"## MK-P002: unexpected end of input

The program ended in the middle of an expression, for example after a
trailing operator or before a closing parenthesis.

**Example:**

    (1 + 2

**Fix:**

    (1 + 2)
"#,
    },
    ErrorEntry {
        code: "MK-P003",
        short: "unexpected token",
        long: r#"## MK-P003: unexpected token

A specific token was required here, usually the `)` closing a group.
"#,
    },
    ErrorEntry {
        code: "MK-P004",
        short: "missing ';' between statements",
        long: r#"## MK-P004: missing ';' between statements

Two expressions follow each other without a separator.

**Example:**

    1 2

**Fix:**

    1; 2
"#,
    },
    ErrorEntry {
        code: "MK-P005",
        short: "prefix '-' not supported",
        long: r#"## MK-P005: prefix '-' not supported

There are no prefix operators. Write a negative value as a subtraction.

**Example:**

    -5 * 2

**Fix:**

    (0 - 5) * 2
"#,
    },
    ErrorEntry {
        code: "MK-P006",
        short: "expression nested too deeply",
        long: r#"## MK-P006: expression nested too deeply

An expression goes more than 256 levels deep. Every pair of parentheses
and every chained operator adds a level.

**Example:**

    ((((((((1))))))))  nested a few hundred times over

**Fix:**

Split the expression into separate statements or drop redundant
parentheses.
"#,
    },
    // ── Compiler ─────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "MK-C001",
        short: "unknown operator",
        long: r#"## MK-C001: unknown operator

The operator parses but has no instruction. Supported: `+ - * / == != < >`.
`a < b` is compiled as `b > a`; `<=`, `>=` and `%` are not available.

**Example:**

    3 <= 4

**Fix:**

    3 < 4 + 1
"#,
    },
    ErrorEntry {
        code: "MK-C002",
        short: "too many constants",
        long: r#"## MK-C002: too many constants

Constant indices are 16-bit, so a program can contain at most 65536
integer literals.
"#,
    },
    ErrorEntry {
        code: "MK-C003",
        short: "instruction encoding failed",
        long: r#"## MK-C003: instruction encoding failed

An instruction was emitted with the wrong number of operands or an
operand too wide for its slot. This indicates a compiler bug.
"#,
    },
    // ── Runtime ──────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "MK-R001",
        short: "stack overflow",
        long: r#"## MK-R001: stack overflow

A push found the operand stack full (2048 slots unless `--stack-size`
says otherwise). Deeply nested expressions keep intermediate values on
the stack; split them into smaller statements or raise the limit.
"#,
    },
    ErrorEntry {
        code: "MK-R002",
        short: "stack underflow",
        long: r#"## MK-R002: stack underflow

An instruction needed more values than the stack held. Bytecode from the
compiler never does this; the input bytecode is malformed.
"#,
    },
    ErrorEntry {
        code: "MK-R003",
        short: "division by zero",
        long: r#"## MK-R003: division by zero

The right operand of `/` evaluated to 0.

**Example:**

    10 / (5 - 5)
"#,
    },
    ErrorEntry {
        code: "MK-R004",
        short: "unsupported types for arithmetic",
        long: r#"## MK-R004: unsupported types for arithmetic

`+ - * /` only accept two integers.

**Example:**

    true + 1
"#,
    },
    ErrorEntry {
        code: "MK-R005",
        short: "operator not defined for these types",
        long: r#"## MK-R005: operator not defined for these types

`>` (and `<`, which compiles to `>`) compare integers only. `==` and `!=`
accept any pair of values.

**Example:**

    true > false
"#,
    },
    ErrorEntry {
        code: "MK-R006",
        short: "malformed bytecode",
        long: r#"## MK-R006: malformed bytecode

The instruction stream contains an undefined opcode, ends in the middle
of an instruction, or references a constant that does not exist.
"#,
    },
];

pub fn lookup(code: &str) -> Option<&'static ErrorEntry> {
    REGISTRY.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}
