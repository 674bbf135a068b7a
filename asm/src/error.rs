use std::fmt;

/// Source position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmErrorKind {
    Syntax(String),
    UnknownMnemonic(String),
    UnknownDirective(String),
    InvalidNumber(String),
    InvalidRegister { op: &'static str, reg: String },
    WrongOperands { op: String, expected: &'static str },
    UndefinedLabel(String),
    LabelRedefinition(String),
    CrossPageReference(String),
    SameBankJump(String),
    ImageOverflow,
    NumericOperandUnsupported,
}

impl fmt::Display for AsmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmErrorKind::Syntax(msg) => write!(f, "{msg}"),
            AsmErrorKind::UnknownMnemonic(m) => write!(f, "unknown mnemonic \"{m}\""),
            AsmErrorKind::UnknownDirective(d) => write!(f, "unknown directive \"{d}\""),
            AsmErrorKind::InvalidNumber(n) => write!(f, "invalid number \"{n}\""),
            AsmErrorKind::InvalidRegister { op, reg } => {
                write!(f, "invalid register \"{reg}\" for {op}")
            }
            AsmErrorKind::WrongOperands { op, expected } => {
                write!(f, "{op} expects {expected}")
            }
            AsmErrorKind::UndefinedLabel(l) => write!(f, "undefined label \"{l}\""),
            AsmErrorKind::LabelRedefinition(l) => write!(f, "label redefinition: {l}"),
            AsmErrorKind::CrossPageReference(l) => write!(
                f,
                "referencing label \"{l}\" from a different page in the same bank"
            ),
            AsmErrorKind::SameBankJump(l) => write!(f, "same-bank jump to \"{l}\""),
            AsmErrorKind::ImageOverflow => write!(f, "program exceeds the memory image"),
            AsmErrorKind::NumericOperandUnsupported => {
                write!(f, "numeric operands are not supported on this machine")
            }
        }
    }
}

/// One-line assembly diagnostic: `path:line:col: message` when a source
/// position is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmError {
    pub path: String,
    pub span: Option<Span>,
    pub kind: AsmErrorKind,
}

impl AsmError {
    pub fn new(path: &str, span: Option<Span>, kind: AsmErrorKind) -> Self {
        Self {
            path: path.to_string(),
            span,
            kind,
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{}:{}:{}: {}", self.path, span.line, span.col, self.kind),
            None => write!(f, "{}: {}", self.path, self.kind),
        }
    }
}

impl std::error::Error for AsmError {}
