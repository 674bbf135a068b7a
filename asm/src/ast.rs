use crate::error::Span;

/// One operand as written in the source; the dialect decides whether an
/// identifier names a register or a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Number(u32),
    Ident(String),
    /// Register pair written as `x:y`, kept verbatim (e.g. "c:d").
    Pair(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Op { mnemonic: String, args: Vec<Arg> },
    Org(u32),
    Page { name: String, target: u32 },
}

/// One source line: an optional `name:` label binding plus an optional
/// operation or directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub label: Option<String>,
    pub item: Option<Item>,
    pub span: Span,
}
