use serde::Serialize;

use crate::Role;

/// A gated operation against a business or one of its cash books.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// View ledgers, list cash books and members, subscribe, export.
    Read,
    CreateCashBook,
    DeleteCashBook,
    /// Create or edit an entry.
    WriteEntry,
    DeleteEntry,
    /// Add, remove or change the role of a member.
    ManageMembers,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Read,
        Operation::CreateCashBook,
        Operation::DeleteCashBook,
        Operation::WriteEntry,
        Operation::DeleteEntry,
        Operation::ManageMembers,
    ];

    /// Minimum role allowed to attempt this operation.
    pub fn required_role(self) -> Role {
        match self {
            Operation::Read => Role::Viewer,
            Operation::CreateCashBook | Operation::WriteEntry => Role::Operator,
            Operation::DeleteCashBook | Operation::DeleteEntry | Operation::ManageMembers => {
                Role::Owner
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "ledger.read",
            Operation::CreateCashBook => "cashbook.create",
            Operation::DeleteCashBook => "cashbook.delete",
            Operation::WriteEntry => "entry.write",
            Operation::DeleteEntry => "entry.delete",
            Operation::ManageMembers => "members.manage",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
