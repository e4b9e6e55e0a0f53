use serde::{Deserialize, Serialize};

use loantrack_auth::Role;
use loantrack_core::{DomainError, DomainResult, Entity, UserId};

/// A registered borrower or approver.
///
/// Credentials live with the identity provider; the core only needs the
/// record to exist so that account deletion can cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: UserId,
    name: String,
    email: String,
    role: Role,
}

impl Account {
    pub fn new(id: UserId, name: &str, email: &str, role: Role) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: normalize_name(name)?,
            email: normalize_email(email)?,
            role,
        })
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    /// Emails are stored trimmed and lowercased.
    pub fn change_email(&mut self, email: &str) -> DomainResult<()> {
        self.email = normalize_email(email)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl Entity for Account {
    type Id = UserId;
    const KIND: &'static str = "account";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn normalize_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email cannot be empty"));
    }
    Ok(email)
}
