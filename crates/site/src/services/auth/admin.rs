//! Who counts as an administrator.

use pawmilya_core::Role;

/// Admin detection: a configured email, or an admin role on the profile.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: Vec<String>,
}

impl AdminPolicy {
    #[must_use]
    pub fn new(emails: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.emails.iter().any(|e| *e == email)
    }

    #[must_use]
    pub fn is_admin(&self, email: &str, role: Role) -> bool {
        role.is_admin() || self.is_admin_email(email)
    }

    /// Role assigned to a new account.
    #[must_use]
    pub fn role_for_email(&self, email: &str) -> Role {
        if self.is_admin_email(email) {
            Role::Admin
        } else {
            Role::Customer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_by_email_ignores_case() {
        let policy = AdminPolicy::new(["Admin@Example.com"]);
        assert!(policy.is_admin_email("admin@example.com"));
        assert!(policy.is_admin_email(" ADMIN@example.com "));
        assert!(!policy.is_admin_email("vet@example.com"));
        assert_eq!(policy.role_for_email("admin@example.com"), Role::Admin);
    }

    #[test]
    fn test_admin_by_role() {
        let policy = AdminPolicy::new(Vec::<String>::new());
        assert!(policy.is_admin("vet@example.com", Role::from_label("Administrator")));
        assert!(!policy.is_admin("vet@example.com", Role::Customer));
    }
}
