//! Who may see an article and when its status may change.

use std::str::FromStr;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::articles::models::{Article, ArticleStatus};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::Role;

/// Rule for status updates on already-reviewed articles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any status may be assigned at any time
    #[default]
    Open,
    /// Only pending articles may be reviewed
    Strict,
}

impl StatusPolicy {
    pub fn check(&self, current: ArticleStatus) -> Result<()> {
        match self {
            StatusPolicy::Open => Ok(()),
            StatusPolicy::Strict if current == ArticleStatus::Pending => Ok(()),
            StatusPolicy::Strict => Err(AppError::Conflict(format!(
                "Article has already been {} and can no longer be reviewed",
                current
            ))),
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(StatusPolicy::Open),
            "strict" => Ok(StatusPolicy::Strict),
            other => Err(format!(
                "Invalid ARTICLE_STATUS_POLICY '{}': expected 'open' or 'strict'",
                other
            )),
        }
    }
}

/// Set of articles a requester may read or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleScope {
    Own(Uuid),
    Everything,
}

impl ArticleScope {
    pub fn for_user(user: &AuthenticatedUser) -> Self {
        match user.role {
            Role::User => ArticleScope::Own(user.id),
            Role::Editor | Role::Admin => ArticleScope::Everything,
        }
    }

    /// Owner restriction forced onto listings
    pub fn owner_filter(&self) -> Option<Uuid> {
        match self {
            ArticleScope::Own(id) => Some(*id),
            ArticleScope::Everything => None,
        }
    }

    pub fn permits(&self, article: &Article) -> bool {
        match self {
            ArticleScope::Own(id) => article.submitted_by == *id,
            ArticleScope::Everything => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{authenticated_user, sample_article};

    #[test]
    fn test_status_policy_parse() {
        assert_eq!("open".parse::<StatusPolicy>(), Ok(StatusPolicy::Open));
        assert_eq!(" Strict ".parse::<StatusPolicy>(), Ok(StatusPolicy::Strict));
        assert!("sometimes".parse::<StatusPolicy>().is_err());
    }

    #[test]
    fn test_open_policy_allows_re_review() {
        assert!(StatusPolicy::Open.check(ArticleStatus::Rejected).is_ok());
        assert!(StatusPolicy::Open.check(ArticleStatus::Approved).is_ok());
    }

    #[test]
    fn test_strict_policy_only_reviews_pending() {
        assert!(StatusPolicy::Strict.check(ArticleStatus::Pending).is_ok());
        assert!(matches!(
            StatusPolicy::Strict.check(ArticleStatus::Approved),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_scope_by_role() {
        let user = authenticated_user(Role::User);
        let editor = authenticated_user(Role::Editor);

        assert_eq!(ArticleScope::for_user(&user), ArticleScope::Own(user.id));
        assert_eq!(ArticleScope::for_user(&user).owner_filter(), Some(user.id));
        assert_eq!(ArticleScope::for_user(&editor), ArticleScope::Everything);
        assert_eq!(ArticleScope::for_user(&editor).owner_filter(), None);
    }

    #[test]
    fn test_scope_permits_owner_only() {
        let owner = authenticated_user(Role::User);
        let other = authenticated_user(Role::User);
        let article = sample_article(owner.id);

        assert!(ArticleScope::for_user(&owner).permits(&article));
        assert!(!ArticleScope::for_user(&other).permits(&article));
        assert!(ArticleScope::Everything.permits(&article));
    }
}
