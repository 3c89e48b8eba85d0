//! Access-token delegation
//!
//! An access token is a scoped, revocable delegation: its permission rows
//! are fixed at issuance, and its effective permissions are additionally
//! capped by whatever its authorizer holds at check time. Tokens outlive
//! sessions and decay automatically when the authorizer loses the
//! underlying permission; revocation discards the row set.

use crate::actor::{AccessTokenActor, Actor};
use crate::permission::registry::PermissionRegistry;
use std::sync::Arc;
use strata_core::{GrantSpec, StrataError, StrataResult, TokenUid};
use strata_store::{TokenPermissionRow, TokenStore};

/// Issues and revokes access tokens
pub struct AccessTokenService {
    tokens: Arc<dyn TokenStore>,
    registry: Arc<PermissionRegistry>,
}

impl AccessTokenService {
    /// Create the service over the token seam
    pub fn new(tokens: Arc<dyn TokenStore>, registry: Arc<PermissionRegistry>) -> Self {
        Self { tokens, registry }
    }

    /// Mint a token delegating `permissions` from `authorizer`
    ///
    /// The full row set is persisted atomically; the returned actor
    /// carries the authorizer so checks can enforce the delegation
    /// ceiling. Permissions are canonicalized before storage, matching
    /// what the decision engine looks up at check time.
    pub async fn create_access_token(
        &self,
        authorizer: &Actor,
        permissions: &[GrantSpec],
    ) -> StrataResult<AccessTokenActor> {
        if permissions.is_empty() {
            return Err(StrataError::invalid(
                "an access token needs at least one permission",
            ));
        }

        let token = TokenUid::new();
        let rows = permissions
            .iter()
            .map(|spec| TokenPermissionRow {
                token,
                permission: self.registry.rewrite(spec.permission.clone()),
                extra: spec.extra.clone(),
            })
            .collect();
        self.tokens.insert_token_permissions(token, rows).await?;

        tracing::info!(
            token = %token,
            authorizer = %authorizer.uid(),
            permissions = permissions.len(),
            "access token issued"
        );
        Ok(AccessTokenActor {
            authorizer: Box::new(authorizer.clone()),
            authorized: None,
            token,
        })
    }

    /// Revoke a token by discarding its row set
    pub async fn revoke_access_token(&self, token: TokenUid) -> StrataResult<()> {
        self.tokens.delete_token(token).await?;
        tracing::info!(token = %token, "access token revoked");
        Ok(())
    }
}

impl std::fmt::Debug for AccessTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenService").finish_non_exhaustive()
    }
}
