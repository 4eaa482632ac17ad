//! External collaborator boundaries
//!
//! The wire-level chat protocol adapter, the message archival workflow and
//! the join-request audit workflow live outside this crate. The plugin
//! runtime only depends on the narrow trait boundaries defined here; a real
//! deployment wires concrete adapters in, tests wire stubs.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::message::Message;

/// A group member as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub user_id: u64,
    pub nickname: String,
    /// Group-local display name, if set.
    #[serde(default)]
    pub card: Option<String>,
    /// Platform role string ("member", "admin", "owner").
    pub role: String,
}

/// Outbound chat capability: everything the host may ask the platform to do.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send_group_message(&self, group_id: u64, message: Message) -> Result<()>;

    async fn group_member_info(&self, group_id: u64, member_id: u64)
        -> Result<Option<MemberInfo>>;

    async fn group_member_list(&self, group_id: u64) -> Result<Vec<MemberInfo>>;

    async fn withdraw_message(&self, message_id: i64) -> Result<()>;

    async fn kick_member(&self, group_id: u64, member_id: u64, reject_request: bool)
        -> Result<()>;

    /// Fetch the messages bundled under a merged-forward id.
    async fn forward_messages(&self, forward_id: &str) -> Result<Vec<Message>>;
}

/// Archival of recent messages around an anchor message.
#[async_trait]
pub trait ArchiveService: Send + Sync {
    async fn archive_user_messages(
        &self,
        group_id: u64,
        user_id: u64,
        start_message_id: i64,
        reason: &str,
        look_back: Duration,
    ) -> Result<()>;
}

/// The narrow facade onto the join-request audit workflow.
#[async_trait]
pub trait AuditService: Send + Sync {
    async fn approve(&self, target_user_id: u64, operator_id: u64) -> Result<()>;

    async fn deny(&self, target_user_id: u64, operator_id: u64) -> Result<()>;

    async fn add_request(&self, target_user_id: u64, group_id: u64) -> Result<()>;

    async fn remove_request(&self, target_user_id: u64, group_id: u64) -> Result<()>;

    async fn audit_ids(&self) -> Result<Vec<u64>>;
}

/// Log-only [`ChatService`] so the host runs without a wire adapter attached.
pub struct NullChatService;

#[async_trait]
impl ChatService for NullChatService {
    async fn send_group_message(&self, group_id: u64, message: Message) -> Result<()> {
        info!(group_id, message = %message, "outbound message (no chat adapter attached)");
        Ok(())
    }

    async fn group_member_info(
        &self,
        _group_id: u64,
        _member_id: u64,
    ) -> Result<Option<MemberInfo>> {
        Ok(None)
    }

    async fn group_member_list(&self, _group_id: u64) -> Result<Vec<MemberInfo>> {
        Ok(Vec::new())
    }

    async fn withdraw_message(&self, _message_id: i64) -> Result<()> {
        Ok(())
    }

    async fn kick_member(
        &self,
        _group_id: u64,
        _member_id: u64,
        _reject_request: bool,
    ) -> Result<()> {
        Ok(())
    }

    async fn forward_messages(&self, _forward_id: &str) -> Result<Vec<Message>> {
        Ok(Vec::new())
    }
}

/// Log-only [`ArchiveService`].
pub struct NullArchiveService;

#[async_trait]
impl ArchiveService for NullArchiveService {
    async fn archive_user_messages(
        &self,
        group_id: u64,
        user_id: u64,
        start_message_id: i64,
        reason: &str,
        _look_back: Duration,
    ) -> Result<()> {
        info!(
            group_id,
            user_id, start_message_id, reason, "archive requested (no archive backend attached)"
        );
        Ok(())
    }
}

/// Log-only [`AuditService`].
pub struct NullAuditService;

#[async_trait]
impl AuditService for NullAuditService {
    async fn approve(&self, target_user_id: u64, operator_id: u64) -> Result<()> {
        info!(target_user_id, operator_id, "audit approve (no audit backend attached)");
        Ok(())
    }

    async fn deny(&self, target_user_id: u64, operator_id: u64) -> Result<()> {
        info!(target_user_id, operator_id, "audit deny (no audit backend attached)");
        Ok(())
    }

    async fn add_request(&self, target_user_id: u64, group_id: u64) -> Result<()> {
        info!(target_user_id, group_id, "audit request added (no audit backend attached)");
        Ok(())
    }

    async fn remove_request(&self, target_user_id: u64, group_id: u64) -> Result<()> {
        info!(target_user_id, group_id, "audit request removed (no audit backend attached)");
        Ok(())
    }

    async fn audit_ids(&self) -> Result<Vec<u64>> {
        Ok(Vec::new())
    }
}
