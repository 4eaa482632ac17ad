//! Curated host capability facade exposed to command bodies.

use std::time::Duration;

use async_trait::async_trait;

use crate::channels::MemberInfo;
use crate::error::Result;
use crate::message::Message;

/// The curated subset of host capability a command may use.
///
/// An implementation is bound to the invocation's group and acting user,
/// so a command never names its own group id for group-local operations.
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn member_info(&self, member_id: u64) -> Result<Option<MemberInfo>>;

    async fn member_list(&self) -> Result<Vec<MemberInfo>>;

    async fn withdraw_message(&self, message_id: i64) -> Result<()>;

    async fn kick_member(&self, member_id: u64, reject_request: bool) -> Result<()>;

    /// Fetch a forwarded-message bundle by its forward id.
    async fn forward_messages(&self, forward_id: &str) -> Result<Vec<Message>>;

    /// Request archival of the acting user's recent messages around an
    /// anchor message.
    async fn archive_messages(
        &self,
        start_message_id: i64,
        reason: &str,
        look_back: Duration,
    ) -> Result<()>;

    async fn approve_audit(&self, target_user_id: u64) -> Result<()>;

    async fn reject_audit(&self, target_user_id: u64) -> Result<()>;

    async fn add_audit_request(&self, target_user_id: u64) -> Result<()>;

    async fn remove_audit_request(&self, target_user_id: u64) -> Result<()>;

    async fn audit_list(&self) -> Result<Vec<u64>>;
}
