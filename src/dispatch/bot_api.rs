//! Host-side [`BotApi`] implementation.
//!
//! Bound per invocation to the originating group and acting user, and logs
//! every call so privileged plugin actions leave an audit trail.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::channels::{ArchiveService, AuditService, ChatService, MemberInfo};
use crate::error::Result;
use crate::message::Message;
use crate::sdk::BotApi;

pub struct BotApiImpl {
    chat: Arc<dyn ChatService>,
    archive: Arc<dyn ArchiveService>,
    audit: Arc<dyn AuditService>,
    group_id: u64,
    user_id: u64,
}

impl BotApiImpl {
    pub fn new(
        chat: Arc<dyn ChatService>,
        archive: Arc<dyn ArchiveService>,
        audit: Arc<dyn AuditService>,
        group_id: u64,
        user_id: u64,
    ) -> Self {
        Self {
            chat,
            archive,
            audit,
            group_id,
            user_id,
        }
    }
}

#[async_trait]
impl BotApi for BotApiImpl {
    async fn member_info(&self, member_id: u64) -> Result<Option<MemberInfo>> {
        self.chat.group_member_info(self.group_id, member_id).await
    }

    async fn member_list(&self) -> Result<Vec<MemberInfo>> {
        self.chat.group_member_list(self.group_id).await
    }

    async fn withdraw_message(&self, message_id: i64) -> Result<()> {
        info!(
            operator = self.user_id,
            group = self.group_id,
            message_id,
            "plugin requested message withdrawal"
        );
        self.chat.withdraw_message(message_id).await
    }

    async fn kick_member(&self, member_id: u64, reject_request: bool) -> Result<()> {
        info!(
            operator = self.user_id,
            group = self.group_id,
            member_id,
            reject_request,
            "plugin requested member kick"
        );
        self.chat
            .kick_member(self.group_id, member_id, reject_request)
            .await
    }

    async fn forward_messages(&self, forward_id: &str) -> Result<Vec<Message>> {
        self.chat.forward_messages(forward_id).await
    }

    async fn archive_messages(
        &self,
        start_message_id: i64,
        reason: &str,
        look_back: Duration,
    ) -> Result<()> {
        info!(
            operator = self.user_id,
            group = self.group_id,
            start_message_id,
            reason,
            "plugin requested message archival"
        );
        self.archive
            .archive_user_messages(self.group_id, self.user_id, start_message_id, reason, look_back)
            .await
    }

    async fn approve_audit(&self, target_user_id: u64) -> Result<()> {
        info!(
            operator = self.user_id,
            target = target_user_id,
            "plugin approved join request"
        );
        self.audit.approve(target_user_id, self.user_id).await
    }

    async fn reject_audit(&self, target_user_id: u64) -> Result<()> {
        info!(
            operator = self.user_id,
            target = target_user_id,
            "plugin rejected join request"
        );
        self.audit.deny(target_user_id, self.user_id).await
    }

    async fn add_audit_request(&self, target_user_id: u64) -> Result<()> {
        self.audit.add_request(target_user_id, self.group_id).await
    }

    async fn remove_audit_request(&self, target_user_id: u64) -> Result<()> {
        self.audit.remove_request(target_user_id, self.group_id).await
    }

    async fn audit_list(&self) -> Result<Vec<u64>> {
        self.audit.audit_ids().await
    }
}
