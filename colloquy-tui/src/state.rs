//! Application state and view state definitions.

use crate::config::TuiConfig;
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::theme::SlateTheme;
use colloquy_client::{
    spawn_poll_manager, ApiClient, ClientEvent, PollConfig, PollHandle,
};
use colloquy_core::{
    project, ActivityId, ActivityState, Conversation, ConversationEdge, ConversationId,
    ConversationMetadata, Projection, Timestamp,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tui_textarea::TextArea;

/// Which editor, if any, currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Compose,
    Rename,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationsViewState {
    pub edges: Vec<ConversationEdge>,
    pub selected: Option<ConversationId>,
}

impl ConversationsViewState {
    pub fn selected_edge(&self) -> Option<&ConversationEdge> {
        self.selected
            .and_then(|id| self.edges.iter().find(|e| e.id == id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
            .and_then(|id| self.edges.iter().position(|e| e.id == id))
    }

    pub fn select_next(&mut self) {
        if self.edges.is_empty() {
            return;
        }
        let next = match self.selected_index() {
            Some(index) => (index + 1).min(self.edges.len() - 1),
            None => 0,
        };
        self.selected = Some(self.edges[next].id);
    }

    pub fn select_previous(&mut self) {
        if self.edges.is_empty() {
            return;
        }
        let previous = self.selected_index().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.selected = Some(self.edges[previous].id);
    }

    /// Re-apply after a list refresh: keep the selection when the edge still
    /// exists, otherwise fall back to the top of the list.
    pub fn reconcile(&mut self) {
        if self.selected_index().is_none() {
            self.selected = self.edges.first().map(|e| e.id);
        }
    }
}

/// One renderable line group of the chat log, flattened from the projection
/// with the current expansion set applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatRow {
    Message {
        item_index: usize,
    },
    Activity {
        activity_id: ActivityId,
        depth: usize,
        has_children: bool,
        expanded: bool,
        title: String,
        body: Option<String>,
        state: ActivityState,
        started_at: Timestamp,
        /// Start of whatever happened next; `None` while this is the newest
        /// step, which renders as still running.
        next_at: Option<Timestamp>,
    },
}

/// Flatten a projection into display rows. Roots are always visible;
/// descendants require every ancestor to be expanded.
pub fn flatten_rows(projection: &Projection, expanded: &HashSet<ActivityId>) -> Vec<ChatRow> {
    // DFS order per message, with each activity's follower timestamp taken
    // from the full traversal (not just the visible part) so elapsed labels
    // do not change when groups collapse.
    struct FlatActivity<'a> {
        node: &'a colloquy_core::ActivityNode,
        depth: usize,
        visible: bool,
    }

    fn walk<'a>(
        node: &'a colloquy_core::ActivityNode,
        depth: usize,
        visible: bool,
        expanded: &HashSet<ActivityId>,
        out: &mut Vec<FlatActivity<'a>>,
    ) {
        out.push(FlatActivity {
            node,
            depth,
            visible,
        });
        let children_visible = visible && expanded.contains(&node.activity.id);
        for child in &node.children {
            walk(child, depth + 1, children_visible, expanded, out);
        }
    }

    let mut rows = Vec::new();
    for (item_index, item) in projection.items.iter().enumerate() {
        rows.push(ChatRow::Message { item_index });

        let mut flat = Vec::new();
        for root in &item.activity_forest {
            walk(root, 0, true, expanded, &mut flat);
        }
        let next_message_at = projection
            .items
            .get(item_index + 1)
            .map(|next| next.message.created_at);

        for (index, entry) in flat.iter().enumerate() {
            if !entry.visible {
                continue;
            }
            let activity = &entry.node.activity;
            let next_at = flat
                .get(index + 1)
                .map(|follower| follower.node.activity.created_at)
                .or(next_message_at);
            rows.push(ChatRow::Activity {
                activity_id: activity.id,
                depth: entry.depth,
                has_children: !entry.node.children.is_empty(),
                expanded: expanded.contains(&activity.id),
                title: activity.title.clone(),
                body: activity.body.clone(),
                state: activity.state,
                started_at: activity.created_at,
                next_at,
            });
        }
    }
    rows
}

#[derive(Debug, Default)]
pub struct ChatViewState {
    pub conversation_id: Option<ConversationId>,
    pub conversation_name: String,
    pub metadata: Option<ConversationMetadata>,
    pub projection: Projection,
    pub rows: Vec<ChatRow>,
    pub selected: usize,
    pub expanded: HashSet<ActivityId>,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: SlateTheme,
    pub api: Arc<ApiClient>,
    pub active_view: View,
    pub conversations_view: ConversationsViewState,
    pub chat_view: ChatViewState,
    pub notifications: Vec<Notification>,
    pub input_mode: InputMode,
    pub compose: TextArea<'static>,
    pub rename_input: String,
    pub sending: bool,
    send_gate: watch::Sender<bool>,
    poll: Option<PollHandle>,
}

impl App {
    pub fn new(config: TuiConfig, api: Arc<ApiClient>) -> Self {
        let (send_gate, _) = watch::channel(false);
        let mut compose = TextArea::default();
        compose.set_placeholder_text("Type a message, Enter to send, Esc to cancel");
        Self {
            config,
            theme: SlateTheme::slate(),
            api,
            active_view: View::Conversations,
            conversations_view: ConversationsViewState::default(),
            chat_view: ChatViewState::default(),
            notifications: Vec::new(),
            input_mode: InputMode::Normal,
            compose,
            rename_input: String::new(),
            sending: false,
            send_gate,
            poll: None,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
        if self.notifications.len() > 50 {
            self.notifications.remove(0);
        }
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Switch the chat view to a conversation. The previous poll handle is
    /// dropped first, which aborts its pending timer - no fetch for the old
    /// conversation id can fire after this point.
    pub fn open_conversation(
        &mut self,
        conversation_id: ConversationId,
        name: String,
        client_tx: mpsc::Sender<ClientEvent>,
    ) {
        self.poll = None;
        self.chat_view = ChatViewState {
            conversation_id: Some(conversation_id),
            conversation_name: name,
            ..ChatViewState::default()
        };
        self.active_view = View::Chat;
        self.conversations_view.selected = Some(conversation_id);
        self.poll = Some(spawn_poll_manager(
            Arc::clone(&self.api),
            conversation_id,
            PollConfig::from_settings(&self.config.client.poll),
            self.send_gate.subscribe(),
            client_tx,
        ));
    }

    pub fn close_conversation(&mut self) {
        self.poll = None;
        self.chat_view = ChatViewState::default();
        self.active_view = View::Conversations;
    }

    /// Fold in a fresh snapshot from the poll manager.
    pub fn apply_snapshot(&mut self, conversation_id: ConversationId, conversation: Conversation) {
        if self.chat_view.conversation_id != Some(conversation_id) {
            // Snapshot raced a conversation switch; the old manager is gone.
            tracing::debug!(%conversation_id, "dropping stale snapshot");
            return;
        }
        let projection = project(&conversation);
        if !projection.faults.is_empty() {
            for fault in &projection.faults {
                tracing::warn!(%conversation_id, %fault, "activity integrity fault");
            }
            if self.chat_view.projection.faults.is_empty() {
                self.notify(
                    NotificationLevel::Warning,
                    format!(
                        "{} activity record(s) could not be placed",
                        projection.faults.len()
                    ),
                );
            }
        }
        let was_at_bottom = self.chat_view.rows.is_empty()
            || self.chat_view.selected + 1 >= self.chat_view.rows.len();
        self.chat_view.conversation_name = conversation.metadata.name.clone();
        self.chat_view.metadata = Some(conversation.metadata.clone());
        self.chat_view.projection = projection;
        self.rebuild_rows();
        if was_at_bottom && !self.chat_view.rows.is_empty() {
            self.chat_view.selected = self.chat_view.rows.len() - 1;
        }
    }

    pub fn rebuild_rows(&mut self) {
        self.chat_view.rows =
            flatten_rows(&self.chat_view.projection, &self.chat_view.expanded);
        if !self.chat_view.rows.is_empty() {
            self.chat_view.selected = self.chat_view.selected.min(self.chat_view.rows.len() - 1);
        } else {
            self.chat_view.selected = 0;
        }
    }

    pub fn select_next(&mut self) {
        match self.active_view {
            View::Conversations => self.conversations_view.select_next(),
            View::Chat => {
                if !self.chat_view.rows.is_empty() {
                    self.chat_view.selected =
                        (self.chat_view.selected + 1).min(self.chat_view.rows.len() - 1);
                }
            }
        }
    }

    pub fn select_previous(&mut self) {
        match self.active_view {
            View::Conversations => self.conversations_view.select_previous(),
            View::Chat => {
                self.chat_view.selected = self.chat_view.selected.saturating_sub(1);
            }
        }
    }

    pub fn toggle_expand(&mut self) {
        if self.active_view != View::Chat {
            return;
        }
        if let Some(ChatRow::Activity {
            activity_id,
            has_children: true,
            ..
        }) = self.chat_view.rows.get(self.chat_view.selected)
        {
            let activity_id = *activity_id;
            if !self.chat_view.expanded.remove(&activity_id) {
                self.chat_view.expanded.insert(activity_id);
            }
            self.rebuild_rows();
        }
    }

    pub fn begin_compose(&mut self) {
        if self.chat_view.conversation_id.is_some() && !self.sending {
            self.input_mode = InputMode::Compose;
        }
    }

    pub fn begin_rename(&mut self) {
        if let Some(edge) = self.conversations_view.selected_edge() {
            self.rename_input = edge.name.clone();
            self.input_mode = InputMode::Rename;
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.rename_input.clear();
    }

    /// Take the composed text, if any, and reset the editor.
    pub fn take_compose_text(&mut self) -> Option<String> {
        let text = self.compose.lines().join("\n").trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.compose = TextArea::default();
        self.compose
            .set_placeholder_text("Type a message, Enter to send, Esc to cancel");
        Some(text)
    }

    /// Mark a send as in flight. Suppresses the compose control and parks
    /// the poll manager until [`App::finish_send`].
    pub fn mark_sending(&mut self) {
        self.sending = true;
        let _ = self.send_gate.send(true);
    }

    /// Export the current conversation snapshot to a JSON file next to the
    /// persistence state, in the shape the web product used for downloads.
    pub fn export_conversation(&mut self) {
        let Some(metadata) = self.chat_view.metadata.clone() else {
            self.notify(NotificationLevel::Info, "Nothing to export yet");
            return;
        };
        let messages: Vec<serde_json::Value> = self
            .chat_view
            .projection
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "role": item.message.role,
                    "content": item.message.content,
                    "createdAt": item.message.created_at,
                })
            })
            .collect();
        let export = serde_json::json!({
            "name": metadata.name,
            "id": metadata.id,
            "createdAt": metadata.created_at,
            "messages": messages,
        });

        let file_name = format!(
            "{}_{}.json",
            sanitize_file_name(&metadata.name),
            metadata.created_at.format("%Y-%m-%d")
        );
        let path = self
            .config
            .persistence_path
            .parent()
            .map(|dir| dir.join(&file_name))
            .unwrap_or_else(|| file_name.clone().into());
        let result = serde_json::to_string_pretty(&export)
            .map_err(|e| e.to_string())
            .and_then(|contents| std::fs::write(&path, contents).map_err(|e| e.to_string()));
        match result {
            Ok(()) => self.notify(
                NotificationLevel::Success,
                format!("Exported to {}", path.display()),
            ),
            Err(error) => self.notify(
                NotificationLevel::Error,
                format!("Export failed: {error}"),
            ),
        }
    }

    /// A send resolved (either way): reset the busy flag and re-arm polling.
    pub fn finish_send(&mut self, result: Result<(), String>) {
        self.sending = false;
        let _ = self.send_gate.send(false);
        if let Err(error) = result {
            self.notify(NotificationLevel::Error, format!("Send failed: {error}"));
        }
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "conversation".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::{
        Activity, ConversationMetadata, EntityIdType, Message, MessageId, MessageRole,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn base_time() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_message(offset_ms: i64) -> Message {
        Message {
            id: MessageId::now_v7(),
            role: MessageRole::Agent,
            content: "content".to_string(),
            conversation_id: ConversationId::now_v7(),
            parent_id: None,
            created_at: base_time() + Duration::milliseconds(offset_ms),
            updated_at: None,
            feedback_received: false,
            activities: Vec::new(),
        }
    }

    fn make_activity(
        message_id: MessageId,
        parent_id: Option<ActivityId>,
        offset_ms: i64,
    ) -> Activity {
        Activity {
            id: ActivityId::now_v7(),
            title: "step".to_string(),
            body: None,
            state: ActivityState::Execution,
            kind: None,
            parent_id,
            message_id,
            created_at: base_time() + Duration::milliseconds(offset_ms),
            updated_at: None,
        }
    }

    fn projection_with_nested_forest() -> (Projection, ActivityId, ActivityId) {
        let mut message = make_message(0);
        let root = make_activity(message.id, None, 10);
        let child = make_activity(message.id, Some(root.id), 20);
        let root_id = root.id;
        let child_id = child.id;
        message.activities = vec![root, child];
        let conversation = Conversation {
            metadata: ConversationMetadata {
                id: message.conversation_id,
                name: "test".to_string(),
                description: None,
                agent_id: None,
                created_at: base_time(),
                updated_at: None,
                attachment_count: 0,
                has_notifications: false,
            },
            messages: vec![message],
        };
        (project(&conversation), root_id, child_id)
    }

    #[test]
    fn collapsed_forest_shows_roots_only() {
        let (projection, root_id, child_id) = projection_with_nested_forest();
        let rows = flatten_rows(&projection, &HashSet::new());
        assert_eq!(rows.len(), 2); // message + root
        assert!(matches!(rows[0], ChatRow::Message { item_index: 0 }));
        match &rows[1] {
            ChatRow::Activity {
                activity_id,
                has_children,
                expanded,
                ..
            } => {
                assert_eq!(*activity_id, root_id);
                assert!(*has_children);
                assert!(!*expanded);
            }
            other => panic!("expected activity row, got {other:?}"),
        }
        assert!(!rows.iter().any(|row| matches!(
            row,
            ChatRow::Activity { activity_id, .. } if *activity_id == child_id
        )));
    }

    #[test]
    fn expanding_a_root_reveals_its_children() {
        let (projection, root_id, child_id) = projection_with_nested_forest();
        let mut expanded = HashSet::new();
        expanded.insert(root_id);
        let rows = flatten_rows(&projection, &expanded);
        assert_eq!(rows.len(), 3);
        match &rows[2] {
            ChatRow::Activity {
                activity_id, depth, ..
            } => {
                assert_eq!(*activity_id, child_id);
                assert_eq!(*depth, 1);
            }
            other => panic!("expected child activity row, got {other:?}"),
        }
    }

    #[test]
    fn elapsed_window_uses_the_next_step_regardless_of_visibility() {
        let (projection, root_id, _child_id) = projection_with_nested_forest();
        let rows = flatten_rows(&projection, &HashSet::new());
        match &rows[1] {
            ChatRow::Activity {
                activity_id,
                next_at,
                ..
            } => {
                assert_eq!(*activity_id, root_id);
                // The hidden child still bounds the root's elapsed window.
                assert_eq!(*next_at, Some(base_time() + Duration::milliseconds(20)));
            }
            other => panic!("expected activity row, got {other:?}"),
        }
    }

    #[test]
    fn newest_step_has_no_follower() {
        let (projection, root_id, _) = projection_with_nested_forest();
        let mut expanded = HashSet::new();
        expanded.insert(root_id);
        let rows = flatten_rows(&projection, &expanded);
        match rows.last().unwrap() {
            ChatRow::Activity { next_at, .. } => assert_eq!(*next_at, None),
            other => panic!("expected activity row, got {other:?}"),
        }
    }
}
