// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply delivery and outbound logging.

use std::sync::Arc;

use chrono::Utc;
use parlor_core::{ParlorError, PlatformApi, Reply};
use parlor_storage::{queries, Database, TurnRecord};
use tracing::info;

pub struct ReplySender {
    api: Arc<dyn PlatformApi>,
    db: Arc<Database>,
}

impl ReplySender {
    pub fn new(api: Arc<dyn PlatformApi>, db: Arc<Database>) -> Self {
        Self { api, db }
    }

    /// Send one reply and record it in the conversation log.
    ///
    /// Outbound turns carry no platform message id; the log row is written
    /// only after delivery succeeds, so a failed send can be retried without
    /// a phantom assistant turn.
    pub async fn deliver(
        &self,
        to_user: &str,
        routing_id: &str,
        reply: &Reply,
    ) -> Result<(), ParlorError> {
        match reply {
            Reply::Text(content) => {
                self.api.send_text(to_user, routing_id, content).await?;
            }
            Reply::Image(m) | Reply::Voice(m) | Reply::Video(m) | Reply::File(m) => {
                self.api
                    .send_media(to_user, routing_id, reply.kind(), m)
                    .await?;
            }
        }
        queries::turns::append_turn(
            &self.db,
            &TurnRecord {
                msg_id: None,
                user_id: to_user.to_string(),
                role: "assistant".to_string(),
                kind: reply.kind().to_string(),
                content: reply.log_content(),
                created_at: Utc::now().to_rfc3339(),
            },
        )
        .await?;
        info!(to_user, kind = %reply.kind(), "reply delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parlor_core::{MediaRef, MessageKind, SyncPage};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingApi {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl PlatformApi for RecordingApi {
        async fn access_token(&self) -> Result<String, ParlorError> {
            Ok("token".into())
        }

        async fn sync_messages(
            &self,
            _cursor: Option<&str>,
            _token: Option<&str>,
        ) -> Result<SyncPage, ParlorError> {
            Ok(SyncPage::default())
        }

        async fn send_text(
            &self,
            to_user: &str,
            _routing_id: &str,
            content: &str,
        ) -> Result<(), ParlorError> {
            if self.fail {
                return Err(ParlorError::Delivery {
                    message: "wire down".into(),
                    source: None,
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push(format!("text:{to_user}:{content}"));
            Ok(())
        }

        async fn send_media(
            &self,
            to_user: &str,
            _routing_id: &str,
            kind: MessageKind,
            media: &MediaRef,
        ) -> Result<(), ParlorError> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("{kind}:{to_user}:{}", media.as_str()));
            Ok(())
        }

        async fn upload_media(
            &self,
            _kind: MessageKind,
            _filename: &str,
            _bytes: Vec<u8>,
        ) -> Result<MediaRef, ParlorError> {
            Ok(MediaRef("m".into()))
        }

        async fn download_media(&self, _media: &MediaRef) -> Result<Vec<u8>, ParlorError> {
            Ok(Vec::new())
        }
    }

    async fn open_db() -> (Arc<Database>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Arc::new(
            Database::open(dir.path().join("test.db").to_str().unwrap())
                .await
                .unwrap(),
        );
        (db, dir)
    }

    #[tokio::test]
    async fn text_reply_is_sent_and_logged() {
        let (db, _dir) = open_db().await;
        let api = Arc::new(RecordingApi::default());
        let sender = ReplySender::new(api.clone(), db.clone());

        sender
            .deliver("u1", "kf1", &Reply::Text("hello there".into()))
            .await
            .unwrap();

        assert_eq!(api.sent.lock().unwrap().as_slice(), ["text:u1:hello there"]);
        let turns = queries::turns::recent_for_user(&db, "u1", 10).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, "assistant");
        assert_eq!(turns[0].content, "hello there");
    }

    #[tokio::test]
    async fn media_reply_logs_the_reference() {
        let (db, _dir) = open_db().await;
        let api = Arc::new(RecordingApi::default());
        let sender = ReplySender::new(api.clone(), db.clone());

        sender
            .deliver("u1", "kf1", &Reply::Voice(MediaRef("v-123".into())))
            .await
            .unwrap();

        assert_eq!(api.sent.lock().unwrap().as_slice(), ["voice:u1:v-123"]);
        let turns = queries::turns::recent_for_user(&db, "u1", 10).await.unwrap();
        assert_eq!(turns[0].kind, "voice");
        assert_eq!(turns[0].content, "media_id: v-123");
    }

    #[tokio::test]
    async fn failed_delivery_writes_no_log_row() {
        let (db, _dir) = open_db().await;
        let api = Arc::new(RecordingApi {
            fail: true,
            ..Default::default()
        });
        let sender = ReplySender::new(api, db.clone());

        let err = sender
            .deliver("u1", "kf1", &Reply::Text("hello".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ParlorError::Delivery { .. }));

        let turns = queries::turns::recent_for_user(&db, "u1", 10).await.unwrap();
        assert!(turns.is_empty());
    }
}
