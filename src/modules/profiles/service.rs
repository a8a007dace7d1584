use crate::store::{Storage, StoreError};
use crate::texts;
use tracing::instrument;
use tutorbot_models::{ChatId, OutgoingMessage, ProfileRecord, UserIdentity};

pub struct ProfileService;

impl ProfileService {
    #[instrument(skip(db))]
    pub async fn find(
        db: &dyn Storage,
        identity: &UserIdentity,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        db.lookup_profile(identity).await
    }

    /// Account view: the profile card followed by the role menu.
    pub fn account_view(chat_id: ChatId, record: &ProfileRecord) -> Vec<OutgoingMessage> {
        vec![
            OutgoingMessage::text(chat_id, texts::profile_card(&record.profile)),
            texts::menu(chat_id, record.profile.role()),
        ]
    }

    /// Tells an unregistered user to share their contact.
    pub fn not_registered(chat_id: ChatId) -> Vec<OutgoingMessage> {
        vec![
            OutgoingMessage::text(chat_id, texts::NOT_REGISTERED),
            texts::contact_request(chat_id),
        ]
    }
}
