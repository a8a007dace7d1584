use tutorbot_models::ChatId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("question text is empty")]
    EmptyQuestion,

    #[error("no admin channel is configured")]
    Unavailable,
}

/// An admin reply resolved to the requester it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedReply {
    pub requester: ChatId,
    pub text: String,
    /// Open tickets of the requester removed from the side table.
    pub closed: u64,
}
