use crate::metrics::{track_ticket_relayed, track_ticket_submitted};
use crate::modules::tickets::model::{RoutedReply, TicketError};
use crate::store::Storage;
use tracing::{debug, info, instrument, warn};
use tutorbot_models::{ChatId, Ticket, TicketParseError, UserIdentity, parse_ticket_reference};

pub struct TicketService;

impl TicketService {
    /// Builds the ticket for a question and records it in the side table.
    ///
    /// Recording is best-effort: the ticket is still returned for
    /// forwarding when the store rejects it.
    #[instrument(skip(db, text))]
    pub async fn submit(
        db: &dyn Storage,
        admin_chat: Option<ChatId>,
        requester: ChatId,
        identity: &UserIdentity,
        text: &str,
    ) -> Result<Ticket, TicketError> {
        if admin_chat.is_none() {
            return Err(TicketError::Unavailable);
        }
        let body = text.trim();
        if body.is_empty() {
            return Err(TicketError::EmptyQuestion);
        }

        let ticket = Ticket {
            requester_id: requester.0,
            requester_identity: identity.clone(),
            body: body.to_string(),
        };

        if let Err(e) = db.record_ticket(&ticket).await {
            warn!(requester_id = ticket.requester_id, error = %e, "Failed to record ticket");
        }
        info!(requester_id = ticket.requester_id, "Ticket submitted");
        track_ticket_submitted();

        Ok(ticket)
    }

    /// Routes an admin's reply back to the requester named in the quoted
    /// ticket text, closing the requester's open tickets best-effort.
    #[instrument(skip(db, quoted, reply))]
    pub async fn relay_reply(
        db: &dyn Storage,
        quoted: &str,
        reply: &str,
    ) -> Result<RoutedReply, TicketParseError> {
        let requester_id = parse_ticket_reference(quoted)?;

        let closed = match db.close_tickets(requester_id).await {
            Ok(closed) => closed,
            Err(e) => {
                warn!(requester_id, error = %e, "Failed to close tickets");
                0
            }
        };
        debug!(requester_id, closed, "Admin reply routed");
        track_ticket_relayed();

        Ok(RoutedReply {
            requester: ChatId(requester_id),
            text: reply.to_string(),
            closed,
        })
    }
}
