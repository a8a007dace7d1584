//! # Tutorbot Models
//!
//! Domain models for the Tutorbot service.
//!
//! # Modules
//!
//! - [`ids`]: Conversation and user identities
//! - [`subjects`]: The fixed set of school subjects
//! - [`profiles`]: Role-tagged user profiles
//! - [`codes`]: Enrollment codes issued by teachers
//! - [`tickets`]: Support tickets and the admin relay text convention
//! - [`events`]: Inbound conversation events
//! - [`messages`]: Outbound messages and keyboards
//!
//! # Example
//!
//! ```ignore
//! use tutorbot_models::{Profile, Role, Subject};
//!
//! let subject: Subject = "math".parse().unwrap();
//! assert_eq!(subject.display_name(), "Математика");
//! assert_eq!(Role::from_callback_data("role_teacher"), Some(Role::Teacher));
//! ```

pub mod codes;
pub mod events;
pub mod ids;
pub mod messages;
pub mod profiles;
pub mod subjects;
pub mod tickets;

// Re-export commonly used types at crate root for convenience
pub use codes::EnrollmentCode;
pub use events::{ContactCard, EventKind, InboundEvent, Sender};
pub use ids::{ChatId, UserIdentity};
pub use messages::{InlineButton, Keyboard, OutgoingMessage};
pub use profiles::{
    CoTeacherProfile, PersonalDetails, Profile, ProfileRecord, Role, StudentProfile,
    TeacherProfile,
};
pub use subjects::{Subject, UnknownSubject};
pub use tickets::{TICKET_LABEL, Ticket, TicketParseError, parse_ticket_reference};
