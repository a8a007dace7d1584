pub mod codes;
pub mod dispatch;
pub mod profiles;
pub mod registration;
pub mod telegram;
pub mod tickets;
