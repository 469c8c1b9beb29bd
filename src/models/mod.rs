pub mod attendee;
pub mod event;

pub use attendee::{AttendeeRow, RawAttendeeRow, SeatComponent};
pub use event::EventSummary;
