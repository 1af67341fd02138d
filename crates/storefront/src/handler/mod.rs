mod order;
mod user;

pub use self::order::{OrderHandler, ScheduleOutcome, schedule_notice};
pub use self::user::ProfileHandler;
