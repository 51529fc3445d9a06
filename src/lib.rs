pub mod agenda;
pub mod calendar;
pub mod error;
pub mod filter;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod projection;
pub mod session;
pub(crate) mod session_validation;
pub mod slots;
pub mod summary;

pub use agenda::agenda_dataframe;
pub use calendar::{CalendarCell, CalendarConfig, CalendarGridBuilder, ViewMode};
pub use error::{ScheduleError, ScheduleResult};
pub use filter::SessionFilter;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteSessionStore;
pub use persistence::{
    PersistenceError, SessionSnapshot, SessionStore, load_config_from_json,
    load_sessions_from_csv, load_snapshot_from_json, save_config_to_json, save_sessions_to_csv,
    save_snapshot_to_json,
};
pub use projection::{GridProjection, ProjectedCell, Projection, SessionProjector, SlotRow};
pub use session::{SessionRecord, SessionStatus};
pub use session_validation::{SessionValidationError, validate_session};
pub use slots::{TimeSlot, generate_slots, generate_slots_for_config, generate_slots_from_str};
pub use summary::SessionSummary;
