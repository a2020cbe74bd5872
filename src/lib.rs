pub mod config;
pub mod error;
pub mod runtime {
    pub mod frames;
    pub mod manual;
    pub mod viewport;
}
pub mod animation {
    pub mod animated_stat;
    pub mod count_up;
    pub mod easing;
    pub mod scroll_reveal;
}
pub mod api {
    pub mod form_endpoint;
}
pub mod handlers {
    pub mod form_handlers;
    pub mod waitlist_handlers;
}
pub mod jobs {
    pub mod live_counter;
}
pub mod models {
    pub mod stat_models;
    pub mod waitlist_models;
}
pub mod repositories {
    pub mod local_storage;
    pub mod waitlist_repository;
}
pub mod utils {
    pub mod email_utils;
    pub mod format_utils;
}

pub use animation::animated_stat::AnimatedStat;
pub use animation::count_up::{CountUp, CountUpOptions, CountUpPhase};
pub use animation::scroll_reveal::{RevealSection, ScrollReveal, VisibilityFlag};
pub use config::LandingConfig;
pub use error::{EmailError, RemoteError, StorageError, WaitlistError};
pub use handlers::form_handlers::{FormOutcome, FormState, WaitlistForm};
pub use handlers::waitlist_handlers::{RemoteDelivery, SubmissionReceipt, WaitlistService};
pub use runtime::frames::{AnimationHost, Clock, FrameScheduler, MonotonicClock, TokioFrameScheduler};
pub use runtime::viewport::{ElementId, IntersectionEntry, ObserveControl, Observation, Viewport};
