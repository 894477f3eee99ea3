mod clock;
mod registry;
mod scheduler;
mod script;
mod sync;
mod types;
mod voice;

pub mod constants;

pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::{ConnectionRegistry, Endpoint, EndpointId};
pub use scheduler::{Coordinator, Dispatch, Joined, Playback, SchedulerConfig, Tick};
pub use script::{Script, ScriptLine};
pub use sync::{ClockSample, SampleOutcome, SyncConfig, SyncState, SyncedClock};
pub use tracing::{debug, error, info, log::LevelFilter, trace, warn};
pub use types::{ChorusError, ChorusResult};
pub use voice::{VoiceAssigner, VoiceMode};
