mod brew;
mod error;
mod install;
mod local_state;
mod progress;

pub use brew::{Brew, DEFAULT_LOCAL_STATE_TIMEOUT};
pub use error::{ExecutorError, InstallError, LocalStateError, LocateBrewError};
pub use progress::{classify_line, MonitorHandle, ProgressEvent, ProgressMonitor, Stage};
