pub mod duration;
pub mod matcher;
pub mod monitor;
pub mod probe;
pub mod scheduler;

pub use monitor::{MonitorError, NasVpnStatus, TickResult, VpnConnectivityMonitor};
pub use probe::{ConnectivityProbe, DumpFileProbe, PeerSample, ProbeError, WgProbe};
pub use scheduler::MonitorScheduler;
