pub mod device;
pub mod event;
pub mod root;
pub mod snapshot;
pub mod zone;

pub use device::{Device, NewDevice};
pub use event::{Event, NewEvent};
pub use root::{NewRoot, Root, DEFAULT_ROOT_IDX, DEFAULT_ROOT_NAME};
pub use snapshot::{SnapshotFile, SnapshotPayload, SnapshotUnit};
pub use zone::{NewZone, Zone};
