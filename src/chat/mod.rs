pub mod names;
pub mod registry;
pub mod broadcast;
pub mod dispatcher;

pub use names::{NameSupplier, RandomNames};
pub use registry::{ClientHandle, ConnectionRegistry};
pub use broadcast::BroadcastService;
pub use dispatcher::CommandDispatcher;
