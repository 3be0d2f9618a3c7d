use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::chat::names::NameSupplier;

/// Cloneable handle to one live client: identity, address and its outbound queue.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: Uuid,
    peer_addr: String,
    outbox: mpsc::Sender<String>,
}

impl ClientHandle {
    pub fn new(peer_addr: impl Into<String>, outbox: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer_addr: peer_addr.into(),
            outbox,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Queues `text` without waiting. A full queue means the peer has stopped reading.
    pub fn send(&self, text: String) -> Result<(), TrySendError<String>> {
        self.outbox.try_send(text)
    }
}

struct Member {
    handle: ClientHandle,
    name: String,
}

#[derive(Clone)]
pub struct ConnectionRegistry {
    members: Arc<Mutex<HashMap<Uuid, Member>>>,
    names: Arc<dyn NameSupplier>,
}

impl ConnectionRegistry {
    pub fn new(names: Arc<dyn NameSupplier>) -> Self {
        Self {
            members: Arc::new(Mutex::new(HashMap::new())),
            names,
        }
    }

    // Critical sections are single map operations; a poisoned map is still consistent.
    fn members(&self) -> MutexGuard<'_, HashMap<Uuid, Member>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds the handle under a freshly generated display name and returns that name.
    pub fn register(&self, handle: &ClientHandle) -> String {
        let name = self.names.next_name();
        self.members().insert(handle.id(), Member {
            handle: handle.clone(),
            name: name.clone(),
        });
        info!("{} connects as {}", handle.peer_addr, name);
        name
    }

    /// Removes the handle; absent handles are ignored. Returns the released name.
    pub fn unregister(&self, handle: &ClientHandle) -> Option<String> {
        match self.members().remove(&handle.id()) {
            Some(member) => {
                info!("{} disconnects ({})", handle.peer_addr, member.name);
                Some(member.name)
            }
            None => {
                debug!("{} was not registered, nothing to remove", handle.peer_addr);
                None
            }
        }
    }

    /// Point-in-time copy of the membership, safe to iterate while clients come and go.
    pub fn snapshot(&self) -> Vec<ClientHandle> {
        self.members().values().map(|member| member.handle.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Registers the handle and returns a guard that unregisters it when dropped.
    pub fn enroll(&self, handle: ClientHandle) -> Registration {
        let name = self.register(&handle);
        Registration {
            registry: self.clone(),
            handle,
            name,
        }
    }
}

pub struct Registration {
    registry: ConnectionRegistry,
    handle: ClientHandle,
    name: String,
}

impl Registration {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(&self.handle);
    }
}
