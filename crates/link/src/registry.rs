use std::{collections::HashSet, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::LinkError;

static OPEN_PORTS: Lazy<Mutex<HashSet<Arc<str>>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Exclusive in-process claim on a port name, released on drop.
#[derive(Debug)]
pub(crate) struct PortClaim {
    port_name: Arc<str>,
}

impl PortClaim {
    pub(crate) fn acquire(port_name: &Arc<str>) -> Result<Self, LinkError> {
        if OPEN_PORTS.lock().insert(Arc::clone(port_name)) {
            Ok(Self {
                port_name: Arc::clone(port_name),
            })
        } else {
            Err(LinkError::AlreadyOpen)
        }
    }
}

impl Drop for PortClaim {
    fn drop(&mut self) {
        OPEN_PORTS.lock().remove(&self.port_name);
    }
}
