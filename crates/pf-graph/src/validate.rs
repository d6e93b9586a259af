//! Component validation run at sealing time.

use crate::error::{ModelError, ModelResult};
use crate::port::PortSet;

pub(crate) fn validate_name(name: &str) -> ModelResult<()> {
    if name.trim().is_empty() {
        return Err(ModelError::EmptyName);
    }
    Ok(())
}

/// Every port must have a finite placement and a non-negative width.
pub(crate) fn validate_ports(ports: &PortSet) -> ModelResult<()> {
    for port in ports {
        if !port.center.x.is_finite() || !port.center.y.is_finite() {
            return Err(ModelError::InvalidPort {
                port: port.name.clone(),
                reason: "center is not finite",
            });
        }
        if !port.orientation.is_finite() {
            return Err(ModelError::InvalidPort {
                port: port.name.clone(),
                reason: "orientation is not finite",
            });
        }
        if !port.width.is_finite() || port.width < 0.0 {
            return Err(ModelError::InvalidPort {
                port: port.name.clone(),
                reason: "width must be finite and non-negative",
            });
        }
    }
    Ok(())
}
