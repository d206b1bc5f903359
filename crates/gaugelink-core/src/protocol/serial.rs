//! Serial port discovery
//!
//! The session configuration only carries a port name; applications that want
//! to present a port picker can enumerate candidates here.

use serde::Serialize;
use serialport::{SerialPortType, UsbPortInfo};

/// Information about an available serial port
#[derive(Debug, Clone, Serialize)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// Manufacturer name (USB devices only)
    pub manufacturer: Option<String>,

    /// Product name (USB devices only)
    pub product: Option<String>,
}

impl PortInfo {
    fn from_usb(name: String, usb: UsbPortInfo) -> Self {
        Self {
            name,
            manufacturer: usb.manufacturer,
            product: usb.product,
        }
    }

    fn is_usb(&self) -> bool {
        self.manufacturer.is_some() || self.product.is_some()
    }
}

/// Sort ports deterministically: USB serial adapters first (an ATG console is
/// almost always attached through one), then by name.
fn sort_ports(ports: &mut [PortInfo]) {
    ports.sort_by(|a, b| {
        b.is_usb()
            .cmp(&a.is_usb())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// List available serial ports in deterministic order
pub fn list_ports() -> Vec<PortInfo> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(|info| match info.port_type {
            SerialPortType::UsbPort(usb) => PortInfo::from_usb(info.port_name, usb),
            _ => PortInfo {
                name: info.port_name,
                manufacturer: None,
                product: None,
            },
        })
        .collect();

    sort_ports(&mut ports);
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(name: &str) -> PortInfo {
        PortInfo {
            name: name.to_string(),
            manufacturer: None,
            product: None,
        }
    }

    #[test]
    fn test_list_ports_does_not_panic() {
        for port in list_ports() {
            println!("found port: {} ({:?})", port.name, port.product);
        }
    }

    #[test]
    fn test_usb_ports_sort_first() {
        let mut ports = vec![
            plain("/dev/ttyS0"),
            PortInfo {
                name: "/dev/ttyUSB0".to_string(),
                manufacturer: Some("FTDI".to_string()),
                product: Some("FT232R".to_string()),
            },
            plain("/dev/ttyS1"),
        ];
        sort_ports(&mut ports);

        let names: Vec<&str> = ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["/dev/ttyUSB0", "/dev/ttyS0", "/dev/ttyS1"]);
    }
}
