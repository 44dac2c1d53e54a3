//! nusb backend: enumeration, selection and endpoint I/O.

use std::time::Duration;

use async_trait::async_trait;
use nusb::transfer::{RequestBuffer, TransferError};
use padlink_hid_common::{
    HidCommonError, HidCommonResult, InputEndpoint, OutputEndpoint, UsbDeviceInfo,
};
use padlink_hid_xbox_protocol::{DeviceModel, identify};
use tracing::{debug, info};

use crate::error::BridgeError;

/// Largest transfer either family produces.
pub const MAX_PACKET_LEN: usize = 64;

/// Settle time after a port reset before the device re-enumerates.
pub const RESET_SETTLE: Duration = Duration::from_millis(500);

/// Bound on OUT transfers; LED and handshake writes are tiny.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

pub fn enumerate() -> Result<Vec<UsbDeviceInfo>, BridgeError> {
    let devices = nusb::list_devices()
        .map_err(|e| BridgeError::Enumeration(e.to_string()))?
        .map(|dev| {
            let mut info = UsbDeviceInfo::new(dev.vendor_id(), dev.product_id())
                .at(dev.bus_number(), dev.device_address());
            if let Some(serial) = dev.serial_number() {
                info = info.with_serial(serial);
            }
            if let Some(manufacturer) = dev.manufacturer_string() {
                info = info.with_manufacturer(manufacturer);
            }
            if let Some(product) = dev.product_string() {
                info = info.with_product_name(product);
            }
            info
        })
        .collect();
    Ok(devices)
}

/// Pick the single supported controller among `devices`.
pub fn select(devices: &[UsbDeviceInfo]) -> Result<(UsbDeviceInfo, DeviceModel), BridgeError> {
    let mut found: Vec<(UsbDeviceInfo, DeviceModel)> = devices
        .iter()
        .filter_map(|d| identify(d.vendor_id, d.product_id).map(|m| (d.clone(), m)))
        .collect();
    match found.len() {
        0 => Err(BridgeError::NoDevice),
        1 => found.pop().ok_or(BridgeError::NoDevice),
        n => Err(BridgeError::MultipleDevices(n)),
    }
}

/// Opened controller interface with both endpoints resolved.
pub struct UsbController {
    pub info: UsbDeviceInfo,
    pub model: DeviceModel,
    pub input: NusbInEndpoint,
    pub output: NusbOutEndpoint,
}

fn find_attached(info: &UsbDeviceInfo) -> Result<nusb::DeviceInfo, BridgeError> {
    nusb::list_devices()
        .map_err(|e| BridgeError::Enumeration(e.to_string()))?
        .find(|dev| info.matches(dev.vendor_id(), dev.product_id()))
        .ok_or(BridgeError::NoDevice)
}

/// Reset the device, then claim the model's interface and alt setting.
pub async fn open(info: UsbDeviceInfo, model: DeviceModel) -> Result<UsbController, BridgeError> {
    let device = find_attached(&info)?
        .open()
        .map_err(|e| BridgeError::Open(format!("USB open: {e}")))?;
    device
        .reset()
        .map_err(|e| BridgeError::Open(format!("reset: {e}")))?;
    drop(device);
    tokio::time::sleep(RESET_SETTLE).await;

    // The reset invalidates the old handle and may renumber the device.
    let attached = find_attached(&info)?;
    let info = UsbDeviceInfo {
        bus_number: attached.bus_number(),
        device_address: attached.device_address(),
        ..info
    };
    let device = attached
        .open()
        .map_err(|e| BridgeError::Open(format!("USB open after reset: {e}")))?;

    let active = device
        .active_configuration()
        .map(|c| c.configuration_value())
        .ok();
    if active != Some(model.config) {
        debug!(?active, wanted = model.config, "setting configuration");
        device
            .set_configuration(model.config)
            .map_err(|e| BridgeError::Open(format!("set configuration {}: {e}", model.config)))?;
    }

    let interface = device
        .detach_and_claim_interface(model.interface)
        .map_err(|e| BridgeError::Open(format!("claim interface {}: {e}", model.interface)))?;
    interface
        .set_alt_setting(model.alt_setting)
        .map_err(|e| BridgeError::Open(format!("alt setting {}: {e}", model.alt_setting)))?;

    info!(
        device = %info.path(),
        family = %model.family,
        in_ep = model.in_address(),
        out_ep = model.out_address(),
        "controller opened"
    );

    Ok(UsbController {
        info,
        model,
        input: NusbInEndpoint {
            interface: interface.clone(),
            address: model.in_address(),
        },
        output: NusbOutEndpoint {
            interface,
            address: model.out_address(),
        },
    })
}

fn transfer_error(e: TransferError) -> HidCommonError {
    match e {
        TransferError::Disconnected => HidCommonError::Disconnected,
        other => HidCommonError::ReadError(other.to_string()),
    }
}

pub struct NusbInEndpoint {
    interface: nusb::Interface,
    address: u8,
}

#[async_trait]
impl InputEndpoint for NusbInEndpoint {
    async fn read_report(&mut self, timeout: Duration) -> HidCommonResult<Vec<u8>> {
        let transfer = self
            .interface
            .interrupt_in(self.address, RequestBuffer::new(MAX_PACKET_LEN));
        let completion = tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_elapsed| HidCommonError::Timeout(timeout))?;
        completion.status.map_err(transfer_error)?;
        Ok(completion.data)
    }
}

pub struct NusbOutEndpoint {
    interface: nusb::Interface,
    address: u8,
}

#[async_trait]
impl OutputEndpoint for NusbOutEndpoint {
    async fn write_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        let transfer = self.interface.interrupt_out(self.address, data.to_vec());
        let completion = tokio::time::timeout(WRITE_TIMEOUT, transfer)
            .await
            .map_err(|_elapsed| {
                HidCommonError::WriteError(format!("timed out after {WRITE_TIMEOUT:?}"))
            })?;
        completion.status.map_err(|e| match e {
            TransferError::Disconnected => HidCommonError::Disconnected,
            other => HidCommonError::WriteError(other.to_string()),
        })?;
        Ok(completion.data.actual_length())
    }
}
