//! Identity of an enumerated USB device

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsbDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus_number: u8,
    pub device_address: u8,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
}

impl UsbDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            ..Self::default()
        }
    }

    pub fn at(mut self, bus_number: u8, device_address: u8) -> Self {
        self.bus_number = bus_number;
        self.device_address = device_address;
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// `usb:BBB/DDD [vvvv:pppp]`, stable for the lifetime of the attachment.
    pub fn path(&self) -> String {
        format!(
            "usb:{:03}/{:03} [{:04x}:{:04x}]",
            self.bus_number, self.device_address, self.vendor_id, self.product_id
        )
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}
