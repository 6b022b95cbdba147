mod bluetoothctl_client;
pub mod output_parser;

pub use bluetoothctl_client::BluetoothCtlClient;
