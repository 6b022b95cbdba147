use crate::domain::entities::{ConnectionResult, DisconnectOutcome};

/// Port for metrics reporting
pub trait MetricsReporter: Send + Sync {
    fn report_connection_attempt(&self, result: &ConnectionResult);
    fn report_disconnect(&self, outcome: &DisconnectOutcome);
    fn report_scan(&self, devices_found: usize);
    fn report_connected_devices(&self, count: usize);
    fn report_service_reachable(&self, reachable: bool);
}
