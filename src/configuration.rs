use std::time::Duration;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn bind_address(&self) -> String;
    fn database_url(&self) -> Option<String>;
    /// Deadline applied to every booking/availability operation.
    fn operation_timeout(&self) -> Duration;
    fn seed_demo_data(&self) -> bool;
}
