//! Log services
//!
//! Two implementations of the same capability. When both are registered,
//! `app.log` picks one and `app.logs` orders them for `make_all`.

use servicekit::{Capability, ServiceType};

/// Capability: something that can write a message
pub trait Log: Send + Sync {
    fn log(&self, message: &str) -> String;
}

impl Capability for dyn Log {}

/// Writes messages unchanged
#[derive(Debug, Default, ServiceType)]
#[service(name = "print", supports(dyn Log))]
pub struct PrintLog;

impl Log for PrintLog {
    fn log(&self, message: &str) -> String {
        println!("{}", message);
        message.to_string()
    }
}

/// Writes messages in upper case
#[derive(Debug, Default, ServiceType)]
#[service(name = "all-caps", supports(dyn Log))]
pub struct AllCapsLog;

impl Log for AllCapsLog {
    fn log(&self, message: &str) -> String {
        let message = message.to_uppercase();
        println!("{}", message);
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use servicekit::testing::TestContainer;
    use servicekit::{Config, Services};

    #[test]
    fn test_log_picked_by_config() {
        let mut services = Services::new();
        services.register::<PrintLog>();
        services.register::<AllCapsLog>();

        let mut config = Config::new();
        config.set("app", "log", "all-caps");

        let container = TestContainer::build(config, services);
        let log = container.make::<dyn Log>().unwrap();

        assert_eq!(log.log("hello"), "HELLO");
    }
}
