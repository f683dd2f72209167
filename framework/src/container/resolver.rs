//! Factory selection
//!
//! Given a capability and an optional name, the [`Resolver`] decides which
//! registered factories answer the request. It never builds anything; the
//! [`Container`](crate::Container) instantiates whatever is selected.
//!
//! Candidates are always considered in registration order. Configuration under
//! the `app` section overrides that order absolutely.

use crate::config::{Config, ConfigValue, APP_SECTION};
use crate::container::factory::{Capability, CapabilityId, ServiceFactory};
use crate::container::services::Services;
use crate::error::{ServiceError, ServiceResult};
use tracing::debug;

/// Selects factories from a frozen registry
pub struct Resolver<'c> {
    services: &'c Services,
    config: &'c Config,
}

impl<'c> Resolver<'c> {
    /// Resolver over `services`, disambiguating with `config`
    pub fn new(services: &'c Services, config: &'c Config) -> Self {
        Self { services, config }
    }

    /// Select the single factory answering a request for `C`
    ///
    /// - no candidate fails as unknown
    /// - one candidate is used as is, unless a different name was asked for
    /// - several candidates are narrowed by `name`, else by `app.<key>` in the
    ///   config; with neither, the request is ambiguous
    pub fn one<C: ?Sized + Capability>(
        &self,
        name: Option<&str>,
    ) -> ServiceResult<&'c ServiceFactory> {
        let capability = CapabilityId::of::<C>();
        let candidates = self.services.factories_supporting(&capability);

        match candidates.as_slice() {
            [] => Err(ServiceError::unknown(capability.name(), name)),
            [only] => match name {
                Some(name) if only.service_name() != name => Err(ServiceError::UnsupportedName {
                    capability: capability.name(),
                    name: name.to_string(),
                    available: vec![only.service_name().to_string()],
                }),
                _ => Ok(*only),
            },
            _ => {
                let key = C::config_key();
                if let Some(name) = name {
                    return pick(&capability, &key, &candidates, name);
                }

                match self.config.get(APP_SECTION, &key) {
                    Some(ConfigValue::Single(configured)) => {
                        debug!(
                            capability = capability.name(),
                            %key,
                            service = %configured,
                            "Disambiguated by config"
                        );
                        pick(&capability, &key, &candidates, configured)
                    }
                    Some(ConfigValue::List(configured)) => match configured.first() {
                        Some(first) => {
                            debug!(
                                capability = capability.name(),
                                %key,
                                service = %first,
                                "Disambiguated by first configured entry"
                            );
                            pick(&capability, &key, &candidates, first)
                        }
                        None => Err(ambiguous(&capability, &key, &candidates)),
                    },
                    None => Err(ambiguous(&capability, &key, &candidates)),
                }
            }
        }
    }

    /// Select every factory answering an array request for `C`, in order
    ///
    /// With `app.<plural key>` configured, exactly the listed services are
    /// selected, in listed order. Otherwise every candidate is, in
    /// registration order.
    pub fn all<C: ?Sized + Capability>(&self) -> ServiceResult<Vec<&'c ServiceFactory>> {
        let capability = CapabilityId::of::<C>();
        let candidates = self.services.factories_supporting(&capability);

        let key = C::config_plural_key();
        let Some(configured) = self.config.get(APP_SECTION, &key) else {
            return Ok(candidates);
        };

        debug!(
            capability = capability.name(),
            %key,
            services = ?configured.names(),
            "Ordering by config"
        );
        configured
            .names()
            .into_iter()
            .map(|name| pick(&capability, &key, &candidates, name))
            .collect()
    }
}

/// The one candidate carrying `name`
fn pick<'c>(
    capability: &CapabilityId,
    key: &str,
    candidates: &[&'c ServiceFactory],
    name: &str,
) -> ServiceResult<&'c ServiceFactory> {
    let matching: Vec<_> = candidates
        .iter()
        .copied()
        .filter(|factory| factory.service_name() == name)
        .collect();

    match matching.as_slice() {
        [] => Err(ServiceError::unknown(capability.name(), Some(name))),
        [only] => Ok(*only),
        several => Err(ServiceError::Ambiguous {
            capability: capability.name(),
            config_key: key.to_string(),
            candidates: describe(several),
        }),
    }
}

fn ambiguous(capability: &CapabilityId, key: &str, candidates: &[&ServiceFactory]) -> ServiceError {
    ServiceError::Ambiguous {
        capability: capability.name(),
        config_key: key.to_string(),
        candidates: describe(candidates),
    }
}

/// Candidate names; factories sharing a name are told apart by concrete type
fn describe(candidates: &[&ServiceFactory]) -> Vec<String> {
    candidates
        .iter()
        .map(|factory| {
            let shared = candidates
                .iter()
                .filter(|other| other.service_name() == factory.service_name())
                .count()
                > 1;
            if shared {
                format!("{} ({})", factory.service_name(), factory.service_type_name())
            } else {
                factory.service_name().to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    trait Log: Send + Sync {}
    impl Capability for dyn Log {}

    trait Cache: Send + Sync {}
    impl Capability for dyn Cache {}

    struct PrintLog;
    impl Log for PrintLog {}

    struct AllCapsLog;
    impl Log for AllCapsLog {}
    impl Capability for AllCapsLog {}

    fn print() -> ServiceFactory {
        ServiceFactory::builder(|_| Ok(PrintLog))
            .name("print")
            .supports::<dyn Log, _>(|s| s)
            .build()
    }

    fn all_caps() -> ServiceFactory {
        ServiceFactory::builder(|_| Ok(AllCapsLog))
            .name("all-caps")
            .supports::<dyn Log, _>(|s| s)
            .build()
    }

    fn services(factories: Vec<ServiceFactory>) -> Services {
        let mut services = Services::new();
        for factory in factories {
            services.register_factory(factory);
        }
        services
    }

    #[test]
    fn test_single_candidate_is_used() {
        let services = services(vec![print()]);
        let config = Config::new();
        let resolver = Resolver::new(&services, &config);

        assert_eq!(resolver.one::<dyn Log>(None).unwrap().service_name(), "print");
        assert_eq!(
            resolver.one::<dyn Log>(Some("print")).unwrap().service_name(),
            "print"
        );
    }

    #[test]
    fn test_single_candidate_with_other_name_is_unsupported() {
        let services = services(vec![print()]);
        let config = Config::new();
        let err = Resolver::new(&services, &config)
            .one::<dyn Log>(Some("all-caps"))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::UnsupportedName { ref name, .. } if name == "all-caps"
        ));
    }

    #[test]
    fn test_no_candidate_is_unknown() {
        let services = services(vec![print()]);
        let config = Config::new();
        let err = Resolver::new(&services, &config).one::<dyn Cache>(None).unwrap_err();

        assert!(matches!(err, ServiceError::Unknown { capability: "Cache", name: None }));
    }

    #[test]
    fn test_multiple_candidates_without_config_are_ambiguous() {
        let services = services(vec![print(), all_caps()]);
        let config = Config::new();
        let err = Resolver::new(&services, &config).one::<dyn Log>(None).unwrap_err();

        match err {
            ServiceError::Ambiguous {
                config_key,
                candidates,
                ..
            } => {
                assert_eq!(config_key, "log");
                assert_eq!(candidates, vec!["print", "all-caps"]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_candidates_narrowed_by_name() {
        let services = services(vec![print(), all_caps()]);
        let config = Config::new();
        let resolver = Resolver::new(&services, &config);

        assert_eq!(
            resolver.one::<dyn Log>(Some("all-caps")).unwrap().service_name(),
            "all-caps"
        );
        assert!(resolver.one::<dyn Log>(Some("syslog")).unwrap_err().is_unknown());
    }

    #[test]
    fn test_multiple_candidates_narrowed_by_config() {
        let services = services(vec![print(), all_caps()]);
        let mut config = Config::new();
        config.set("app", "log", "all-caps");

        let factory = Resolver::new(&services, &config).one::<dyn Log>(None).unwrap();
        assert_eq!(factory.service_name(), "all-caps");
    }

    #[test]
    fn test_config_naming_missing_service_is_unknown() {
        let services = services(vec![print(), all_caps()]);
        let mut config = Config::new();
        config.set("app", "log", "syslog");

        let err = Resolver::new(&services, &config).one::<dyn Log>(None).unwrap_err();
        assert!(matches!(err, ServiceError::Unknown { name: Some(ref n), .. } if n == "syslog"));
    }

    #[test]
    fn test_list_at_singular_key_uses_first_entry() {
        let services = services(vec![print(), all_caps()]);
        let mut config = Config::new();
        config.set("app", "log", ["print", "all-caps"]);

        let factory = Resolver::new(&services, &config).one::<dyn Log>(None).unwrap();
        assert_eq!(factory.service_name(), "print");
    }

    #[test]
    fn test_duplicate_names_stay_ambiguous() {
        let services = services(vec![print(), print()]);
        let config = Config::new();
        let err = Resolver::new(&services, &config)
            .one::<dyn Log>(Some("print"))
            .unwrap_err();

        match err {
            ServiceError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, vec!["print (PrintLog)", "print (PrintLog)"]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_concrete_lookup_ignores_other_types() {
        let services = services(vec![print(), all_caps()]);
        let config = Config::new();

        let factory = Resolver::new(&services, &config).one::<AllCapsLog>(None).unwrap();
        assert_eq!(factory.service_name(), "all-caps");
    }

    #[test]
    fn test_all_defaults_to_registration_order() {
        let services = services(vec![print(), all_caps()]);
        let config = Config::new();

        let names: Vec<_> = Resolver::new(&services, &config)
            .all::<dyn Log>()
            .unwrap()
            .iter()
            .map(|f| f.service_name())
            .collect();
        assert_eq!(names, vec!["print", "all-caps"]);
    }

    #[test]
    fn test_all_follows_configured_order() {
        let services = services(vec![print(), all_caps()]);
        let mut config = Config::new();
        config.set("app", "logs", ["all-caps", "print"]);

        let names: Vec<_> = Resolver::new(&services, &config)
            .all::<dyn Log>()
            .unwrap()
            .iter()
            .map(|f| f.service_name())
            .collect();
        assert_eq!(names, vec!["all-caps", "print"]);
    }

    #[test]
    fn test_all_with_single_configured_name() {
        let services = services(vec![print(), all_caps()]);
        let mut config = Config::new();
        config.set("app", "logs", "print");

        let selected = Resolver::new(&services, &config).all::<dyn Log>().unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].service_name(), "print");
    }

    #[test]
    fn test_all_with_unknown_configured_name_fails() {
        let services = services(vec![print(), all_caps()]);
        let mut config = Config::new();
        config.set("app", "logs", ["all-caps", "syslog"]);

        assert!(Resolver::new(&services, &config)
            .all::<dyn Log>()
            .unwrap_err()
            .is_unknown());
    }

    #[test]
    fn test_all_without_candidates_is_empty() {
        let services = services(vec![print()]);
        let config = Config::new();

        assert!(Resolver::new(&services, &config)
            .all::<dyn Cache>()
            .unwrap()
            .is_empty());
    }
}
