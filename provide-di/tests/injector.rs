#[cfg(feature = "derive")]
mod injector_test {
    use provide_di::error::{DependencyErrorKind, InjectorError};
    use provide_di::injector::{FailedResolutionPolicy, Injector, InjectorConfig, InjectorRef};
    use provide_di::instance_provider::{ErrorPtr, InstancePtr, TypedInstanceProvider};
    use provide_di::key::{DependencyKey, DependencyType};
    use provide_di::module::{Module, ModulePtr};
    use provide_di::provider::{Provider, Redirect};
    use provide_di::Injectable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    trait Example: Send + Sync {
        fn from_provider(&self) -> bool;
    }

    #[derive(Injectable)]
    struct ExampleImpl {
        #[inject(default)]
        from_provider: bool,
    }

    impl Example for ExampleImpl {
        fn from_provider(&self) -> bool {
            self.from_provider
        }
    }

    #[derive(Injectable)]
    struct ClassA {
        #[inject(default)]
        is_the_named_one: bool,
    }

    #[derive(Injectable)]
    struct ClassB {
        class_a: InstancePtr<ClassA>,
    }

    #[derive(Injectable)]
    struct ClassC {
        class_a: InstancePtr<ClassA>,
        class_b: InstancePtr<ClassB>,
        #[inject(default)]
        is_the_named_one: bool,
    }

    #[derive(Injectable)]
    struct ClassD {
        #[inject(name = "named_a")]
        class_a: InstancePtr<ClassA>,
        class_b: InstancePtr<ClassB>,
    }

    #[derive(Injectable)]
    struct InjectorAware {
        #[inject(injector)]
        injector: InstancePtr<InjectorRef>,
    }

    fn instance_provider_module() -> ModulePtr {
        Module::builder("InstanceProviders")
            .provider(Provider::<dyn Example>::new("provide_example").instance(|_| {
                Ok(InstancePtr::new(ExampleImpl {
                    from_provider: true,
                }) as InstancePtr<dyn Example>)
            }))
            .provider(
                Provider::<ClassA>::new("provide_named_a")
                    .named("named_a")
                    .instance(|_| {
                        Ok(InstancePtr::new(ClassA {
                            is_the_named_one: true,
                        }))
                    }),
            )
            .provider(
                Provider::<ClassC>::new("provide_named_c")
                    .named("named_c")
                    .parameter::<dyn Example>("example")
                    .named_parameter::<ClassA>("class_a", "named_a")
                    .parameter::<ClassB>("class_b")
                    .instance(|arguments| {
                        let _example = arguments.next::<dyn Example>()?;
                        Ok(InstancePtr::new(ClassC {
                            class_a: arguments.next()?,
                            class_b: arguments.next()?,
                            is_the_named_one: true,
                        }))
                    }),
            )
            .build()
            .unwrap()
    }

    fn type_provider_module() -> ModulePtr {
        Module::builder("TypeProviders")
            .provider(
                Provider::<dyn Example>::new("provide_example").redirect(|_| {
                    Ok(Redirect::to::<ExampleImpl>(|instance| {
                        instance as InstancePtr<dyn Example>
                    }))
                }),
            )
            .provider(
                Provider::<ClassA>::new("provide_named_a")
                    .named("named_a")
                    .redirect(|_| Ok(Redirect::to_self())),
            )
            .provider(
                Provider::<ClassC>::new("provide_named_c")
                    .named("named_c")
                    .parameter::<dyn Example>("example")
                    .redirect(|_| Ok(Redirect::to_self())),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn should_construct_without_modules() {
        let injector = Injector::new([]).unwrap();

        let class_c = injector.get_instance::<ClassC>().unwrap();

        assert!(InstancePtr::ptr_eq(&class_c.class_a, &class_c.class_b.class_a));
        assert!(InstancePtr::ptr_eq(
            &class_c.class_a,
            &injector.get_instance::<ClassA>().unwrap()
        ));
        assert!(!class_c.is_the_named_one);
    }

    #[test]
    fn should_inject_current_injector() {
        let injector = Injector::new([]).unwrap();

        let aware = injector.get_instance::<InjectorAware>().unwrap();

        assert!(aware.injector.is(&injector));
    }

    #[test]
    fn should_provide_trait_implementations() {
        for module in [instance_provider_module(), type_provider_module()] {
            let from_instance_provider = module.name() == "InstanceProviders";
            let injector = Injector::new([module]).unwrap();

            let example = injector.get_instance::<dyn Example>().unwrap();
            let again = injector.get_instance::<dyn Example>().unwrap();

            assert_eq!(example.from_provider(), from_instance_provider);
            assert!(InstancePtr::ptr_eq(&example, &again));
        }
    }

    #[test]
    fn should_provide_named_dependencies() {
        for module in [instance_provider_module(), type_provider_module()] {
            let from_instance_provider = module.name() == "InstanceProviders";
            let injector = Injector::new([module]).unwrap();

            let named = injector.get_named_instance::<ClassA>("named_a").unwrap();
            let again = injector.get_named_instance::<ClassA>("named_a").unwrap();
            let unnamed = injector.get_instance::<ClassA>().unwrap();

            assert_eq!(named.is_the_named_one, from_instance_provider);
            assert!(InstancePtr::ptr_eq(&named, &again));
            assert!(!InstancePtr::ptr_eq(&named, &unnamed));
        }
    }

    #[test]
    fn should_inject_named_dependencies_from_instance_provider() {
        let injector = Injector::new([instance_provider_module()]).unwrap();

        let class_c = injector.get_named_instance::<ClassC>("named_c").unwrap();

        assert!(class_c.is_the_named_one);
        assert!(class_c.class_a.is_the_named_one);
        assert!(!class_c.class_b.class_a.is_the_named_one);
        assert!(!InstancePtr::ptr_eq(&class_c.class_a, &class_c.class_b.class_a));
    }

    #[test]
    fn should_inject_own_dependencies_after_redirect() {
        let injector = Injector::new([type_provider_module()]).unwrap();

        let class_c = injector.get_named_instance::<ClassC>("named_c").unwrap();
        let unnamed = injector.get_instance::<ClassC>().unwrap();

        assert!(InstancePtr::ptr_eq(&class_c.class_a, &class_c.class_b.class_a));
        assert!(!InstancePtr::ptr_eq(&class_c, &unnamed));
        assert!(injector.is_cached(&DependencyKey::of::<dyn Example>()));
    }

    #[test]
    fn should_inject_named_fields() {
        let injector = Injector::new([instance_provider_module()]).unwrap();

        let class_d = injector.get_instance::<ClassD>().unwrap();

        assert!(class_d.class_a.is_the_named_one);
        assert!(!class_d.class_b.class_a.is_the_named_one);
    }

    #[test]
    fn should_not_use_trait_provider_for_implementation() {
        let injector = Injector::new([instance_provider_module()]).unwrap();

        assert!(injector.get_instance::<dyn Example>().unwrap().from_provider());
        assert!(!injector.get_instance::<ExampleImpl>().unwrap().from_provider);
    }

    #[derive(Debug)]
    struct Missing;

    #[derive(Injectable, Debug)]
    struct NeedsMissing {
        _missing: InstancePtr<Missing>,
    }

    #[test]
    fn should_report_missing_providers() {
        let injector = Injector::new([]).unwrap();

        let error = injector.get_instance::<Missing>().unwrap_err();
        assert!(matches!(error.kind, DependencyErrorKind::NoProvider));
        assert_eq!(error.chain, [DependencyType::of::<Missing>()]);

        let error = injector.get_instance::<NeedsMissing>().unwrap_err();
        assert!(matches!(error.kind, DependencyErrorKind::NoProvider));
        assert_eq!(
            error.chain,
            [
                DependencyType::of::<Missing>(),
                DependencyType::of::<NeedsMissing>(),
            ]
        );
    }

    #[derive(Debug)]
    struct Cycle1;

    #[derive(Injectable)]
    struct Cycle2 {
        _cycle_1: InstancePtr<Cycle1>,
    }

    #[derive(Injectable)]
    struct Cycle3 {
        _cycle_2: InstancePtr<Cycle2>,
    }

    #[test]
    fn should_detect_dependency_cycles() {
        let module = Module::builder("CycleModule")
            .provider(
                Provider::<Cycle1>::new("provide_cycle_1")
                    .parameter::<Cycle3>("cycle_3")
                    .instance(|_| Ok(InstancePtr::new(Cycle1))),
            )
            .build()
            .unwrap();
        let injector = Injector::new([module]).unwrap();

        let error = injector.get_instance::<Cycle1>().unwrap_err();

        assert!(matches!(error.kind, DependencyErrorKind::DependencyCycle));
        assert_eq!(
            error.chain,
            [
                DependencyType::of::<Cycle1>(),
                DependencyType::of::<Cycle2>(),
                DependencyType::of::<Cycle3>(),
                DependencyType::of::<Cycle1>(),
            ]
        );
        assert!(error.to_string().starts_with("Detected dependency cycle: "));
    }

    trait Looped: Send + Sync {}

    #[derive(Injectable)]
    struct LoopedImpl {
        _looped: InstancePtr<dyn Looped>,
    }

    impl Looped for LoopedImpl {}

    #[test]
    fn should_detect_cycles_through_redirects() {
        let module = Module::builder("LoopedModule")
            .provider(
                Provider::<dyn Looped>::new("provide_looped").redirect(|_| {
                    Ok(Redirect::to::<LoopedImpl>(|instance| {
                        instance as InstancePtr<dyn Looped>
                    }))
                }),
            )
            .build()
            .unwrap();
        let injector = Injector::new([module]).unwrap();

        let Err(error) = injector.get_instance::<dyn Looped>() else {
            panic!("expected a dependency cycle");
        };

        assert!(matches!(error.kind, DependencyErrorKind::DependencyCycle));
        assert_eq!(
            error.chain,
            [
                DependencyType::of::<dyn Looped>(),
                DependencyType::of::<dyn Looped>(),
            ]
        );
    }

    #[test]
    fn should_reject_redirect_to_non_injectable() {
        let module = Module::builder("TestModule")
            .provider(
                Provider::<Missing>::new("provide_missing")
                    .redirect(|_| Ok(Redirect::to_self())),
            )
            .build()
            .unwrap();
        let injector = Injector::new([module]).unwrap();

        let error = injector.get_instance::<Missing>().unwrap_err();

        assert!(error
            .to_string()
            .starts_with("Type provider \"provide_missing\" returned a non-decorated type"));
    }

    #[test]
    fn should_report_all_duplicate_providers() {
        let modules = ["First", "Second", "Third"].map(|name| {
            Module::builder(name)
                .provider(
                    Provider::<ClassA>::new(format!("provide_{name}")).instance(|_| {
                        Ok(InstancePtr::new(ClassA {
                            is_the_named_one: false,
                        }))
                    }),
                )
                .build()
                .unwrap()
        });

        let InjectorError::DuplicateProviders(duplicates) = Injector::new(modules).unwrap_err();

        assert_eq!(duplicates.len(), 2);
        assert!(duplicates
            .iter()
            .all(|(existing, _)| existing.module == "First"));
        assert_eq!(duplicates[0].1.module, "Second");
        assert_eq!(duplicates[1].1.module, "Third");
    }

    #[test]
    fn should_construct_once_for_concurrent_requests() {
        const THREADS: usize = 8;

        let calls = Arc::new(AtomicUsize::new(0));
        let provider_calls = calls.clone();
        let module = Module::builder("SlowModule")
            .provider(
                Provider::<ClassB>::new("provide_slow_b")
                    .parameter::<ClassA>("class_a")
                    .instance(move |arguments| {
                        provider_calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        Ok(InstancePtr::new(ClassB {
                            class_a: arguments.next()?,
                        }))
                    }),
            )
            .build()
            .unwrap();
        let injector = Injector::new([module]).unwrap();
        let barrier = &Barrier::new(THREADS);
        let injector = &injector;

        let instances: Vec<_> = thread::scope(|scope| {
            (0..THREADS)
                .map(|_| {
                    scope.spawn(move || {
                        barrier.wait();
                        injector.get_instance::<ClassB>().unwrap()
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(instances
            .iter()
            .all(|instance| InstancePtr::ptr_eq(instance, &instances[0])));
    }

    #[derive(Debug)]
    struct Flaky;

    fn flaky_module(calls: Arc<AtomicUsize>) -> ModulePtr {
        Module::builder("FlakyModule")
            .provider(Provider::<Flaky>::new("provide_flaky").instance(move |_| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Arc::new(std::fmt::Error) as ErrorPtr)
                } else {
                    Ok(InstancePtr::new(Flaky))
                }
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn should_retry_after_failure_by_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let injector = Injector::new([flaky_module(calls.clone())]).unwrap();

        assert!(matches!(
            injector.get_instance::<Flaky>().unwrap_err().kind,
            DependencyErrorKind::ProviderFailed { .. }
        ));
        assert!(injector.get_instance::<Flaky>().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_keep_failed_dependency_poisoned() {
        let calls = Arc::new(AtomicUsize::new(0));
        let injector = Injector::builder()
            .with_module(flaky_module(calls.clone()))
            .with_config(
                InjectorConfig::default()
                    .with_failed_resolution_policy(FailedResolutionPolicy::Poison),
            )
            .build()
            .unwrap();

        assert!(injector.get_instance::<Flaky>().is_err());
        assert!(matches!(
            injector.get_instance::<Flaky>().unwrap_err().kind,
            DependencyErrorKind::DependencyCycle
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
