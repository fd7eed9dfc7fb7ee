use provide_di::injector::Injector;
use provide_di::instance_provider::{InstancePtr, TypedInstanceProvider};
use provide_di::Injectable;

// this is a dependency which knows how to construct itself - no provider is needed
#[derive(Injectable)]
struct TestDependency;

impl TestDependency {
    fn foo(&self) {
        println!("Hello world!");
    }
}

// this is another injectable type, but with a dependency
#[derive(Injectable)]
struct TestComponent {
    // every InstancePtr field is resolved by the injector before the struct is created
    dependency: InstancePtr<TestDependency>,
}

impl TestComponent {
    fn call_foo(&self) {
        self.dependency.foo();
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // an injector without any modules can still create all injectable types
    let injector = Injector::new([]).expect("error creating Injector");

    let component = injector
        .get_instance::<TestComponent>()
        .expect("error creating TestComponent");

    // prints "Hello world!"
    component.call_foo();

    // each dependency is a singleton within its injector
    let dependency = injector
        .get_instance::<TestDependency>()
        .expect("error creating TestDependency");
    assert!(InstancePtr::ptr_eq(&component.dependency, &dependency));
}
